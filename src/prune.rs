use crate::dom::{Document, Element, Node};
use crate::metrics::CanvasMetrics;

// Empirically tuned in the original tool; kept verbatim for compatibility.
const SIZE_RATIO: f64 = 0.005;
const ABSOLUTE_FLOOR: f64 = 0.5;
const PERCENT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    /// Metrics were low-confidence; nothing was touched.
    NotAttempted,
    Removed(usize),
}

impl PruneOutcome {
    pub fn removed(self) -> usize {
        match self {
            PruneOutcome::NotAttempted => 0,
            PruneOutcome::Removed(count) => count,
        }
    }
}

/// Remove art-board placeholder rectangles that duplicate the canvas
/// footprint.
///
/// A heuristic: equivalent shapes expressed as paths survive, and a
/// rectangle that coincidentally matches the canvas is lost. Idempotent per
/// element. Metrics that fell through to the hard default are too weak a
/// signal to prune against, so the pass reports `NotAttempted`.
pub fn prune_background(doc: &mut Document, metrics: &CanvasMetrics) -> PruneOutcome {
    if metrics.defaulted || metrics.width <= 0.0 || metrics.height <= 0.0 {
        return PruneOutcome::NotAttempted;
    }
    let tolerance = metrics.width.max(metrics.height) * SIZE_RATIO + ABSOLUTE_FLOOR;
    PruneOutcome::Removed(prune_children(&mut doc.root, metrics, tolerance))
}

fn prune_children(element: &mut Element, metrics: &CanvasMetrics, tolerance: f64) -> usize {
    if element.name == "defs" {
        return 0;
    }
    let mut removed = 0;
    element.children.retain(|child| {
        let is_background = matches!(
            child,
            Node::Element(nested)
                if nested.name == "rect" && is_canvas_rect(nested, metrics, tolerance)
        );
        if is_background {
            removed += 1;
        }
        !is_background
    });
    for child in &mut element.children {
        if let Node::Element(nested) = child {
            removed += prune_children(nested, metrics, tolerance);
        }
    }
    removed
}

fn is_canvas_rect(rect: &Element, metrics: &CanvasMetrics, tolerance: f64) -> bool {
    matches_size(rect.attr("width"), metrics.width, tolerance)
        && matches_size(rect.attr("height"), metrics.height, tolerance)
        && matches_position(rect.attr("x"), metrics.origin_x, tolerance)
        && matches_position(rect.attr("y"), metrics.origin_y, tolerance)
}

fn matches_size(raw: Option<&str>, expected: f64, tolerance: f64) -> bool {
    // A rect without a width/height renders nothing; it is no background.
    let Some(raw) = raw else {
        return false;
    };
    let trimmed = raw.trim();
    if let Some(percent) = trimmed.strip_suffix('%') {
        return percent
            .parse::<f64>()
            .is_ok_and(|value| (value - 100.0).abs() <= PERCENT_TOLERANCE);
    }
    parse_number(trimmed).is_some_and(|value| (value - expected).abs() <= tolerance)
}

fn matches_position(raw: Option<&str>, origin: f64, tolerance: f64) -> bool {
    let Some(raw) = raw else {
        // Missing x/y defaults to 0.
        return origin.abs() <= tolerance;
    };
    let trimmed = raw.trim();
    if let Some(percent) = trimmed.strip_suffix('%') {
        return percent
            .parse::<f64>()
            .is_ok_and(|value| value.abs() <= PERCENT_TOLERANCE);
    }
    parse_number(trimmed).is_some_and(|value| (value - origin).abs() <= tolerance)
}

fn parse_number(raw: &str) -> Option<f64> {
    let digits = raw.trim_end_matches(|ch: char| ch.is_ascii_alphabetic());
    let value = digits.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::parser::parse_svg;

    fn prune(source: &str) -> (crate::dom::Document, PruneOutcome) {
        let mut doc = parse_svg(source).unwrap();
        let metrics = metrics::resolve(&mut doc);
        let outcome = prune_background(&mut doc, &metrics);
        (doc, outcome)
    }

    #[test]
    fn removes_full_canvas_rect() {
        let (doc, outcome) = prune(
            "<svg width=\"100\" height=\"50\">\
             <rect width=\"100\" height=\"50\" fill=\"#ffffff\"/>\
             <circle r=\"10\"/></svg>",
        );
        assert_eq!(outcome, PruneOutcome::Removed(1));
        assert!(!doc.to_svg_string().contains("<rect"));
        assert!(doc.to_svg_string().contains("<circle"));
    }

    #[test]
    fn keeps_offset_and_partial_rects() {
        let (doc, outcome) = prune(
            "<svg width=\"100\" height=\"50\">\
             <rect x=\"20\" width=\"100\" height=\"50\"/>\
             <rect width=\"40\" height=\"50\"/></svg>",
        );
        assert_eq!(outcome, PruneOutcome::Removed(0));
        assert_eq!(doc.to_svg_string().matches("<rect").count(), 2);
    }

    #[test]
    fn percentage_sizes_match_only_near_full() {
        let (_, outcome) =
            prune("<svg width=\"100\" height=\"50\"><rect width=\"100%\" height=\"100%\"/></svg>");
        assert_eq!(outcome, PruneOutcome::Removed(1));

        let (_, outcome) =
            prune("<svg width=\"100\" height=\"50\"><rect width=\"95%\" height=\"100%\"/></svg>");
        assert_eq!(outcome, PruneOutcome::Removed(0));
    }

    #[test]
    fn tolerance_scales_with_canvas() {
        // tol = 100 * 0.005 + 0.5 = 1.0
        let (_, outcome) = prune(
            "<svg width=\"100\" height=\"100\"><rect width=\"99.5\" height=\"100.8\"/></svg>",
        );
        assert_eq!(outcome, PruneOutcome::Removed(1));

        let (_, outcome) =
            prune("<svg width=\"100\" height=\"100\"><rect width=\"98\" height=\"100\"/></svg>");
        assert_eq!(outcome, PruneOutcome::Removed(0));
    }

    #[test]
    fn skips_defaulted_metrics() {
        let (doc, outcome) = prune("<svg><rect width=\"320\" height=\"180\"/></svg>");
        assert_eq!(outcome, PruneOutcome::NotAttempted);
        assert!(doc.to_svg_string().contains("<rect"));
    }

    #[test]
    fn defs_content_is_untouched() {
        let (doc, outcome) = prune(
            "<svg width=\"10\" height=\"10\">\
             <defs><rect width=\"10\" height=\"10\"/></defs></svg>",
        );
        assert_eq!(outcome, PruneOutcome::Removed(0));
        assert!(doc.to_svg_string().contains("<rect"));
    }

    #[test]
    fn second_pass_removes_nothing() {
        let mut doc = parse_svg(
            "<svg width=\"100\" height=\"50\"><rect width=\"100\" height=\"50\"/></svg>",
        )
        .unwrap();
        let metrics = metrics::resolve(&mut doc);
        assert_eq!(prune_background(&mut doc, &metrics), PruneOutcome::Removed(1));
        assert_eq!(prune_background(&mut doc, &metrics), PruneOutcome::Removed(0));
    }

    #[test]
    fn honors_view_box_origin() {
        let (_, outcome) = prune(
            "<svg viewBox=\"-50 -25 100 50\">\
             <rect x=\"-50\" y=\"-25\" width=\"100\" height=\"50\"/></svg>",
        );
        assert_eq!(outcome, PruneOutcome::Removed(1));
    }
}
