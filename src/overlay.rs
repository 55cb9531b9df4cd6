use crate::config::OverlayConfig;
use crate::dom::escape_xml;
use crate::metrics::CanvasMetrics;
use std::fmt::Write;

const MARGIN_RATIO: f64 = 0.06;
const MIN_MARGIN: f64 = 18.0;
const OVERSHOOT_RATIO: f64 = 0.25;
const ARROW_RATIO: f64 = 0.3;
const OVERLAY_INK: &str = "#e53935";
const FONT_FAMILY: &str = "Inter, Segoe UI, system-ui, -apple-system, sans-serif";

/// Which dimension field the caller just edited; drives the aspect lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edited {
    None,
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Arrow tip position plus direction in degrees (0 = +x, clockwise in SVG
/// screen coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub text: String,
}

/// Ephemeral overlay geometry in the source document's coordinate space.
/// Recomputed on every source, dimension, or configuration change.
#[derive(Debug, Clone)]
pub struct OverlayGeometry {
    pub segments: Vec<Segment>,
    pub arrowheads: Vec<Arrowhead>,
    pub labels: Vec<Label>,
    pub margin: f64,
}

/// Resolve the effective width/height for a pass.
///
/// Requested values win when positive and finite. With the aspect lock on,
/// editing one field derives the other from the prior ratio — state the
/// caller carries between passes — rather than from the source image.
pub fn resolve_dimensions(
    metrics: &CanvasMetrics,
    requested_width: Option<f64>,
    requested_height: Option<f64>,
    edited: Edited,
    prior_ratio: Option<f64>,
    lock_aspect_ratio: bool,
) -> (f64, f64) {
    let mut width = requested_width
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(metrics.width);
    let mut height = requested_height
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(metrics.height);

    if lock_aspect_ratio {
        if let Some(ratio) = prior_ratio.filter(|value| value.is_finite() && *value > 0.0) {
            match edited {
                Edited::Width => height = width / ratio,
                Edited::Height => width = height * ratio,
                Edited::None => {}
            }
        }
    }
    (width, height)
}

/// Compute dimension lines, extension lines, arrowheads and labels.
///
/// Lines span the canvas in the source's own coordinate space (extension
/// lines start at the canvas edges); labels carry the effective
/// width/height. Total: degenerate dimensions are displayed as 1 (never
/// written back), so tiny or broken inputs still get a legible overlay at
/// the minimum margin.
pub fn generate(
    metrics: &CanvasMetrics,
    width: f64,
    height: f64,
    config: &OverlayConfig,
) -> OverlayGeometry {
    let display_width = safe_dimension(width);
    let display_height = safe_dimension(height);
    let canvas_width = safe_dimension(metrics.width);
    let canvas_height = safe_dimension(metrics.height);
    let margin = (display_width.max(display_height) * MARGIN_RATIO).max(MIN_MARGIN);
    let overshoot = margin * OVERSHOOT_RATIO;
    let label_gap = margin * 0.2;
    let left = metrics.origin_x;
    let top = metrics.origin_y;
    let right = left + canvas_width;
    let bottom = top + canvas_height;

    let mut segments = Vec::new();
    let mut arrowheads = Vec::new();
    let mut labels = Vec::new();

    // Width: dimension line above the canvas, extension lines at both edges.
    let width_line_y = top - margin;
    segments.push(Segment {
        x1: left,
        y1: top,
        x2: left,
        y2: width_line_y - overshoot,
    });
    segments.push(Segment {
        x1: right,
        y1: top,
        x2: right,
        y2: width_line_y - overshoot,
    });
    segments.push(Segment {
        x1: left,
        y1: width_line_y,
        x2: right,
        y2: width_line_y,
    });
    arrowheads.push(Arrowhead {
        x: left,
        y: width_line_y,
        angle: 180.0,
    });
    arrowheads.push(Arrowhead {
        x: right,
        y: width_line_y,
        angle: 0.0,
    });
    labels.push(Label {
        x: left + canvas_width / 2.0,
        y: width_line_y - label_gap,
        rotation: 0.0,
        text: format_label(width, "width", config),
    });

    // Height: dimension line to the left of the canvas.
    let height_line_x = left - margin;
    segments.push(Segment {
        x1: left,
        y1: top,
        x2: height_line_x - overshoot,
        y2: top,
    });
    segments.push(Segment {
        x1: left,
        y1: bottom,
        x2: height_line_x - overshoot,
        y2: bottom,
    });
    segments.push(Segment {
        x1: height_line_x,
        y1: top,
        x2: height_line_x,
        y2: bottom,
    });
    arrowheads.push(Arrowhead {
        x: height_line_x,
        y: top,
        angle: 270.0,
    });
    arrowheads.push(Arrowhead {
        x: height_line_x,
        y: bottom,
        angle: 90.0,
    });
    labels.push(Label {
        x: height_line_x - label_gap,
        y: top + canvas_height / 2.0,
        rotation: -90.0,
        text: format_label(height, "height", config),
    });

    OverlayGeometry {
        segments,
        arrowheads,
        labels,
        margin,
    }
}

/// Emit the overlay as a `<g>` fragment in the same coordinate space as the
/// source document, meant to be composited visually above it.
pub fn to_svg_fragment(geometry: &OverlayGeometry, config: &OverlayConfig) -> String {
    let stroke_width = (geometry.margin / MIN_MARGIN).clamp(1.0, 2.0);
    let arrow_length = geometry.margin * ARROW_RATIO;
    let font_size = (geometry.margin * 0.6).clamp(9.0, 16.0);

    let mut out = String::new();
    let _ = write!(
        out,
        "<g class=\"dimension-overlay\" stroke=\"{OVERLAY_INK}\" stroke-width=\"{stroke_width:.2}\" fill=\"none\">"
    );
    if config.show_lines {
        for segment in &geometry.segments {
            let _ = write!(
                out,
                "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\"/>",
                segment.x1, segment.y1, segment.x2, segment.y2
            );
        }
        let half = arrow_length * 0.4;
        for arrow in &geometry.arrowheads {
            let _ = write!(
                out,
                "<path d=\"M 0 0 L {:.2} {:.2} L {:.2} {:.2} z\" fill=\"{OVERLAY_INK}\" stroke=\"none\" \
                 transform=\"translate({:.2} {:.2}) rotate({:.2})\"/>",
                -arrow_length, half, -arrow_length, -half, arrow.x, arrow.y, arrow.angle
            );
        }
    }
    if config.show_labels {
        for label in &geometry.labels {
            let transform = if label.rotation != 0.0 {
                format!(
                    " transform=\"rotate({:.2} {:.2} {:.2})\"",
                    label.rotation, label.x, label.y
                )
            } else {
                String::new()
            };
            let _ = write!(
                out,
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{FONT_FAMILY}\" \
                 font-size=\"{font_size:.1}\" fill=\"{OVERLAY_INK}\" stroke=\"none\"{transform}>{}</text>",
                label.x,
                label.y,
                escape_xml(&label.text)
            );
        }
    }
    out.push_str("</g>");
    out
}

fn safe_dimension(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

fn format_label(value: f64, word: &str, config: &OverlayConfig) -> String {
    let mut text = if config.show_labels {
        format!("{} ", word)
    } else {
        String::new()
    };
    text.push_str(&format_value(value, config.round_values));
    text.push_str(config.unit.suffix());
    text
}

fn format_value(value: f64, round: bool) -> String {
    let value = safe_dimension(value);
    if round {
        return format!("{}", value.round());
    }
    let mut formatted = format!("{:.2}", value);
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Unit;

    fn metrics(width: f64, height: f64) -> CanvasMetrics {
        CanvasMetrics {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
            defaulted: false,
        }
    }

    #[test]
    fn requested_dimensions_win_when_positive() {
        let metrics = metrics(320.0, 180.0);
        let (width, height) = resolve_dimensions(
            &metrics,
            Some(100.0),
            None,
            Edited::None,
            None,
            false,
        );
        assert_eq!((width, height), (100.0, 180.0));

        let (width, height) =
            resolve_dimensions(&metrics, Some(-3.0), Some(f64::NAN), Edited::None, None, false);
        assert_eq!((width, height), (320.0, 180.0));
    }

    #[test]
    fn aspect_lock_derives_the_other_dimension() {
        let metrics = metrics(100.0, 50.0);
        // Prior ratio 2:1, width edited 100 -> 200: height follows to 100.
        let (width, height) = resolve_dimensions(
            &metrics,
            Some(200.0),
            Some(50.0),
            Edited::Width,
            Some(2.0),
            true,
        );
        assert_eq!((width, height), (200.0, 100.0));

        let (width, height) = resolve_dimensions(
            &metrics,
            Some(200.0),
            Some(30.0),
            Edited::Height,
            Some(2.0),
            true,
        );
        assert_eq!((width, height), (60.0, 30.0));
    }

    #[test]
    fn margin_is_floored_for_tiny_canvases() {
        let geometry = generate(&metrics(10.0, 10.0), 10.0, 10.0, &OverlayConfig::default());
        assert_eq!(geometry.margin, MIN_MARGIN);

        let geometry = generate(
            &metrics(1000.0, 400.0),
            1000.0,
            400.0,
            &OverlayConfig::default(),
        );
        assert_eq!(geometry.margin, 60.0);
    }

    #[test]
    fn emits_two_dimension_lines_with_arrows() {
        let geometry = generate(&metrics(100.0, 50.0), 100.0, 50.0, &OverlayConfig::default());
        assert_eq!(geometry.segments.len(), 6);
        assert_eq!(geometry.arrowheads.len(), 4);
        assert_eq!(geometry.labels.len(), 2);
        // Height label reads bottom-to-top.
        assert_eq!(geometry.labels[1].rotation, -90.0);
    }

    #[test]
    fn rounded_labels_drop_decimals() {
        let config = OverlayConfig {
            round_values: true,
            show_labels: false,
            ..OverlayConfig::default()
        };
        let geometry = generate(&metrics(123.456, 50.0), 123.456, 50.0, &config);
        assert_eq!(geometry.labels[0].text, "123px");
    }

    #[test]
    fn unrounded_labels_trim_trailing_zeros() {
        let config = OverlayConfig {
            show_labels: false,
            ..OverlayConfig::default()
        };
        let geometry = generate(&metrics(123.456, 50.0), 123.456, 50.0, &config);
        assert_eq!(geometry.labels[0].text, "123.46px");

        let geometry = generate(&metrics(120.5, 50.0), 120.5, 50.0, &config);
        assert_eq!(geometry.labels[0].text, "120.5px");

        let geometry = generate(&metrics(120.0, 50.0), 120.0, 50.0, &config);
        assert_eq!(geometry.labels[0].text, "120px");
    }

    #[test]
    fn word_prefix_follows_show_labels() {
        let config = OverlayConfig {
            unit: Unit::Mm,
            ..OverlayConfig::default()
        };
        let geometry = generate(&metrics(40.0, 20.0), 40.0, 20.0, &config);
        assert_eq!(geometry.labels[0].text, "width 40mm");
        assert_eq!(geometry.labels[1].text, "height 20mm");
    }

    #[test]
    fn degenerate_dimensions_display_as_one() {
        let geometry = generate(&metrics(100.0, 50.0), 0.0, f64::NAN, &OverlayConfig::default());
        assert!(geometry.labels[0].text.contains("1px"));
        assert_eq!(geometry.margin, MIN_MARGIN);
    }

    #[test]
    fn fragment_honors_visibility_flags() {
        let geometry = generate(&metrics(100.0, 50.0), 100.0, 50.0, &OverlayConfig::default());
        let both = to_svg_fragment(&geometry, &OverlayConfig::default());
        assert!(both.contains("<path"));
        assert!(both.contains("<text"));

        let lines_only = to_svg_fragment(
            &geometry,
            &OverlayConfig {
                show_labels: false,
                ..OverlayConfig::default()
            },
        );
        assert!(lines_only.contains("<path"));
        assert!(!lines_only.contains("<text"));

        let labels_only = to_svg_fragment(
            &geometry,
            &OverlayConfig {
                show_lines: false,
                ..OverlayConfig::default()
            },
        );
        assert!(!labels_only.contains("<path"));
        assert!(labels_only.contains("<text"));
    }
}
