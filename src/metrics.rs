use crate::dom::Document;
use once_cell::sync::Lazy;
use regex::Regex;

/// Hard fallback canvas used when neither attributes nor viewBox resolve.
pub const DEFAULT_WIDTH: f64 = 320.0;
pub const DEFAULT_HEIGHT: f64 = 180.0;

static LENGTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-]?\d*\.?\d+(?:[eE][+-]?\d+)?)\s*([a-zA-Z%]*)$").unwrap());
static LIST_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").unwrap());

/// The resolved drawing surface. `width > 0 && height > 0` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    pub width: f64,
    pub height: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    /// Both dimensions fell through to the hard default. Downstream
    /// heuristics treat this as low confidence.
    pub defaulted: bool,
}

/// Derive authoritative metrics from the root element.
///
/// Priority per dimension: explicit attribute (number with optional unit
/// suffix; percentages are not authoritative) → viewBox → 320×180 default.
/// When the viewBox is absent or unreadable, an equivalent one is
/// synthesized from the resolved values and written back onto the root so
/// every downstream consumer shares one coordinate space.
pub fn resolve(doc: &mut Document) -> CanvasMetrics {
    let root = &mut doc.root;
    let attr_width = root.attr("width").and_then(parse_length);
    let attr_height = root.attr("height").and_then(parse_length);
    let view_box = root.attr("viewBox").and_then(parse_view_box);

    let width = attr_width.or(view_box.map(|vb| vb[2]));
    let height = attr_height.or(view_box.map(|vb| vb[3]));
    let defaulted = width.is_none() && height.is_none();
    let width = width.unwrap_or(DEFAULT_WIDTH);
    let height = height.unwrap_or(DEFAULT_HEIGHT);

    let (origin_x, origin_y) = match view_box {
        Some(vb) => (vb[0], vb[1]),
        None => {
            root.set_attr("viewBox", &format!("0 0 {} {}", width, height));
            (0.0, 0.0)
        }
    };

    CanvasMetrics {
        width,
        height,
        origin_x,
        origin_y,
        defaulted,
    }
}

/// Parse a positive length with an optional unit suffix (`120`, `120px`,
/// `12.5mm`). Percentages are relative to an unknown viewport and yield
/// `None`.
pub fn parse_length(raw: &str) -> Option<f64> {
    let caps = LENGTH_RE.captures(raw.trim())?;
    if caps.get(2).map(|m| m.as_str()) == Some("%") {
        return None;
    }
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_view_box(raw: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = LIST_SPLIT_RE
        .split(raw.trim())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let [origin_x, origin_y, width, height] = parts.as_slice() else {
        return None;
    };
    let all_finite = parts.iter().all(|value| value.is_finite());
    (all_finite && *width > 0.0 && *height > 0.0)
        .then_some([*origin_x, *origin_y, *width, *height])
}
