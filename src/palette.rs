use crate::color::Color;
use crate::dom::{Document, Element, Node};
use std::collections::HashSet;

const PAINT_PROPERTIES: [&str; 3] = ["fill", "stroke", "stop-color"];

/// Collect every paint color used in the document, first-seen order,
/// deduplicated by RGB triple (alpha ignored).
///
/// Elements under `<defs>` are skipped since they are not rendered directly.
/// `none` and paint-server references are excluded; unparseable values are
/// silently dropped.
pub fn extract(doc: &Document) -> Vec<Color> {
    let mut seen = HashSet::new();
    let mut palette = Vec::new();
    collect(&doc.root, &mut seen, &mut palette);
    palette
}

fn collect(element: &Element, seen: &mut HashSet<(u8, u8, u8)>, palette: &mut Vec<Color>) {
    if element.name == "defs" {
        return;
    }
    for property in PAINT_PROPERTIES {
        if let Some(value) = element.attr(property) {
            push_candidate(value, seen, palette);
        }
    }
    if let Some(style) = element.attr("style") {
        for declaration in style.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            if PAINT_PROPERTIES.contains(&property.trim()) {
                push_candidate(value, seen, palette);
            }
        }
    }
    for child in &element.children {
        if let Node::Element(nested) = child {
            collect(nested, seen, palette);
        }
    }
}

fn push_candidate(raw: &str, seen: &mut HashSet<(u8, u8, u8)>, palette: &mut Vec<Color>) {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.starts_with("url(") {
        return;
    }
    if let Some(color) = Color::parse(trimmed) {
        if seen.insert((color.r, color.g, color.b)) {
            palette.push(color);
        }
    }
}
