use crate::dom::{Document, Element, Node};
use thiserror::Error;

/// Ingestion failure. Everything here is displayable to an end user; there
/// is never partial output alongside an error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed markup: {0}")]
    Malformed(String),
    #[error("root element is not <svg>")]
    NotSvg,
}

/// Parse raw markup into a sanitized owned tree.
///
/// The raw parse is consumed and rebuilt rather than mutated in place:
/// `<script>` subtrees are dropped, event-handler attributes (`on*`) are
/// stripped, comments and processing instructions are not carried over, and
/// the root gains `preserveAspectRatio` and the SVG namespace when absent.
pub fn parse_svg(input: &str) -> Result<Document, ParseError> {
    let parsed = roxmltree::Document::parse(input)
        .map_err(|err| ParseError::Malformed(err.to_string()))?;
    let source_root = parsed.root_element();
    if source_root.tag_name().name() != "svg" {
        return Err(ParseError::NotSvg);
    }

    // The root itself is never a script, so conversion always yields a tree.
    let mut root = convert_element(source_root).unwrap_or_else(|| Element::new("svg"));
    if root.attr("xmlns").is_none() {
        root.set_attr("xmlns", "http://www.w3.org/2000/svg");
    }
    if root.attr("preserveAspectRatio").is_none() {
        root.set_attr("preserveAspectRatio", "xMidYMid meet");
    }
    Ok(Document { root })
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Option<Element> {
    let name = node.tag_name().name();
    if name == "script" {
        return None;
    }
    let mut element = Element::new(name);
    for attr in node.attributes() {
        if is_event_handler(attr.name()) {
            continue;
        }
        element
            .attrs
            .push((attr.name().to_string(), attr.value().to_string()));
    }
    for child in node.children() {
        if child.is_element() {
            if let Some(converted) = convert_element(child) {
                element.children.push(Node::Element(converted));
            }
        } else if child.is_text() {
            // Whitespace-only runs are source formatting, not content.
            if let Some(text) = child.text() {
                if !text.trim().is_empty() {
                    element.children.push(Node::Text(text.to_string()));
                }
            }
        }
    }
    Some(element)
}

fn is_event_handler(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let doc = parse_svg("<svg width=\"10\"><rect/></svg>").unwrap();
        assert_eq!(doc.root.name, "svg");
        assert_eq!(doc.root.attr("width"), Some("10"));
        assert_eq!(doc.root.children.len(), 1);
    }

    #[test]
    fn rejects_unterminated_markup() {
        let err = parse_svg("<svg><rect></svg>").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn rejects_non_svg_root() {
        let err = parse_svg("<html><body/></html>").unwrap_err();
        assert!(matches!(err, ParseError::NotSvg));
    }

    #[test]
    fn drops_script_subtrees() {
        let doc = parse_svg("<svg><script>alert(1)</script><circle/></svg>").unwrap();
        let serialized = doc.to_svg_string();
        assert!(!serialized.contains("script"));
        assert!(!serialized.contains("alert"));
        assert!(serialized.contains("<circle/>"));
    }

    #[test]
    fn strips_event_handler_attributes() {
        let doc = parse_svg("<svg><rect onclick=\"evil()\" opacity=\"0.5\"/></svg>").unwrap();
        let serialized = doc.to_svg_string();
        assert!(!serialized.contains("onclick"));
        assert!(serialized.contains("opacity=\"0.5\""));
    }

    #[test]
    fn canonicalizes_root_attributes() {
        let doc = parse_svg("<svg><rect/></svg>").unwrap();
        assert_eq!(doc.root.attr("xmlns"), Some("http://www.w3.org/2000/svg"));
        assert_eq!(doc.root.attr("preserveAspectRatio"), Some("xMidYMid meet"));

        let doc = parse_svg("<svg preserveAspectRatio=\"none\"><rect/></svg>").unwrap();
        assert_eq!(doc.root.attr("preserveAspectRatio"), Some("none"));
    }

    #[test]
    fn keeps_text_content() {
        let doc = parse_svg("<svg><text>hello</text></svg>").unwrap();
        assert!(doc.to_svg_string().contains("<text>hello</text>"));
    }
}
