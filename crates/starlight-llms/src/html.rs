//! HTML parsing support.
//!
//! Parses a rendered page fragment with scraper/html5ever and converts it to
//! the owned [`Node`] tree the rewrite stages operate on.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::{Element, Node};
use crate::{LlmsError, Result};

/// Parse an HTML fragment into a Node tree.
///
/// The parser recovers from malformed markup the way browsers do; the returned
/// root is the `html` element wrapping the fragment.
///
/// # Example
///
/// ```rust
/// use starlight_llms::parse_html;
///
/// let root = parse_html("<h1>Hello <em>World</em></h1>");
/// assert_eq!(root.tag_name(), "html");
/// assert_eq!(root.text_content(), "Hello World");
/// ```
pub fn parse_html(html: &str) -> Element {
    let document = Html::parse_fragment(html);
    scraper_to_element(document.root_element())
}

/// Parse an HTML fragment, failing on the first error html5ever reports.
pub fn parse_html_strict(html: &str) -> Result<Element> {
    let document = Html::parse_fragment(html);
    if let Some(error) = document.errors.first() {
        return Err(LlmsError::Parse(error.to_string()));
    }
    Ok(scraper_to_element(document.root_element()))
}

/// Convert a scraper ElementRef to our Element structure
fn scraper_to_element(element: ElementRef) -> Element {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Element::with_attrs(element.value().name(), attrs);

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_element(child_element));
                }
            }
            _ => {}
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_html() {
        let root = parse_html("<p>Hello World</p>");
        assert_eq!(root.tag_name(), "html");
        let p = root.element_children().next().unwrap();
        assert_eq!(p.tag_name(), "p");
        assert_eq!(p.text_content(), "Hello World");
    }

    #[test]
    fn test_custom_elements_keep_their_tag() {
        let root = parse_html(r#"<starlight-tabs data-sync-key="pm"><div role="tabpanel">x</div></starlight-tabs>"#);
        let tabs = root.element_children().next().unwrap();
        assert_eq!(tabs.tag_name(), "starlight-tabs");
        assert_eq!(tabs.attr("data-sync-key"), Some("pm"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let root = parse_html("<p>a<!-- hidden -->b</p>");
        assert_eq!(root.text_content(), "ab");
    }

    #[test]
    fn test_strict_accepts_well_formed_markup() {
        assert!(parse_html_strict("<p>ok</p>").is_ok());
    }

    #[test]
    fn test_strict_rejects_stray_end_tag() {
        let err = parse_html_strict("<p>ok</p></div>").unwrap_err();
        assert!(matches!(err, LlmsError::Parse(_)));
        // Lenient parsing recovers from the same input.
        assert_eq!(parse_html("<p>ok</p></div>").text_content(), "ok");
    }
}
