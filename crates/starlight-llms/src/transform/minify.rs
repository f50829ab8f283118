//! Minify filter.

use tracing::debug;

use crate::context::ProcessingContext;
use crate::node::Element;

/// Drop every subtree the context marks for removal.
///
/// Runs top-down: once a subtree is removed its descendants are never
/// visited. A no-op unless minifying with something to remove.
/// Returns the number of subtrees removed.
pub fn apply(root: &mut Element, ctx: &ProcessingContext<'_>) -> usize {
    if !ctx.minify() || ctx.removes_nothing() {
        return 0;
    }

    let removed = root.retain_subtrees(&[], &mut |element, ancestors| ctx.removes(element, ancestors));
    debug!(removed, "minify filter");
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MinifyOptions;
    use crate::node::Node;
    use crate::selector::Selector;
    use pretty_assertions::assert_eq;

    fn aside(variant: &str, text: &str) -> Element {
        let class = format!("starlight-aside starlight-aside--{variant}");
        let mut aside = Element::with_attrs("aside", vec![("class", class.as_str())]);
        aside.add_child(Node::text(text));
        aside
    }

    fn page() -> Element {
        let mut root = Element::new("div");
        root.add_child(aside("note", "n"));
        root.add_child(aside("danger", "d"));
        let mut details = Element::new("details");
        details.add_child(aside("tip", "nested"));
        root.add_child(details);
        let mut p = Element::with_attrs("p", vec![("class", "banner")]);
        p.add_child(Node::text("b"));
        root.add_child(p);
        root
    }

    #[test]
    fn test_defaults_remove_note_tip_and_details() {
        let mut root = page();
        let ctx = ProcessingContext::new(&MinifyOptions::default(), &[], true);

        // The nested tip goes with its details ancestor.
        assert_eq!(apply(&mut root, &ctx), 2);
        assert_eq!(
            root.outer_html(),
            r#"<div><aside class="starlight-aside starlight-aside--danger">d</aside><p class="banner">b</p></div>"#
        );
    }

    #[test]
    fn test_not_minifying_is_identity() {
        let mut root = page();
        let before = root.clone();
        let ctx = ProcessingContext::new(&MinifyOptions::default(), &[], false);

        assert_eq!(apply(&mut root, &ctx), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn test_nothing_configured_is_identity() {
        let options = MinifyOptions {
            note: false,
            tip: false,
            details: false,
            ..Default::default()
        };
        let mut root = page();
        let before = root.clone();
        let ctx = ProcessingContext::new(&options, &[], true);

        assert_eq!(apply(&mut root, &ctx), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn test_custom_selector_sees_ancestors() {
        let options = MinifyOptions {
            note: false,
            tip: false,
            details: false,
            ..Default::default()
        };
        let custom = vec![Selector::parse("div > p.banner").unwrap()];
        let mut root = page();
        let ctx = ProcessingContext::new(&options, &custom, true);

        assert_eq!(apply(&mut root, &ctx), 1);
        assert!(Selector::parse("p").unwrap().select(&root).is_empty());
    }
}
