//! File tree label stripping.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::node::Element;
use crate::selector::Selector;
use crate::widget::Widget;

static SCREEN_READER_ONLY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".sr-only").expect("static selector is valid"));

/// Remove screen-reader-only labels inside every file tree widget.
///
/// Returns the number of labels removed.
pub fn apply(root: &mut Element) -> usize {
    let mut removed = 0;
    root.walk_mut(&mut |element| {
        if Widget::recognize(element) == Some(Widget::FileTree) {
            removed += element.retain_subtrees(&[], &mut |candidate, ancestors| {
                SCREEN_READER_ONLY.matches(candidate, ancestors)
            });
        }
    });
    if removed > 0 {
        debug!(removed, "stripped file tree labels");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use pretty_assertions::assert_eq;

    fn label(text: &str) -> Element {
        let mut span = Element::with_attrs("span", vec![("class", "sr-only")]);
        span.add_child(Node::text(text));
        span
    }

    #[test]
    fn test_labels_inside_tree_removed() {
        let mut entry = Element::new("li");
        entry.add_child(label("Directory"));
        entry.add_child(Node::text("src"));
        let mut list = Element::new("ul");
        list.add_child(entry);
        let mut tree = Element::new("starlight-file-tree");
        tree.add_child(list);

        let mut root = Element::new("div");
        root.add_child(tree);
        root.add_child(label("kept"));

        assert_eq!(apply(&mut root), 1);
        assert_eq!(
            root.outer_html(),
            r#"<div><starlight-file-tree><ul><li>src</li></ul></starlight-file-tree><span class="sr-only">kept</span></div>"#
        );
    }

    #[test]
    fn test_no_tree_is_noop() {
        let mut root = Element::new("div");
        root.add_child(label("kept"));
        let before = root.clone();
        assert_eq!(apply(&mut root), 0);
        assert_eq!(root, before);
    }
}
