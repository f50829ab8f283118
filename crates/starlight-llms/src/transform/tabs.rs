//! Tabs flattener.
//!
//! A tab widget becomes a plain list: one item per tab, holding a paragraph
//! with the tab's label followed by the tab's panel.

use std::mem;

use tracing::debug;

use crate::node::{Element, Node};
use crate::widget::Widget;

const TAB_ROLE: &str = "tab";
const PANEL_ROLE: &str = "tabpanel";
const ICON_TAG: &str = "svg";

/// Flatten every tab widget under `root`. Returns how many were flattened.
///
/// Widgets are visited children first, so a widget nested in another's panel
/// is already a list by the time the outer one is flattened.
pub fn apply(root: &mut Element) -> usize {
    let mut widgets = 0;
    root.walk_mut_post(&mut |element| {
        if Widget::recognize(element) == Some(Widget::Tabs) {
            flatten(element);
            widgets += 1;
        }
    });
    if widgets > 0 {
        debug!(widgets, "flattened tab widgets");
    }
    widgets
}

/// Rewrite `widget` in place as an unordered list.
///
/// Labels and panels pair up by position; surplus tabs or panels are
/// dropped. The widget's attributes do not carry over to the list.
fn flatten(widget: &mut Element) {
    let mut labels = Vec::new();
    collect_labels(widget, &mut labels);

    let mut panels = Vec::new();
    take_panels(mem::take(&mut widget.children), &mut panels);

    if labels.len() != panels.len() {
        debug!(tabs = labels.len(), panels = panels.len(), "unpaired tabs dropped");
    }

    widget.tag = "ul".to_string();
    widget.attributes.clear();
    widget.children = labels
        .into_iter()
        .zip(panels)
        .map(|(label, panel)| {
            let mut paragraph = Element::new("p");
            paragraph.add_child(Node::Text(label));

            let mut item = Element::new("li");
            item.add_child(paragraph);
            item.add_child(panel);
            Node::Element(item)
        })
        .collect();
}

fn has_role(element: &Element, role: &str) -> bool {
    element.attr("role") == Some(role)
}

/// Gather tab labels in document order without looking inside panels.
fn collect_labels(parent: &Element, labels: &mut Vec<String>) {
    for child in parent.element_children() {
        if has_role(child, TAB_ROLE) {
            labels.push(tab_label(child));
        } else if !has_role(child, PANEL_ROLE) {
            collect_labels(child, labels);
        }
    }
}

/// Trimmed text of each direct child, empty pieces skipped, joined as is.
/// Icons contribute nothing, even when they carry a `<title>`.
fn tab_label(tab: &Element) -> String {
    tab.children
        .iter()
        .filter(|child| !matches!(child, Node::Element(el) if el.is(ICON_TAG)))
        .map(Node::text_content)
        .filter_map(|text| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

/// Move panels out of `children` in document order. Panels are not searched
/// for nested panels.
fn take_panels(children: Vec<Node>, panels: &mut Vec<Element>) {
    for child in children {
        if let Node::Element(element) = child {
            if has_role(&element, PANEL_ROLE) {
                panels.push(element);
            } else {
                take_panels(element.children, panels);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tabs(labels: &[&str], panels: &[&str]) -> Element {
        let mut list = Element::with_attrs("ul", vec![("role", "tablist")]);
        for label in labels {
            let mut tab = Element::with_attrs("a", vec![("role", "tab"), ("href", "#tab")]);
            tab.add_child(Element::new("svg"));
            tab.add_child(Node::text(&format!("  {label} ")));
            let mut li = Element::new("li");
            li.add_child(tab);
            list.add_child(li);
        }

        let mut nav = Element::new("div");
        nav.add_child(list);

        let mut widget = Element::with_attrs("starlight-tabs", vec![("data-sync-key", "pkg")]);
        widget.add_child(nav);
        for panel in panels {
            let mut section = Element::with_attrs("div", vec![("role", "tabpanel")]);
            section.add_child(Node::text(panel));
            widget.add_child(section);
        }
        widget
    }

    #[test]
    fn test_flatten_pairs_labels_and_panels() {
        let mut root = Element::new("div");
        root.add_child(tabs(&["npm", "pnpm"], &["npm i", "pnpm add"]));

        assert_eq!(apply(&mut root), 1);
        assert_eq!(
            root.outer_html(),
            concat!(
                "<div><ul>",
                r#"<li><p>npm</p><div role="tabpanel">npm i</div></li>"#,
                r#"<li><p>pnpm</p><div role="tabpanel">pnpm add</div></li>"#,
                "</ul></div>"
            )
        );
    }

    #[test]
    fn test_unpaired_tabs_are_dropped() {
        let mut root = Element::new("div");
        root.add_child(tabs(&["a", "b", "c"], &["1", "2"]));
        apply(&mut root);
        assert_eq!(root.find_descendant(&|e| e.is("ul")).unwrap().children.len(), 2);

        let mut root = Element::new("div");
        root.add_child(tabs(&["a"], &["1", "2"]));
        apply(&mut root);
        assert_eq!(root.find_descendant(&|e| e.is("ul")).unwrap().children.len(), 1);
    }

    #[test]
    fn test_label_joins_trimmed_children() {
        let mut tab = Element::with_attrs("a", vec![("role", "tab")]);
        let mut icon = Element::new("span");
        icon.add_child(Node::text(" Mac "));
        tab.add_child(icon);
        tab.add_child(Node::text("   "));
        tab.add_child(Node::text(" OS"));
        assert_eq!(tab_label(&tab), "MacOS");
    }

    #[test]
    fn test_label_skips_icon_title() {
        let mut tab = Element::with_attrs("a", vec![("role", "tab")]);
        let mut icon = Element::with_attrs("svg", vec![("aria-hidden", "true")]);
        let mut title = Element::new("title");
        title.add_child(Node::text("icon"));
        icon.add_child(title);
        tab.add_child(icon);
        tab.add_child(Node::text(" npm "));
        assert_eq!(tab_label(&tab), "npm");
    }

    #[test]
    fn test_nested_tabs_flatten_first() {
        let mut inner = tabs(&["inner"], &["deep"]);
        inner.attributes.clear();
        let mut outer = tabs(&["outer"], &[]);
        let mut panel = Element::with_attrs("div", vec![("role", "tabpanel")]);
        panel.add_child(inner);
        outer.add_child(panel);

        let mut root = Element::new("div");
        root.add_child(outer);
        assert_eq!(apply(&mut root), 2);
        assert_eq!(
            root.outer_html(),
            concat!(
                "<div><ul><li><p>outer</p><div role=\"tabpanel\">",
                "<ul><li><p>inner</p><div role=\"tabpanel\">deep</div></li></ul>",
                "</div></li></ul></div>"
            )
        );
    }

    #[test]
    fn test_empty_widget_becomes_empty_list() {
        let mut root = Element::new("div");
        root.add_child(Element::new("starlight-tabs"));
        apply(&mut root);
        assert_eq!(root.outer_html(), "<div><ul></ul></div>");
    }
}
