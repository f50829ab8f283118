//! Recognition of the documentation widgets that need rewriting.

use std::fmt;

use crate::node::Element;

/// Class carried by every rich code sample frame
pub const CODE_SAMPLE_CLASS: &str = "expressive-code";
/// Custom element wrapping tabbed content
pub const TABS_TAG: &str = "starlight-tabs";
/// Custom element wrapping a directory tree illustration
pub const FILE_TREE_TAG: &str = "starlight-file-tree";
/// Class carried by every callout
pub const ASIDE_CLASS: &str = "starlight-aside";

/// A callout variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsideVariant {
    Note,
    Tip,
    Caution,
    Danger,
}

impl AsideVariant {
    pub const ALL: [AsideVariant; 4] = [
        AsideVariant::Note,
        AsideVariant::Tip,
        AsideVariant::Caution,
        AsideVariant::Danger,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AsideVariant::Note => "note",
            AsideVariant::Tip => "tip",
            AsideVariant::Caution => "caution",
            AsideVariant::Danger => "danger",
        }
    }

    /// Variant from a `starlight-aside--<variant>` class token
    fn from_class(class: &str) -> Option<Self> {
        let name = class.strip_prefix("starlight-aside--")?;
        Self::ALL.into_iter().find(|v| v.as_str() == name)
    }
}

impl fmt::Display for AsideVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A composite element with behavior Markdown cannot express natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    CodeSample,
    Tabs,
    FileTree,
    Aside(AsideVariant),
}

impl Widget {
    /// Classify an element, if it is one of the known widgets.
    ///
    /// An aside without a recognised variant class is not a widget.
    pub fn recognize(element: &Element) -> Option<Widget> {
        if element.is(TABS_TAG) {
            return Some(Widget::Tabs);
        }
        if element.is(FILE_TREE_TAG) {
            return Some(Widget::FileTree);
        }
        if element.has_class(CODE_SAMPLE_CLASS) {
            return Some(Widget::CodeSample);
        }
        if element.has_class(ASIDE_CLASS) {
            return element
                .classes()
                .find_map(AsideVariant::from_class)
                .map(Widget::Aside);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, class: &str) -> Element {
        Element::with_attrs(tag, vec![("class", class)])
    }

    #[test]
    fn test_recognize_by_tag() {
        assert_eq!(Widget::recognize(&Element::new("STARLIGHT-TABS")), Some(Widget::Tabs));
        assert_eq!(
            Widget::recognize(&Element::new("starlight-file-tree")),
            Some(Widget::FileTree)
        );
    }

    #[test]
    fn test_recognize_by_class() {
        assert_eq!(Widget::recognize(&el("div", "expressive-code")), Some(Widget::CodeSample));
        assert_eq!(
            Widget::recognize(&el("aside", "starlight-aside starlight-aside--caution")),
            Some(Widget::Aside(AsideVariant::Caution))
        );
    }

    #[test]
    fn test_unknown_elements() {
        assert_eq!(Widget::recognize(&el("aside", "starlight-aside")), None);
        assert_eq!(Widget::recognize(&el("aside", "starlight-aside starlight-aside--info")), None);
        assert_eq!(Widget::recognize(&el("div", "starlight-aside--note")), None);
        assert_eq!(Widget::recognize(&Element::new("pre")), None);
    }
}
