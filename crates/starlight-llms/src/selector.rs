//! Structural selectors.
//!
//! Selectors are parsed with scraper's CSS grammar and matched by the
//! `selectors` engine against the owned [`Element`] tree. A candidate is
//! located by its ancestor chain (nearest ancestor last), which is enough to
//! walk to parents, siblings and children, so sibling combinators,
//! structural pseudo-classes and `:has()` all work on rewritten trees.

use std::fmt;
use std::iter;
use std::ptr;
use std::rc::Rc;
use std::str::FromStr;

use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser as CssParser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode, NeedsSelectorFlags,
    QuirksMode, SelectorCaches,
};
use selectors::parser::ParseRelative;
use selectors::{OpaqueElement, SelectorImpl, SelectorList};

use crate::node::{Element, Node};
use crate::{LlmsError, Result};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A compiled selector list.
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    list: SelectorList<Simple>,
}

impl Selector {
    /// Compile a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&CssParser, &mut parser, ParseRelative::No).map_err(|err| {
            LlmsError::InvalidSelector {
                selector: source.to_string(),
                reason: SelectorErrorKind::from(err).to_string(),
            }
        })?;

        Ok(Self {
            source: source.trim().to_string(),
            list,
        })
    }

    /// The selector text this was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does `element` match, given its ancestors (nearest ancestor last)?
    ///
    /// Sibling tests only see siblings when the last ancestor really is the
    /// parent holding `element`.
    pub fn matches(&self, element: &Element, ancestors: &[&Element]) -> bool {
        let located = Located::new(element, ancestors);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        matching::matches_selector_list(&self.list, &located, &mut context)
    }

    /// Match with no ancestry; combinator selectors never match.
    pub fn matches_element(&self, element: &Element) -> bool {
        self.matches(element, &[])
    }

    /// Every descendant of `root` (excluding `root`) that matches, in document order.
    ///
    /// Ancestry is scoped to the subtree: `root` is the outermost ancestor seen.
    pub fn select<'a>(&self, root: &'a Element) -> Vec<&'a Element> {
        let mut found = Vec::new();
        let mut chain = vec![root];
        self.collect(root, &mut chain, &mut found);
        found
    }

    fn collect<'a>(&self, parent: &'a Element, chain: &mut Vec<&'a Element>, found: &mut Vec<&'a Element>) {
        for child in parent.element_children() {
            if self.matches(child, chain.as_slice()) {
                found.push(child);
            }
            chain.push(child);
            self.collect(child, chain, found);
            chain.pop();
        }
    }
}

impl FromStr for Selector {
    type Err = LlmsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// An element together with the chain of elements above it.
///
/// `path[depth]` is the element; `path[..depth]` are its ancestors, outermost
/// first. Moving to a parent shares the path, moving sideways or down builds
/// a new one.
#[derive(Clone)]
struct Located<'a> {
    path: Rc<[&'a Element]>,
    depth: usize,
}

impl<'a> Located<'a> {
    fn new(element: &'a Element, ancestors: &[&'a Element]) -> Self {
        Self {
            path: ancestors.iter().copied().chain(iter::once(element)).collect(),
            depth: ancestors.len(),
        }
    }

    fn element(&self) -> &'a Element {
        self.path[self.depth]
    }

    fn parent(&self) -> Option<&'a Element> {
        self.depth.checked_sub(1).map(|index| self.path[index])
    }

    /// A sibling of this element, sharing its ancestors
    fn sibling(&self, sibling: &'a Element) -> Self {
        Self::new(sibling, &self.path[..self.depth])
    }
}

impl fmt::Debug for Located<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Located")
            .field("tag", &self.element().tag_name())
            .field("depth", &self.depth)
            .finish()
    }
}

impl selectors::Element for Located<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.element())
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().map(|_| Self {
            path: Rc::clone(&self.path),
            depth: self.depth - 1,
        })
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let parent = self.parent()?;
        let element = self.element();
        let mut previous = None;
        for child in parent.element_children() {
            if ptr::eq(child, element) {
                return previous.map(|sibling| self.sibling(sibling));
            }
            previous = Some(child);
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let parent = self.parent()?;
        let element = self.element();
        let mut children = parent.element_children();
        children.find(|child| ptr::eq(*child, element))?;
        children.next().map(|sibling| self.sibling(sibling))
    }

    fn first_element_child(&self) -> Option<Self> {
        let child = self.element().element_children().next()?;
        Some(Self::new(child, &self.path[..=self.depth]))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.element().tag_name() == &*local_name.0
    }

    fn has_namespace(&self, ns: &<Simple as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        &**ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.element().tag_name() == other.element().tag_name()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&<Simple as SelectorImpl>::NamespaceUrl>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        // Attributes of the owned tree carry no namespace.
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.is_empty() {
                return false;
            }
        }
        self.element()
            .attributes
            .iter()
            .any(|(name, value)| name.as_str() == &*local_name.0 && operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(&self, pc: &NonTSPseudoClass, _context: &mut MatchingContext<'_, Simple>) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(&self, pe: &PseudoElement, _context: &mut MatchingContext<'_, Simple>) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        let element = self.element();
        (element.is("a") || element.is("area")) && element.has_attr("href")
    }

    fn is_html_slot_element(&self) -> bool {
        self.element().is("slot")
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.element()
            .attr("id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.element()
            .classes()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.element().children.iter().any(|child| match child {
            Node::Element(_) => true,
            Node::Text(text) => !text.is_empty(),
        })
    }

    fn is_root(&self) -> bool {
        self.depth == 0
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, attrs: Vec<(&str, &str)>) -> Element {
        Element::with_attrs(tag, attrs)
    }

    /// `<div><h2/><p class="a"/><p class="b"/></div>`
    fn section() -> Element {
        let mut div = el("div", vec![]);
        div.add_child(el("h2", vec![]));
        div.add_child(el("p", vec![("class", "a")]));
        div.add_child(el("p", vec![("class", "b")]));
        div
    }

    fn selected_classes(selector: &str, root: &Element) -> Vec<String> {
        Selector::parse(selector)
            .unwrap()
            .select(root)
            .iter()
            .map(|e| e.attr("class").unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_type_and_class() {
        let span = el("span", vec![("class", "sr-only label")]);
        assert!(Selector::parse("span").unwrap().matches_element(&span));
        assert!(Selector::parse("SPAN.sr-only").unwrap().matches_element(&span));
        assert!(Selector::parse(".label.sr-only").unwrap().matches_element(&span));
        assert!(!Selector::parse("div.sr-only").unwrap().matches_element(&span));
        assert!(!Selector::parse(".sr").unwrap().matches_element(&span));
    }

    #[test]
    fn test_attribute_operators() {
        let a = el("a", vec![("role", "tab"), ("href", "#tab-panel-1"), ("class", "a b"), ("data-x", "Y")]);
        let matches = |s: &str| Selector::parse(s).unwrap().matches_element(&a);

        assert!(matches("[role]"));
        assert!(matches(r#"[role="tab"]"#));
        assert!(matches("[role='tab']"));
        assert!(matches("[role=tab]"));
        assert!(!matches(r#"[role="tabpanel"]"#));
        assert!(matches("[class~=b]"));
        assert!(matches(r##"[href^="#tab"]"##));
        assert!(matches(r#"[href$="-1"]"#));
        assert!(matches(r#"[href*="panel"]"#));
        assert!(!matches("[data-missing]"));
        assert!(!matches(r#"[data-x="y"]"#));
        assert!(matches(r#"[data-x="y" i]"#));
    }

    #[test]
    fn test_id_and_universal() {
        let div = el("div", vec![("id", "main")]);
        assert!(Selector::parse("#main").unwrap().matches_element(&div));
        assert!(Selector::parse("*").unwrap().matches_element(&div));
        assert!(Selector::parse("*#main").unwrap().matches_element(&div));
    }

    #[test]
    fn test_not() {
        let indent = el("span", vec![("class", "indent")]);
        let text = el("span", vec![("style", "--0:#fff")]);
        let selector = Selector::parse("span:not(.indent)").unwrap();
        assert!(!selector.matches_element(&indent));
        assert!(selector.matches_element(&text));
    }

    #[test]
    fn test_selector_list() {
        let selector = Selector::parse(".ec-line.ins, .ec-line.del").unwrap();
        assert!(selector.matches_element(&el("div", vec![("class", "ec-line del")])));
        assert!(!selector.matches_element(&el("div", vec![("class", "ec-line")])));
    }

    #[test]
    fn test_descendant_and_child_combinators() {
        let aside = el("aside", vec![("class", "starlight-aside")]);
        let content = el("div", vec![("class", "starlight-aside__content")]);
        let p = el("p", vec![]);

        let descendant = Selector::parse(".starlight-aside p").unwrap();
        assert!(descendant.matches(&p, &[&aside, &content]));
        assert!(!descendant.matches(&p, &[&content]));

        let child = Selector::parse(".starlight-aside > p").unwrap();
        assert!(!child.matches(&p, &[&aside, &content]));
        assert!(child.matches(&p, &[&content, &aside]));

        let chained = Selector::parse("aside > div p").unwrap();
        assert!(chained.matches(&p, &[&aside, &content]));
        assert!(!chained.matches_element(&p));
    }

    #[test]
    fn test_sibling_combinators() {
        let root = section();
        assert_eq!(selected_classes("h2 + p", &root), vec!["a"]);
        assert_eq!(selected_classes("h2 ~ p", &root), vec!["a", "b"]);
        assert_eq!(selected_classes("p + p", &root), vec!["b"]);
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let root = section();
        assert_eq!(selected_classes("p:last-child", &root), vec!["b"]);
        assert_eq!(selected_classes("div > :nth-child(2)", &root), vec!["a"]);
        assert_eq!(selected_classes("p:first-of-type", &root), vec!["a"]);
        assert_eq!(selected_classes("p:is(.a, .c)", &root), vec!["a"]);
        assert_eq!(selected_classes("p:empty", &root), vec!["a", "b"]);
    }

    #[test]
    fn test_has() {
        let mut outer = el("div", vec![]);
        let mut link = el("a", vec![("class", "with-image")]);
        link.add_child(el("img", vec![]));
        outer.add_child(link);
        outer.add_child(el("a", vec![("class", "plain")]));

        assert_eq!(selected_classes("a:has(img)", &outer), vec!["with-image"]);
    }

    #[test]
    fn test_select_in_document_order() {
        let mut root = el("div", vec![]);
        let mut outer = el("section", vec![("class", "x")]);
        outer.add_child(Node::text("t"));
        outer.add_child(el("span", vec![("class", "x")]));
        root.add_child(outer);
        root.add_child(el("p", vec![("class", "x")]));

        let found = Selector::parse(".x").unwrap().select(&root);
        let tags: Vec<&str> = found.iter().map(|e| e.tag_name()).collect();
        assert_eq!(tags, vec!["section", "span", "p"]);

        let scoped = Selector::parse("div > .x").unwrap().select(&root);
        assert_eq!(scoped.len(), 2);
    }

    #[test]
    fn test_invalid_selectors() {
        for source in ["", "  ", "a,", "div >", "p:no-such-class", "::no-such-element", "!"] {
            let err = Selector::parse(source).unwrap_err();
            assert!(
                matches!(err, LlmsError::InvalidSelector { ref selector, .. } if selector == source),
                "{source:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_source() {
        let selector: Selector = " .custom-banner ".parse().unwrap();
        assert_eq!(selector.to_string(), ".custom-banner");
    }
}
