//! Owned structural node tree.
//!
//! A rendered page is parsed into this tree once and then rewritten in place
//! by the widget stages before it is converted to Markdown. Every parser (or a
//! caller that already holds a DOM) can build this structure directly.

use std::mem;

use indexmap::IndexMap;

use crate::utilities::is_void;

/// A structural node: an element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Removal decision for one element child, in child order.
enum Verdict {
    Remove,
    Keep(Vec<Verdict>),
}

/// An element with a lower-case tag, ordered attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element::new(tag_name))
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        Node::Element(Element::with_attrs(tag_name, attrs))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    /// Serialize back to markup
    pub fn outer_html(&self) -> String {
        match self {
            Node::Text(text) => escape_html_text(text),
            Node::Element(el) => el.outer_html(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag: tag_name.to_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut element = Self::new(tag_name);
        for (name, value) in attrs {
            element.set_attr(name, value);
        }
        element
    }

    /// Get the tag name (lowercase)
    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    /// Case-insensitive tag comparison
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing any existing value under the same name
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Class tokens in attribute order
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Replace the class token set
    pub fn set_classes<'a>(&mut self, classes: impl IntoIterator<Item = &'a str>) {
        let joined = classes.into_iter().collect::<Vec<_>>().join(" ");
        self.set_attr("class", &joined);
    }

    /// Add a child node
    pub fn add_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.push_text(out),
            }
        }
    }

    /// First descendant (pre-order, excluding `self`) satisfying `pred`
    pub fn find_descendant<F>(&self, pred: &F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        for child in self.element_children() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`Element::find_descendant`]
    pub fn find_descendant_mut<F>(&mut self, pred: &F) -> Option<&mut Element>
    where
        F: Fn(&Element) -> bool,
    {
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Visit `self` and every descendant element, parents before children.
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        f(self);
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            child.walk_mut(f);
        }
    }

    /// Visit every descendant element and then `self`, children before parents.
    pub fn walk_mut_post<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            child.walk_mut_post(f);
        }
        f(self);
    }

    /// Drop every descendant subtree whose root satisfies `remove`.
    ///
    /// `remove` sees the candidate and its ancestor chain (nearest last,
    /// `self` included). Every decision is taken against the untouched tree,
    /// top-down, and removed subtrees are never descended into. Each level's
    /// child sequence is then rebuilt rather than spliced. Returns the number
    /// of subtrees removed.
    pub fn retain_subtrees<F>(&mut self, ancestors: &[&Element], remove: &mut F) -> usize
    where
        F: FnMut(&Element, &[&Element]) -> bool,
    {
        let verdicts = {
            let mut chain: Vec<&Element> = ancestors.to_vec();
            chain.push(&*self);
            self.plan_removals(&mut chain, remove)
        };
        self.apply_removals(verdicts)
    }

    fn plan_removals<'a, F>(&'a self, chain: &mut Vec<&'a Element>, remove: &mut F) -> Vec<Verdict>
    where
        F: FnMut(&Element, &[&Element]) -> bool,
    {
        let mut verdicts = Vec::new();
        for child in self.element_children() {
            if remove(child, chain.as_slice()) {
                verdicts.push(Verdict::Remove);
                continue;
            }
            chain.push(child);
            verdicts.push(Verdict::Keep(child.plan_removals(chain, remove)));
            chain.pop();
        }
        verdicts
    }

    fn apply_removals(&mut self, verdicts: Vec<Verdict>) -> usize {
        let mut verdicts = verdicts.into_iter();
        let children = mem::take(&mut self.children);
        let mut kept = Vec::with_capacity(children.len());
        let mut removed = 0;

        for mut child in children {
            if let Node::Element(el) = &mut child {
                match verdicts.next() {
                    Some(Verdict::Remove) => {
                        removed += 1;
                        continue;
                    }
                    Some(Verdict::Keep(nested)) => removed += el.apply_removals(nested),
                    None => {}
                }
            }
            kept.push(child);
        }

        self.children = kept;
        removed
    }

    /// Reconstruct outer HTML
    pub fn outer_html(&self) -> String {
        let attrs = self.attributes_string();
        let open = if attrs.is_empty() {
            format!("<{}>", self.tag)
        } else {
            format!("<{} {}>", self.tag, attrs)
        };

        if is_void(&self.tag) {
            open
        } else {
            format!("{}{}</{}>", open, self.inner_html(), self.tag)
        }
    }

    /// Reconstruct inner HTML
    pub fn inner_html(&self) -> String {
        self.children.iter().map(Node::outer_html).collect()
    }

    fn attributes_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
