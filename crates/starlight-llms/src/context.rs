//! Per-page processing state.

use once_cell::sync::Lazy;

use crate::config::MinifyOptions;
use crate::node::Element;
use crate::selector::Selector;
use crate::widget::{AsideVariant, Widget};

static DETAILS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("details").expect("static selector is valid"));

/// State derived once per page from the minify options.
///
/// Holds the removal selectors (custom selectors, then `details` when
/// enabled) and the aside variants to drop. Both are empty unless the page
/// is being minified.
#[derive(Debug, Clone)]
pub struct ProcessingContext<'a> {
    minify: bool,
    selectors: Vec<&'a Selector>,
    aside_variants: Vec<AsideVariant>,
    collapse_whitespace: bool,
}

impl<'a> ProcessingContext<'a> {
    /// `custom` are the already compiled `customSelectors` of `options`.
    pub fn new(options: &MinifyOptions, custom: &'a [Selector], should_minify: bool) -> Self {
        if !should_minify {
            return Self {
                minify: false,
                selectors: Vec::new(),
                aside_variants: Vec::new(),
                collapse_whitespace: false,
            };
        }

        let mut selectors: Vec<&'a Selector> = custom.iter().collect();
        if options.details {
            selectors.push(&*DETAILS);
        }

        Self {
            minify: true,
            selectors,
            aside_variants: AsideVariant::ALL
                .into_iter()
                .filter(|v| options.removes_aside(*v))
                .collect(),
            collapse_whitespace: options.whitespace,
        }
    }

    pub fn minify(&self) -> bool {
        self.minify
    }

    pub fn selectors(&self) -> &[&'a Selector] {
        &self.selectors
    }

    pub fn aside_variants(&self) -> &[AsideVariant] {
        &self.aside_variants
    }

    /// Whether the final output gets its whitespace collapsed
    pub fn collapse_whitespace(&self) -> bool {
        self.collapse_whitespace
    }

    /// Nothing would be removed by the minify filter
    pub fn removes_nothing(&self) -> bool {
        self.selectors.is_empty() && self.aside_variants.is_empty()
    }

    /// Whether the subtree rooted at `element` is dropped by the minify filter.
    pub fn removes(&self, element: &Element, ancestors: &[&Element]) -> bool {
        if let Some(Widget::Aside(variant)) = Widget::recognize(element) {
            if self.aside_variants.contains(&variant) {
                return true;
            }
        }
        self.selectors.iter().any(|s| s.matches(element, ancestors))
    }
}
