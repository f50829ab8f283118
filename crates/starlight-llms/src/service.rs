//! PageConverter - the main entry point for page to Markdown conversion.

use starlight_llms_core::{serialize, Options};
use tracing::{debug, instrument};

use crate::config::{Config, MinifyOptions};
use crate::context::ProcessingContext;
use crate::convert::convert;
use crate::entry::{DocEntry, PageRenderer};
use crate::node::Element;
use crate::selector::Selector;
use crate::transform::{self, whitespace};
use crate::Result;

/// Converts rendered documentation pages to Markdown.
///
/// Holds only resolved configuration; every conversion builds its own tree
/// and [`ProcessingContext`], so one converter can serve many pages
/// concurrently.
#[derive(Debug, Clone)]
pub struct PageConverter {
    minify: MinifyOptions,
    custom_selectors: Vec<Selector>,
    options: Options,
    strict_parsing: bool,
}

impl PageConverter {
    pub fn new() -> Self {
        Self {
            minify: MinifyOptions::default(),
            custom_selectors: Vec::new(),
            options: Options::gfm(),
            strict_parsing: false,
        }
    }

    /// Fails when a custom selector does not parse.
    pub fn with_options(minify: MinifyOptions, options: Options) -> Result<Self> {
        let custom_selectors = minify
            .custom_selectors
            .iter()
            .map(|source| Selector::parse(source))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            minify,
            custom_selectors,
            options,
            strict_parsing: false,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let converter = Self::with_options(config.minify_options(), config.markdown.clone())?;
        Ok(converter.strict_parsing(config.strict_parsing))
    }

    /// Reject malformed markup instead of recovering from it
    pub fn strict_parsing(mut self, strict: bool) -> Self {
        self.strict_parsing = strict;
        self
    }

    pub fn minify_options(&self) -> &MinifyOptions {
        &self.minify
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert a rendered page fragment to Markdown.
        #[instrument(skip_all, fields(bytes = html.len(), minify = should_minify))]
    pub fn html_to_markdown(&self, html: &str, should_minify: bool) -> Result<String> {
        let root = if self.strict_parsing {
            crate::html::parse_html_strict(html)?
        } else {
            crate::html::parse_html(html)
        };
        Ok(self.tree_to_markdown(root, should_minify))
    }

    /// Convert an already parsed page tree to Markdown.
    pub fn tree_to_markdown(&self, mut root: Element, should_minify: bool) -> String {
        let ctx = ProcessingContext::new(&self.minify, &self.custom_selectors, should_minify);
        let report = transform::apply_all(&mut root, &ctx);
        debug!(?report, "page tree rewritten");

        let ast = convert(&root, &self.options);
        let markdown = serialize(&ast, &self.options);
        let markdown = markdown.trim();

        if ctx.collapse_whitespace() {
            whitespace::collapse(markdown)
        } else {
            markdown.to_string()
        }
    }

    /// Markdown for a documentation entry.
    ///
    /// Markdown sources are returned unchanged; anything else is rendered by
    /// `renderer` and converted.
        #[instrument(skip_all, fields(entry = %entry.id, format = ?entry.format))]
    pub fn entry_to_markdown<R>(&self, entry: &DocEntry, renderer: &R, should_minify: bool) -> Result<String>
    where
        R: PageRenderer + ?Sized,
    {
        if entry.format.is_passthrough() {
            debug!("markdown source passed through");
            return Ok(entry.body.clone());
        }

        let html = renderer.render(entry)?;
        self.html_to_markdown(&html, should_minify)
    }
}

impl Default for PageConverter {
    fn default() -> Self {
        Self::new()
    }
}
