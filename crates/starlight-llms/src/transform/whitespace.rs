//! Whitespace collapse over the finished Markdown.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Replace every whitespace run, newlines included, with one space.
pub fn collapse(markdown: &str) -> String {
    WHITESPACE_RUN.replace_all(markdown, " ").into_owned()
}
