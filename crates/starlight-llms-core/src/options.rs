//! Configuration options for Markdown serialization

use serde::{Deserialize, Serialize};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    Indented,
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
}

/// Options for Markdown serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,
}

impl Options {
    /// GFM-flavoured output: ATX headings, fenced code, `*` bullets.
    pub fn gfm() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "***".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '*',
            strong_delimiter: "**".to_string(),
        }
    }

    /// Setext headings, indented code and `_` emphasis.
    pub fn classic() -> Self {
        Self {
            heading_style: HeadingStyle::Setext,
            hr: "* * *".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::gfm()
    }
}
