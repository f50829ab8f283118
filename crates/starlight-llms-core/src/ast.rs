//! Markdown Abstract Syntax Tree
//!
//! Block and inline nodes for the Markdown dialect emitted for text-only
//! readers: CommonMark plus the GFM table, strikethrough and task-list nodes.

/// A block-level Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Root document container
    Document(Vec<Block>),

    /// Heading with level (1-6) and inline content
    Heading { level: u8, content: Vec<Inline> },

    /// Paragraph containing inline content
    Paragraph(Vec<Inline>),

    /// Block quote containing nested blocks
    BlockQuote(Vec<Block>),

    /// List (ordered or unordered)
    List {
        ordered: bool,
        start: u32,
        items: Vec<ListItem>,
    },

    /// Fenced or indented code block
    CodeBlock {
        language: Option<String>,
        code: String,
        fenced: bool,
    },

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// GFM table with headers and rows
    Table {
        headers: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
}

/// A list item containing blocks.
///
/// `checked` is `Some` for GFM task-list items.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub checked: Option<bool>,
    pub content: Vec<Block>,
}

impl ListItem {
    pub fn new(content: Vec<Block>) -> Self {
        Self {
            checked: None,
            content,
        }
    }

    pub fn task(checked: bool, content: Vec<Block>) -> Self {
        Self {
            checked: Some(checked),
            content,
        }
    }

    pub fn from_inlines(inlines: Vec<Inline>) -> Self {
        Self::new(vec![Block::Paragraph(inlines)])
    }

    pub fn is_blank(&self) -> bool {
        self.checked.is_none() && self.content.iter().all(|b| b.is_blank())
    }
}

/// An inline Markdown node
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text
    Text(String),

    /// Strong emphasis (bold)
    Strong(Vec<Inline>),

    /// Emphasis (italic)
    Emphasis(Vec<Inline>),

    /// GFM strikethrough
    Strikethrough(Vec<Inline>),

    /// Inline code
    Code(String),

    /// Link with text, URL, and optional title
    Link {
        content: Vec<Inline>,
        url: String,
        title: Option<String>,
    },

    /// Image with alt text, URL, and optional title
    Image {
        alt: String,
        url: String,
        title: Option<String>,
    },

    /// Hard line break
    LineBreak,
}

impl Block {
    /// Check if this block is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Block::Document(blocks) | Block::BlockQuote(blocks) => {
                blocks.iter().all(|b| b.is_blank())
            }
            Block::Paragraph(inlines) => inlines.iter().all(|i| i.is_blank()),
            Block::Heading { content, .. } => content.iter().all(|i| i.is_blank()),
            Block::List { items, .. } => items.iter().all(|i| i.is_blank()),
            Block::CodeBlock { code, .. } => code.trim().is_empty(),
            Block::Table { headers, rows } => {
                headers.iter().all(|h| h.iter().all(|i| i.is_blank()))
                    && rows
                        .iter()
                        .all(|r| r.iter().all(|c| c.iter().all(|i| i.is_blank())))
            }
            Block::ThematicBreak => false,
        }
    }
}

impl Inline {
    /// Check if this inline is empty/blank
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text(text) => text.trim().is_empty(),
            Inline::Strong(inlines) | Inline::Emphasis(inlines) | Inline::Strikethrough(inlines) => {
                inlines.iter().all(|i| i.is_blank())
            }
            Inline::Code(code) => code.is_empty(),
            Inline::Link { content, .. } => content.iter().all(|i| i.is_blank()),
            Inline::Image { .. } | Inline::LineBreak => false,
        }
    }
}

