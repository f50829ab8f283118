//! # starlight-llms
//!
//! Convert rendered Starlight documentation pages to Markdown suited for
//! language-model consumption.
//!
//! ## Design
//!
//! A page is parsed into an owned [`Element`] tree, rewritten in place by a
//! fixed sequence of stages, then converted to the Markdown AST from
//! `starlight-llms-core` and serialized:
//!
//! 1. **Minify filter**: drops configured asides, collapsible sections and
//!    anything matching a custom selector (only when minifying)
//! 2. **Code samples**: moves the language onto `<code>` and restores diff
//!    markers on inserted/deleted lines
//! 3. **Tabs**: flattens each tab widget into a list of labelled panels
//! 4. **File trees**: strips screen-reader-only labels
//! 5. **Convert and serialize**, with GitHub-flavored tables, strikethrough
//!    and task lists
//! 6. **Whitespace**: optionally collapses the result to a single line
//!
//! Entries whose source is already Markdown skip all of this and pass through
//! unchanged.
//!
//! ## Example
//!
//! ```rust
//! use starlight_llms::PageConverter;
//!
//! let converter = PageConverter::new();
//! let html = r#"<h1>Install</h1>
//! <aside class="starlight-aside starlight-aside--tip"><p>Pro tip</p></aside>
//! <p>Run the installer.</p>"#;
//!
//! let full = converter.html_to_markdown(html, false).unwrap();
//! assert_eq!(full, "# Install\n\nPro tip\n\nRun the installer.");
//!
//! let minified = converter.html_to_markdown(html, true).unwrap();
//! assert_eq!(minified, "# Install Run the installer.");
//! ```

pub mod config;
pub mod context;
mod convert;
pub mod entry;
pub mod html;
pub mod node;
pub mod selector;
mod service;
pub mod transform;
mod utilities;
pub mod widget;

pub use config::{Config, MinifyOptions, MinifyOverrides};
pub use context::ProcessingContext;
pub use entry::{DocEntry, PageRenderer, SourceFormat};
pub use html::{parse_html, parse_html_strict};
pub use node::{Element, Node};
pub use selector::Selector;
pub use service::PageConverter;
pub use starlight_llms_core::{CodeBlockStyle, HeadingStyle, Options};
pub use utilities::*;
pub use widget::{AsideVariant, Widget};

/// Error type for page conversion
#[derive(Debug, thiserror::Error)]
pub enum LlmsError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Render error for {entry}: {message}")]
    Render { entry: String, message: String },
}

pub type Result<T> = std::result::Result<T, LlmsError>;
