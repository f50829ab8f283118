//! starlight-llms-core - Markdown AST and serialization
//!
//! This crate provides the Markdown document tree produced by the
//! `starlight-llms` converter, including the GFM table, strikethrough and
//! task-list nodes, and the serializer that renders it to text.
//!
//! # Architecture
//!
//! ```text
//! rendered HTML ──parse──▶ Node tree ──rewrite──▶ ┌──────────────┐
//!                                                 │ Markdown AST │ ──▶ Markdown String
//!                                                 └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use starlight_llms_core::{Block, Inline, Options, serialize};
//!
//! let ast = Block::Document(vec![
//!     Block::Heading {
//!         level: 1,
//!         content: vec![Inline::Text("Hello World".to_string())],
//!     },
//!     Block::Paragraph(vec![
//!         Inline::Text("This is ".to_string()),
//!         Inline::Strikethrough(vec![Inline::Text("old".to_string())]),
//!         Inline::Text(" text.".to_string()),
//!     ]),
//! ]);
//!
//! let markdown = serialize(&ast, &Options::gfm());
//! assert_eq!(markdown, "# Hello World\n\nThis is ~~old~~ text.");
//! ```

mod ast;
mod options;
mod serialize;

pub use ast::{Block, Inline, ListItem};
pub use options::{CodeBlockStyle, HeadingStyle, Options};
pub use serialize::serialize;
