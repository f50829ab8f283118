//! Tree rewrite stages.
//!
//! Each stage takes the tree by `&mut` and rewrites it in place. They run in
//! a fixed order: minify filter, code samples, tabs, file trees. The final
//! whitespace pass runs on the serialized Markdown instead.

pub mod code;
pub mod file_tree;
pub mod minify;
pub mod tabs;
pub mod whitespace;

use crate::context::ProcessingContext;
use crate::node::Element;

/// What the tree stages did to one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub removed: usize,
    pub code_samples: usize,
    pub tab_widgets: usize,
    pub file_tree_labels: usize,
}

/// Run every tree stage over `root` in order.
pub fn apply_all(root: &mut Element, ctx: &ProcessingContext<'_>) -> TransformReport {
    TransformReport {
        removed: minify::apply(root, ctx),
        code_samples: code::apply(root),
        tab_widgets: tabs::apply(root),
        file_tree_labels: file_tree::apply(root),
    }
}
