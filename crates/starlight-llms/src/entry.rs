//! Documentation entries and the page rendering boundary.

use std::path::Path;

use crate::Result;

/// Source dialect of a documentation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Plain Markdown; already the output dialect.
    Markdown,
    Mdx,
    Markdoc,
    Other,
}

impl SourceFormat {
    /// Format from a file extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "md" | "markdown" => SourceFormat::Markdown,
            "mdx" => SourceFormat::Mdx,
            "mdoc" => SourceFormat::Markdoc,
            _ => SourceFormat::Other,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|extension| extension.to_str())
            .map_or(SourceFormat::Other, SourceFormat::from_extension)
    }

    /// Entries in this format skip conversion and pass through unchanged
    pub fn is_passthrough(self) -> bool {
        self == SourceFormat::Markdown
    }
}

/// A documentation entry: identifier, source format and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocEntry {
    pub id: String,
    pub format: SourceFormat,
    pub body: String,
}

impl DocEntry {
    pub fn new(id: impl Into<String>, format: SourceFormat, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            format,
            body: body.into(),
        }
    }
}

/// Renders an entry's body to page markup.
///
/// Implementations report failures as [`crate::LlmsError::Render`].
pub trait PageRenderer {
    fn render(&self, entry: &DocEntry) -> Result<String>;
}

impl<F> PageRenderer for F
where
    F: Fn(&DocEntry) -> Result<String>,
{
    fn render(&self, entry: &DocEntry) -> Result<String> {
        self(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_extension("md"), SourceFormat::Markdown);
        assert_eq!(SourceFormat::from_extension("MDX"), SourceFormat::Mdx);
        assert_eq!(SourceFormat::from_extension("mdoc"), SourceFormat::Markdoc);
        assert_eq!(SourceFormat::from_extension("html"), SourceFormat::Other);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path("docs/guides/intro.md"), SourceFormat::Markdown);
        assert_eq!(SourceFormat::from_path("docs/index.mdx"), SourceFormat::Mdx);
        assert_eq!(SourceFormat::from_path("README"), SourceFormat::Other);
    }

    #[test]
    fn test_only_markdown_passes_through() {
        assert!(SourceFormat::Markdown.is_passthrough());
        assert!(!SourceFormat::Mdx.is_passthrough());
        assert!(!SourceFormat::Other.is_passthrough());
    }

    #[test]
    fn test_closure_renderer() {
        let renderer = |entry: &DocEntry| -> Result<String> { Ok(format!("<p>{}</p>", entry.body)) };
        let entry = DocEntry::new("intro", SourceFormat::Mdx, "hi");
        assert_eq!(renderer.render(&entry).unwrap(), "<p>hi</p>");
    }
}
