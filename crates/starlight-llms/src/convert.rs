//! Convert the Node tree to a Markdown AST
//!
//! This module maps the rewritten page tree onto the Markdown AST defined in
//! starlight-llms-core, including the GitHub-flavored extensions
//! (strikethrough, task list items and tables).

use std::mem;

use starlight_llms_core::{Block, CodeBlockStyle, Inline, ListItem, Options};

use crate::node::{Element, Node};
use crate::utilities::{clean_attribute, collapse_whitespace, escape_markdown, is_block};

/// Elements whose content never reaches the Markdown
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "head", "title", "meta", "link", "button",
];

/// Convert an element tree to a Markdown AST Block
pub fn convert(root: &Element, options: &Options) -> Block {
    match convert_element(root, options) {
        Some(block) => flatten_document(block),
        None => Block::Document(Vec::new()),
    }
}

/// Flatten nested documents
fn flatten_document(block: Block) -> Block {
    match block {
        Block::Document(mut blocks) if blocks.len() == 1 => flatten_document(blocks.remove(0)),
        other => other,
    }
}

fn is_skipped(element: &Element) -> bool {
    SKIPPED_ELEMENTS.contains(&element.tag_name())
}

/// Inline elements flow into the surrounding paragraph. Custom elements
/// (any tag with a hyphen) are treated as blocks.
fn is_inline(element: &Element) -> bool {
    !is_block(element.tag_name()) && !element.tag_name().contains('-')
}

/// Convert children of an element to blocks.
///
/// Runs of text and inline elements between blocks are gathered into one
/// paragraph each. Container fragments are spliced into the result.
fn convert_children(element: &Element, options: &Options) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending = Vec::new();

    for child in &element.children {
        match child {
            Node::Text(text) => push_text(text, &mut pending),
            Node::Element(child) if is_skipped(child) => {}
            Node::Element(child) if is_inline(child) => push_inline_element(child, options, &mut pending),
            Node::Element(child) => {
                flush_paragraph(&mut pending, &mut blocks);
                match convert_element(child, options) {
                    Some(Block::Document(inner)) => blocks.extend(inner),
                    Some(block) => blocks.push(block),
                    None => {}
                }
            }
        }
    }
    flush_paragraph(&mut pending, &mut blocks);

    blocks
}

fn flush_paragraph(pending: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
    let inlines = mem::take(pending);
    if let Some(paragraph) = paragraph(inlines) {
        blocks.push(paragraph);
    }
}

fn paragraph(mut inlines: Vec<Inline>) -> Option<Block> {
    trim_inlines(&mut inlines);
    if inlines_are_blank(&inlines) {
        None
    } else {
        Some(Block::Paragraph(inlines))
    }
}

/// Wrap a block list: nothing, the single block, or a document fragment
fn blocks_to_block(mut blocks: Vec<Block>) -> Option<Block> {
    match blocks.len() {
        0 => None,
        1 => Some(blocks.remove(0)),
        _ => Some(Block::Document(blocks)),
    }
}

/// Convert an element to a Block
fn convert_element(element: &Element, options: &Options) -> Option<Block> {
    let tag = element.tag_name();

    match tag {
        "p" => paragraph(collect_inlines(element, options)),

        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag.chars().nth(1)?.to_digit(10)? as u8;
            let mut content = collect_inlines(element, options);
            trim_inlines(&mut content);
            if inlines_are_blank(&content) {
                None
            } else {
                Some(Block::Heading { level, content })
            }
        }

        "blockquote" => {
            let blocks = convert_children(element, options);
            if blocks.is_empty() {
                None
            } else {
                Some(Block::BlockQuote(blocks))
            }
        }

        "ul" => convert_list(element, false, options),
        "ol" => convert_list(element, true, options),

        "pre" => Some(convert_code_block(element, options)),

        "hr" => Some(Block::ThematicBreak),

        "table" => convert_table(element, options),

        _ if is_skipped(element) => None,

        // Inline-only elements at block level - convert as inline and wrap in paragraph
        _ if is_inline(element) => {
            let mut inlines = Vec::new();
            push_inline_element(element, options, &mut inlines);
            paragraph(inlines)
        }

        // Containers, custom elements and anything else block-level
        _ => blocks_to_block(convert_children(element, options)),
    }
}

fn convert_list(element: &Element, ordered: bool, options: &Options) -> Option<Block> {
    let start = if ordered {
        element
            .attr("start")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1)
    } else {
        1
    };

    let items: Vec<ListItem> = element
        .element_children()
        .filter(|child| child.is("li"))
        .map(|li| convert_list_item(li, options))
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(Block::List { ordered, start, items })
    }
}

fn convert_list_item(li: &Element, options: &Options) -> ListItem {
    let content = convert_children(li, options);
    match task_checkbox(li) {
        Some(checked) => ListItem::task(checked, content),
        None => ListItem::new(content),
    }
}

/// Checked state of a task list item: its first element is a checkbox,
/// either directly or at the start of a leading paragraph.
fn task_checkbox(li: &Element) -> Option<bool> {
    let first = li.element_children().next()?;
    let input = if first.is("p") {
        first.element_children().next()?
    } else {
        first
    };

    let is_checkbox = input.is("input")
        && input
            .attr("type")
            .is_some_and(|kind| kind.eq_ignore_ascii_case("checkbox"));
    is_checkbox.then(|| input.has_attr("checked"))
}

fn convert_code_block(pre: &Element, options: &Options) -> Block {
    let fenced = options.code_block_style == CodeBlockStyle::Fenced;

    match pre.element_children().find(|child| child.is("code")) {
        Some(code) => Block::CodeBlock {
            language: code_language(code),
            code: code_text(code),
            fenced,
        },
        None => Block::CodeBlock {
            language: None,
            code: code_text(pre),
            fenced,
        },
    }
}

/// Language from a `language-<name>` class token
fn code_language(code: &Element) -> Option<String> {
    code.classes()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}

/// Source text of a code element.
///
/// Block-level descendants and `<br>` end a line, so samples rendered with
/// one element per line keep their line structure. Trailing newlines are
/// dropped.
fn code_text(element: &Element) -> String {
    let mut out = String::new();
    push_code_text(element, &mut out);
    out.truncate(out.trim_end_matches('\n').len());
    out
}

fn push_code_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) if child.is("br") => out.push('\n'),
            Node::Element(child) if is_block(child.tag_name()) => {
                end_line(out);
                push_code_text(child, out);
                end_line(out);
            }
            Node::Element(child) => push_code_text(child, out),
        }
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Convert a table element
fn convert_table(table: &Element, options: &Options) -> Option<Block> {
    let mut headers: Vec<Vec<Inline>> = Vec::new();
    let mut rows: Vec<Vec<Vec<Inline>>> = Vec::new();

    for section in table.element_children() {
        match section.tag_name() {
            "thead" => {
                if let Some(tr) = section.element_children().find(|c| c.is("tr")) {
                    headers = table_row(tr, options).0;
                }
            }
            "tbody" | "tfoot" => {
                for tr in section.element_children().filter(|c| c.is("tr")) {
                    let (row, _) = table_row(tr, options);
                    if !row.is_empty() {
                        rows.push(row);
                    }
                }
            }
            // Direct tr children (no thead/tbody)
            "tr" => {
                let (row, is_header) = table_row(section, options);
                if row.is_empty() {
                    continue;
                }
                if is_header && headers.is_empty() && rows.is_empty() {
                    headers = row;
                } else {
                    rows.push(row);
                }
            }
            _ => {}
        }
    }

    if headers.is_empty() && rows.is_empty() {
        return None;
    }

    // If no headers, use first row as headers
    if headers.is_empty() {
        headers = rows.remove(0);
    }

    Some(Block::Table { headers, rows })
}

/// Cells of a table row, and whether any of them is a header cell
fn table_row(tr: &Element, options: &Options) -> (Vec<Vec<Inline>>, bool) {
    let mut is_header = false;
    let cells = tr
        .element_children()
        .filter(|cell| cell.is("td") || cell.is("th"))
        .map(|cell| {
            is_header |= cell.is("th");
            let mut content = collect_inlines(cell, options);
            trim_inlines(&mut content);
            content
        })
        .collect();
    (cells, is_header)
}

/// Collect inline content from an element
fn collect_inlines(element: &Element, options: &Options) -> Vec<Inline> {
    let mut inlines = Vec::new();

    for child in &element.children {
        match child {
            Node::Text(text) => push_text(text, &mut inlines),
            Node::Element(child) if is_skipped(child) => {}
            Node::Element(child) => push_inline_element(child, options, &mut inlines),
        }
    }

    inlines
}

fn push_text(text: &str, out: &mut Vec<Inline>) {
    let collapsed = collapse_whitespace(text);
    if !collapsed.is_empty() {
        out.push(Inline::Text(escape_markdown(&collapsed)));
    }
}

/// Convert an inline element, appending the result to `out`
fn push_inline_element(element: &Element, options: &Options, out: &mut Vec<Inline>) {
    match element.tag_name() {
        "strong" | "b" => {
            let inner = collect_inlines(element, options);
            if !inlines_are_blank(&inner) {
                out.push(Inline::Strong(inner));
            }
        }

        "em" | "i" => {
            let inner = collect_inlines(element, options);
            if !inlines_are_blank(&inner) {
                out.push(Inline::Emphasis(inner));
            }
        }

        "del" | "s" | "strike" => {
            let inner = collect_inlines(element, options);
            if !inlines_are_blank(&inner) {
                out.push(Inline::Strikethrough(inner));
            }
        }

        "code" | "kbd" => {
            let text = element.text_content();
            if !text.is_empty() {
                out.push(Inline::Code(text));
            }
        }

        "a" => {
            let href = clean_attribute(element.attr("href"));
            let title = Some(clean_attribute(element.attr("title"))).filter(|t| !t.is_empty());
            let content = collect_inlines(element, options);

            if href.is_empty() {
                // No link target, keep the content
                out.extend(content);
            } else {
                out.push(Inline::Link {
                    content,
                    url: href,
                    title,
                });
            }
        }

        "img" => {
            let src = clean_attribute(element.attr("src"));
            if !src.is_empty() {
                out.push(Inline::Image {
                    alt: clean_attribute(element.attr("alt")),
                    url: src,
                    title: Some(clean_attribute(element.attr("title"))).filter(|t| !t.is_empty()),
                });
            }
        }

        "br" => out.push(Inline::LineBreak),

        // Task list checkboxes are read from the list item
        "input" => {}

        // Nested block elements inside inline context keep a word boundary
        tag if is_block(tag) => {
            if !out.is_empty() {
                out.push(Inline::Text(" ".to_string()));
            }
            out.extend(collect_inlines(element, options));
        }

        // Pass-through inline containers (span, small, mark, abbr, ...)
        _ => out.extend(collect_inlines(element, options)),
    }
}

/// Trim leading whitespace of the first text and trailing whitespace of the
/// last, dropping text that becomes empty.
fn trim_inlines(inlines: &mut Vec<Inline>) {
    while let Some(Inline::Text(text)) = inlines.first_mut() {
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            inlines.remove(0);
        } else {
            *text = trimmed.to_string();
            break;
        }
    }
    while let Some(Inline::Text(text)) = inlines.last_mut() {
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            inlines.pop();
        } else {
            *text = trimmed.to_string();
            break;
        }
    }
}

/// Check if inlines are all blank
fn inlines_are_blank(inlines: &[Inline]) -> bool {
    inlines.iter().all(|i| i.is_blank())
}
