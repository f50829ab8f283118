//! Markdown AST serialization
//!
//! Converts Markdown AST nodes into Markdown text.

use crate::ast::{Block, Inline, ListItem};
use crate::options::{CodeBlockStyle, HeadingStyle, Options};

/// Serialize a block to Markdown string
pub fn serialize(block: &Block, options: &Options) -> String {
    let mut output = String::with_capacity(4096);
    serialize_block(block, options, &mut output);

    collapse_and_trim(&mut output);
    output
}

fn serialize_block(block: &Block, options: &Options, out: &mut String) {
    match block {
        Block::Document(blocks) => serialize_blocks(blocks, options, out),

        Block::Heading { level, content } => serialize_heading(*level, content, options, out),

        Block::Paragraph(inlines) => {
            let start_len = out.len();
            serialize_inlines(inlines, options, out);
            if out[start_len..].trim().is_empty() {
                out.truncate(start_len);
            } else {
                out.push_str("\n\n");
            }
        }

        Block::BlockQuote(blocks) => {
            let start_len = out.len();
            serialize_blocks(blocks, options, out);

            let content = out[start_len..].trim_end().to_string();
            out.truncate(start_len);

            for (i, line) in content.lines().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push('>');
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
            }
            out.push_str("\n\n");
        }

        Block::List {
            ordered,
            start,
            items,
        } => serialize_list(*ordered, *start, items, options, out),

        Block::CodeBlock {
            language,
            code,
            fenced,
        } => serialize_code_block(language.as_deref(), code, *fenced, options, out),

        Block::ThematicBreak => {
            out.push_str(&options.hr);
            out.push_str("\n\n");
        }

        Block::Table { headers, rows } => serialize_table(headers, rows, options, out),
    }
}

fn serialize_blocks(blocks: &[Block], options: &Options, out: &mut String) {
    for block in blocks {
        if !block.is_blank() {
            serialize_block(block, options, out);
        }
    }
}

fn serialize_heading(level: u8, content: &[Inline], options: &Options, out: &mut String) {
    let start_len = out.len();
    serialize_inlines(content, options, out);

    if out[start_len..].trim().is_empty() {
        out.truncate(start_len);
        return;
    }

    let text_len = out[start_len..].chars().count();

    match options.heading_style {
        HeadingStyle::Setext if level <= 2 => {
            out.push('\n');
            let underline = if level == 1 { '=' } else { '-' };
            out.extend(std::iter::repeat(underline).take(text_len));
            out.push_str("\n\n");
        }
        _ => {
            let text = out[start_len..].to_string();
            out.truncate(start_len);
            out.extend(std::iter::repeat('#').take(level.clamp(1, 6) as usize));
            out.push(' ');
            out.push_str(&text);
            out.push_str("\n\n");
        }
    }
}

fn serialize_list(ordered: bool, start: u32, items: &[ListItem], options: &Options, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}.  ", start + i as u32)
        } else {
            format!("{}   ", options.bullet_list_marker)
        };
        out.push_str(&marker);
        if let Some(checked) = item.checked {
            out.push_str(if checked { "[x] " } else { "[ ] " });
        }

        serialize_list_item(item, options, marker.len(), out);
    }

    out.push('\n');
}

/// Write an item's blocks, then indent every continuation line under the marker.
fn serialize_list_item(item: &ListItem, options: &Options, prefix_len: usize, out: &mut String) {
    let start_len = out.len();

    for (i, block) in item.content.iter().enumerate() {
        match block {
            Block::Paragraph(inlines) => {
                serialize_inlines(inlines, options, out);
                match item.content.get(i + 1) {
                    Some(Block::List { .. }) => out.push('\n'),
                    Some(_) => out.push_str("\n\n"),
                    None => {}
                }
            }
            Block::List { .. } => {
                if out.len() > start_len && !out.ends_with('\n') {
                    out.push('\n');
                }
                serialize_block(block, options, out);
            }
            _ => serialize_block(block, options, out),
        }
    }

    let content = out[start_len..].trim_end().to_string();
    out.truncate(start_len);

    let continuation_indent = " ".repeat(prefix_len);

    for (i, line) in content.lines().enumerate() {
        if i > 0 && !line.is_empty() {
            out.push_str(&continuation_indent);
        }
        out.push_str(line);
        out.push('\n');
    }
    if content.is_empty() {
        out.push('\n');
    }
}

fn serialize_code_block(
    language: Option<&str>,
    code: &str,
    fenced: bool,
    options: &Options,
    out: &mut String,
) {
    let use_fenced = fenced || options.code_block_style == CodeBlockStyle::Fenced;

    if use_fenced {
        let fence = fence_for(code, &options.fence);
        out.push_str(&fence);
        out.push_str(language.unwrap_or(""));
        out.push('\n');
        out.push_str(code.trim_end_matches('\n'));
        out.push('\n');
        out.push_str(&fence);
        out.push_str("\n\n");
    } else {
        for line in code.lines() {
            if !line.is_empty() {
                out.push_str("    ");
            }
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
}

/// Lengthen the fence until it cannot be closed by a run inside the code.
fn fence_for(code: &str, fence: &str) -> String {
    let Some(fence_char) = fence.chars().next() else {
        return "```".to_string();
    };

    let mut longest = 0;
    let mut current = 0;
    for c in code.chars() {
        if c == fence_char {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }

    let len = fence.chars().count().max(longest + 1);
    std::iter::repeat(fence_char).take(len).collect()
}

fn serialize_table(
    headers: &[Vec<Inline>],
    rows: &[Vec<Vec<Inline>>],
    options: &Options,
    out: &mut String,
) {
    if headers.is_empty() {
        return;
    }

    let header_cells: Vec<String> = headers.iter().map(|h| table_cell(h, options)).collect();
    let row_cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| table_cell(cell, options)).collect())
        .collect();

    // Minimum width of 3 for separator
    let mut widths: Vec<usize> = header_cells.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &row_cells {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    write_table_row(&header_cells, &widths, out);

    out.push('|');
    for &width in &widths {
        out.push(' ');
        out.extend(std::iter::repeat('-').take(width));
        out.push_str(" |");
    }
    out.push('\n');

    for row in &row_cells {
        write_table_row(row, &widths, out);
    }

    out.push('\n');
}

fn table_cell(inlines: &[Inline], options: &Options) -> String {
    let mut cell = String::new();
    serialize_inlines(inlines, options, &mut cell);
    cell.replace('|', "\\|").replace('\n', " ").trim().to_string()
}

fn write_table_row(cells: &[String], widths: &[usize], out: &mut String) {
    out.push('|');
    for (i, &width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        out.push(' ');
        out.push_str(cell);
        let padding = width.saturating_sub(cell.chars().count());
        out.extend(std::iter::repeat(' ').take(padding));
        out.push_str(" |");
    }
    out.push('\n');
}

fn serialize_inlines(inlines: &[Inline], options: &Options, out: &mut String) {
    for inline in inlines {
        serialize_inline(inline, options, out);
    }
}

/// Wrap the serialized inner content in delimiters, dropping it when blank.
fn serialize_delimited(content: &[Inline], open: &str, close: &str, options: &Options, out: &mut String) {
    let start = out.len();
    serialize_inlines(content, options, out);
    if out[start..].trim().is_empty() {
        out.truncate(start);
    } else {
        let inner = out[start..].to_string();
        out.truncate(start);
        out.push_str(open);
        out.push_str(&inner);
        out.push_str(close);
    }
}

fn serialize_inline(inline: &Inline, options: &Options, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(text),

        Inline::Strong(content) => {
            let delimiter = &options.strong_delimiter;
            serialize_delimited(content, delimiter, delimiter, options, out);
        }

        Inline::Emphasis(content) => {
            let delimiter = options.em_delimiter.to_string();
            serialize_delimited(content, &delimiter, &delimiter, options, out);
        }

        Inline::Strikethrough(content) => serialize_delimited(content, "~~", "~~", options, out),

        Inline::Code(code) => {
            if !code.is_empty() {
                let backticks = if code.contains('`') { "``" } else { "`" };
                let space = if code.starts_with('`') || code.ends_with('`') {
                    " "
                } else {
                    ""
                };
                out.push_str(backticks);
                out.push_str(space);
                out.push_str(code);
                out.push_str(space);
                out.push_str(backticks);
            }
        }

        Inline::Link {
            content,
            url,
            title,
        } => {
            out.push('[');
            serialize_inlines(content, options, out);
            out.push_str("](");
            out.push_str(url);
            if let Some(t) = title {
                out.push_str(" \"");
                out.push_str(t);
                out.push('"');
            }
            out.push(')');
        }

        Inline::Image { alt, url, title } => {
            out.push_str("![");
            out.push_str(alt);
            out.push_str("](");
            out.push_str(url);
            if let Some(t) = title {
                out.push_str(" \"");
                out.push_str(t);
                out.push('"');
            }
            out.push(')');
        }

        Inline::LineBreak => out.push_str("  \n"),
    }
}

/// Collapse runs of more than two newlines and trim leading/trailing newlines
fn collapse_and_trim(s: &mut String) {
    let trimmed = s.trim_matches('\n');
    let mut result = String::with_capacity(trimmed.len());
    let mut newline_count = 0;

    for c in trimmed.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push(c);
            }
        } else {
            newline_count = 0;
            result.push(c);
        }
    }

    *s = result;
}
