//! Code sample normalization.
//!
//! Rich code samples render each line as its own element and carry the
//! language on the `pre` rather than the `code`. This stage puts the
//! language where the converter looks for it, drops the screen-reader
//! caption label, and turns inserted/deleted line flags back into diff
//! markers.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::node::{Element, Node};
use crate::selector::Selector;
use crate::widget::Widget;

static CAPTION_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.sr-only").expect("static selector is valid"));
static DIFF_LINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".ec-line.ins, .ec-line.del").expect("static selector is valid"));
static LINE_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span:not(.indent)").expect("static selector is valid"));

const LINE_CLASS: &str = "ec-line";
const LANGUAGE_PREFIX: &str = "language-";

/// Normalize every code sample under `root`. Returns how many were seen.
pub fn apply(root: &mut Element) -> usize {
    let mut samples = 0;
    root.walk_mut(&mut |element| {
        if Widget::recognize(element) == Some(Widget::CodeSample) {
            normalize_sample(element);
            samples += 1;
        }
    });
    if samples > 0 {
        debug!(samples, "normalized code samples");
    }
    samples
}

fn normalize_sample(sample: &mut Element) {
    if let Some(caption) = sample.find_descendant_mut(&|e| e.is("figcaption")) {
        remove_caption_label(caption);
    }

    let Some(pre) = sample.find_descendant_mut(&|e| e.is("pre")) else {
        return;
    };
    let language = pre
        .attr("data-language")
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .map(str::to_string);
    let Some(language) = language else {
        return;
    };
    let Some(code) = pre.find_descendant_mut(&|e| e.is("code")) else {
        return;
    };

    let is_diff = language == "diff" || !DIFF_LINE.select(code).is_empty();
    if is_diff {
        set_language(code, "diff");
        let mut marked = 0;
        code.walk_mut(&mut |line| {
            if line.has_class(LINE_CLASS) && mark_diff_line(line) {
                marked += 1;
            }
        });
        debug!(language = %language, marked, "code sample rendered as diff");
    } else {
        set_language(code, &language);
    }
}

/// Remove the first screen-reader label from a sample caption.
fn remove_caption_label(caption: &mut Element) {
    let mut removed = false;
    caption.retain_subtrees(&[], &mut |element, ancestors| {
        if !removed && CAPTION_LABEL.matches(element, ancestors) {
            removed = true;
            return true;
        }
        false
    });
}

/// Replace any `language-*` class token with `language-<language>`.
fn set_language(code: &mut Element, language: &str) {
    let token = format!("{LANGUAGE_PREFIX}{language}");
    let classes: Vec<String> = code
        .classes()
        .filter(|class| !class.starts_with(LANGUAGE_PREFIX))
        .map(str::to_string)
        .chain(std::iter::once(token))
        .collect();
    code.set_classes(classes.iter().map(String::as_str));
}

/// Prefix a flagged line's first text-bearing span with `+` or `-`.
///
/// Lines without a class, or flagged as neither inserted nor deleted, are
/// left alone. Returns whether a marker was written.
fn mark_diff_line(line: &mut Element) -> bool {
    let marker = if line.has_class("ins") {
        '+'
    } else if line.has_class("del") {
        '-'
    } else {
        return false;
    };

    let span = line.find_descendant_mut(&|e| {
        LINE_TEXT.matches_element(e) && matches!(e.children.first(), Some(Node::Text(_)))
    });
    match span.and_then(|span| span.children.first_mut()) {
        Some(Node::Text(text)) => {
            text.insert(0, marker);
            true
        }
        _ => false,
    }
}
