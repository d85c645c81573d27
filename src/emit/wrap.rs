// Wrapping and indentation engine.
//
// Reflows accumulated prose to a fixed width and lays the lines out under the
// current indentation or, right after a list marker or footnote label, under
// the first character of the item text. The width is counted on the text
// alone, escapes and hard-break backslashes included; the indent is prepended
// afterwards.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use textwrap::core::display_width;
use textwrap::{WordSplitter, WrapAlgorithm};

/// Line layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    /// Wrap width in columns, not counting indentation. Default: 70.
    pub width: usize,
    /// Spaces per indent level. Default: 4.
    pub indent_unit: usize,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            width: 70,
            indent_unit: 4,
        }
    }
}

/// `12.` / `3)` at line start would open an ordered list.
static ORDERED_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([.)])(\s|$)").unwrap());

/// Bullets, ATX headings and block quotes at line start.
static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([*+\->]|#{1,6})(\s|$)").unwrap());

/// Line prefixes for one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    /// Written before the first line (indent, or indent + marker + padding).
    pub first: String,
    /// Written before every other line.
    pub rest: String,
    /// False when the first line continues a marker and must stay as is.
    pub neutralize_first: bool,
}

impl Layout {
    /// Plain block layout at `indent` spaces.
    pub fn block(indent: usize) -> Self {
        let prefix = " ".repeat(indent);
        Self {
            first: prefix.clone(),
            rest: prefix,
            neutralize_first: true,
        }
    }

    /// Hanging layout for text that follows `marker` written at `marker_indent`.
    ///
    /// The text starts one space after the marker; continuation lines are
    /// indented to that same column.
    pub fn hanging(marker: &str, marker_indent: usize) -> Self {
        let first = format!("{}{} ", " ".repeat(marker_indent), marker);
        let rest = " ".repeat(first.chars().count());
        Self {
            first,
            rest,
            neutralize_first: false,
        }
    }
}

fn textwrap_options<'a>(width: usize) -> textwrap::Options<'a> {
    textwrap::Options::new(width.max(1))
        .break_words(false)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit)
}

/// Reflow `text` to `width` columns. Whitespace runs, newlines included, are
/// treated as single word separators.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }
    let options = textwrap_options(width);
    textwrap::wrap(&normalized, &options)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}

/// Escape a line start that Markdown would read as a list item, heading or
/// block quote.
pub(crate) fn neutralize_line_start(line: &str) -> Cow<'_, str> {
    if let Cow::Owned(s) = ORDERED_START.replace(line, "${1}\\${2}${3}") {
        return Cow::Owned(s);
    }
    BLOCK_START.replace(line, "\\${1}${2}")
}

/// Wrap one segment so that every line still fits `width` once its start is
/// escaped and `trailing` columns are appended to the last line.
///
/// A line the escape pushes over the width gives up its last word to the next
/// line, the same break a greedy wrap of the escaped text would choose.
fn fit_lines(text: &str, width: usize, neutralize_first: bool, trailing: usize) -> Vec<String> {
    let mut lines = wrap_text(text, width);
    let mut i = 0;
    while i < lines.len() {
        let mut used = if i > 0 || neutralize_first {
            display_width(&neutralize_line_start(&lines[i]))
        } else {
            display_width(&lines[i])
        };
        if i + 1 == lines.len() {
            used += trailing;
        }
        if used > width {
            if let Some((head, tail)) = lines[i].rsplit_once(' ') {
                let rest = std::iter::once(tail)
                    .chain(lines[i + 1..].iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ");
                let head = head.to_string();
                lines.truncate(i);
                lines.push(head);
                lines.extend(wrap_text(&rest, width));
                continue;
            }
        }
        i += 1;
    }
    lines
}

/// Lay out paragraph segments. Segments are separated by hard line breaks.
pub(crate) fn layout_paragraph(segments: &[String], layout: &Layout, width: usize) -> String {
    let mut out = String::new();
    let mut first_line = true;

    for (si, segment) in segments.iter().enumerate() {
        let last_segment = si + 1 == segments.len();
        let neutralize_first = !first_line || layout.neutralize_first;
        let trailing = if last_segment { 0 } else { 1 };
        let lines = fit_lines(segment, width, neutralize_first, trailing);
        for (li, line) in lines.iter().enumerate() {
            let (prefix, body) = if first_line {
                let body = if layout.neutralize_first {
                    neutralize_line_start(line)
                } else {
                    Cow::Borrowed(line.as_str())
                };
                (&layout.first, body)
            } else {
                (&layout.rest, neutralize_line_start(line))
            };
            first_line = false;
            out.push_str(prefix);
            out.push_str(&body);
            if li + 1 == lines.len() && !last_segment {
                out.push('\\');
            }
            out.push('\n');
        }
    }

    out
}
