// Markdown emitter.
//
// Owns the output buffer, the open indent levels and the pending list marker
// or footnote label. Block handlers hand it finished paragraphs, headings and
// table lines; it takes care of blank-line separation and layout.
//
// Only a Markdown list marker or a footnote label opens a container that
// nested blocks can be indented into. Statute markers such as `a)` or `(1)`
// start a plain paragraph, so blocks nested under them stay at the marker's
// own column; one level deeper they would read as indented code.

pub(crate) mod footnote;
pub(crate) mod header;
pub(crate) mod table;
pub(crate) mod wrap;

use std::sync::LazyLock;

use regex::Regex;
use wrap::{layout_paragraph, Layout, WrapOptions};

/// Bullet and ordered list markers.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[*+\-]|\d{1,9}[.)])$").unwrap());

/// Footnote definition labels, `[^id]:`.
static FOOTNOTE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^[^\]]+\]:$").unwrap());

/// Columns an item with `marker` indents its nested blocks by.
fn nested_width(marker: &str, unit: usize) -> usize {
    if LIST_MARKER.is_match(marker) {
        // Nested blocks must reach the column of the item text.
        unit.max(marker.chars().count() + 1)
    } else if FOOTNOTE_LABEL.is_match(marker) {
        unit
    } else {
        0
    }
}

/// A list marker or footnote label waiting for the item's first text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Marker {
    text: String,
    /// Column the marker is written at.
    column: usize,
    /// Whether nested blocks written right below it stay inside the item.
    container: bool,
}

#[derive(Debug)]
pub(crate) struct Emitter {
    out: String,
    /// Columns added by each open indent level.
    levels: Vec<usize>,
    marker: Option<Marker>,
    wrap: WrapOptions,
}

impl Emitter {
    pub fn new(wrap: WrapOptions) -> Self {
        Self {
            out: String::new(),
            levels: Vec::new(),
            marker: None,
            wrap,
        }
    }

    pub fn increase_indent(&mut self) {
        self.levels.push(self.wrap.indent_unit);
    }

    pub fn decrease_indent(&mut self) {
        self.levels.pop();
    }

    /// Column nested content starts at.
    fn column(&self) -> usize {
        self.levels.iter().sum()
    }

    /// Defer `text` as the marker of the item that starts at the current
    /// indent. It is written one level out, in front of the item's first
    /// paragraph. A marker still pending is written alone first.
    ///
    /// The marker decides how far the item's nested blocks are indented.
    pub fn set_marker(&mut self, text: String) {
        self.flush_marker();
        let width = nested_width(&text, self.wrap.indent_unit);
        if let Some(level) = self.levels.last_mut() {
            *level = width;
        }
        let column = self.column() - self.levels.last().copied().unwrap_or(0);
        self.marker = Some(Marker {
            text,
            column,
            container: width > 0,
        });
    }

    /// Write a pending marker on a line of its own.
    pub fn flush_marker(&mut self) {
        if let Some(marker) = self.marker.take() {
            self.ensure_newline();
            let line = format!("{}{}\n", " ".repeat(marker.column), marker.text);
            self.out.push_str(&line);
        }
    }

    fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    /// Separate the next block by exactly one blank line. Does nothing at the
    /// start of the document.
    pub fn blank_line(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") {
            return;
        }
        self.ensure_newline();
        self.out.push('\n');
    }

    /// Start a nested block (list, table). A pending list marker is written on
    /// its own line so the block lands inside the item; otherwise a blank line
    /// separates the block from what came before.
    pub fn block_break(&mut self) {
        let inside_item = self.marker.as_ref().is_some_and(|marker| marker.container);
        self.flush_marker();
        if !inside_item {
            self.blank_line();
        }
    }

    /// Lay out one paragraph of prose. Segments are joined by hard breaks.
    pub fn paragraph(&mut self, segments: &[String]) {
        if segments.is_empty() {
            return;
        }
        self.ensure_newline();
        let layout = match self.marker.take() {
            Some(marker) => Layout::hanging(&marker.text, marker.column),
            None => Layout::block(self.column()),
        };
        let text = layout_paragraph(segments, &layout, self.wrap.width);
        self.out.push_str(&text);
    }

    /// Write an ATX heading as its own block.
    pub fn heading(&mut self, depth: u8, title: &str) {
        self.flush_marker();
        self.blank_line();
        let hashes = "#".repeat(usize::from(depth.clamp(1, 6)));
        self.out.push_str(&format!("{hashes} {title}\n"));
        self.blank_line();
    }

    /// Write a line at the current indentation, without wrapping.
    pub fn line(&mut self, text: &str) {
        self.ensure_newline();
        let line = format!("{}{}\n", " ".repeat(self.column()), text);
        self.out.push_str(&line);
    }

    /// Write pre-rendered Markdown verbatim.
    pub fn push_raw(&mut self, markdown: &str) {
        self.out.push_str(markdown);
    }

    /// The finished document, ending in exactly one newline.
    pub fn finish(self) -> String {
        let mut out = self.out;
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}
