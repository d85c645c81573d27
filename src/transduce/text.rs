// Pending text buffer and inline escaping.
//
// Character data is buffered between block boundaries as a small AST of text
// runs and line breaks. Inline elements (underline, bold, ...) remember where
// they started so their content can be wrapped in Markdown markers when they
// close. Markers and anchors are pushed verbatim; source text is escaped.

/// One piece of pending inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(String),
    Break,
}

/// Markdown styling applied to a closed inline element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InlineStyle {
    /// ` *text* `
    Emphasis,
    /// ` **text** `
    Strong,
    /// Content replaced by a literal asterisk.
    Asterisk,
    /// `<sup>text</sup>`
    Superscript,
    /// `<sub>text</sub>`
    Subscript,
}

/// Position in the buffer where an open inline element started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
    piece: usize,
    offset: usize,
}

/// Accumulated, not yet emitted inline content.
#[derive(Debug, Default)]
pub(crate) struct TextBuffer {
    pieces: Vec<Piece>,
    marks: Vec<Mark>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append source character data: whitespace collapsed, emphasis escaped.
    pub fn push_text(&mut self, raw: &str) {
        let escaped = escape_emphasis(raw);
        self.push_collapsed(&escaped);
    }

    /// Append Markdown that must not be escaped (anchors, images).
    pub fn push_markup(&mut self, markup: &str) {
        self.push_collapsed(markup);
    }

    pub fn push_break(&mut self) {
        self.pieces.push(Piece::Break);
    }

    /// Mark a block boundary inside inline-only content (a table cell).
    /// Boundaries at the start or after another break are dropped.
    pub fn push_boundary(&mut self) {
        if !self.is_blank() && !matches!(self.pieces.last(), Some(Piece::Break)) {
            self.pieces.push(Piece::Break);
        }
    }

    fn push_collapsed(&mut self, s: &str) {
        let current = self.current_text();
        // A fresh run starts without leading space.
        let mut last_space = current.is_empty() || current.ends_with(' ');
        for c in s.chars() {
            if c.is_whitespace() {
                if !last_space {
                    current.push(' ');
                    last_space = true;
                }
            } else {
                current.push(c);
                last_space = false;
            }
        }
    }

    fn current_text(&mut self) -> &mut String {
        if !matches!(self.pieces.last(), Some(Piece::Text(_))) {
            self.pieces.push(Piece::Text(String::new()));
        }
        match self.pieces.last_mut() {
            Some(Piece::Text(s)) => s,
            _ => unreachable!("a text piece was just pushed"),
        }
    }

    /// Record the start of an inline element.
    pub fn open_inline(&mut self) {
        let offset = self.current_text().len();
        let piece = self.pieces.len() - 1;
        self.marks.push(Mark { piece, offset });
    }

    /// Close the innermost inline element, styling its content.
    ///
    /// Content interrupted by a line break is left unstyled.
    pub fn close_inline(&mut self, style: InlineStyle) {
        let Some(mark) = self.marks.pop() else {
            return;
        };
        if mark.piece + 1 != self.pieces.len() {
            return;
        }
        let Some(Piece::Text(run)) = self.pieces.last_mut() else {
            return;
        };
        let inner = run.split_off(mark.offset);
        let inner = inner.trim();
        let styled = match style {
            InlineStyle::Asterisk => "\\*".to_string(),
            _ if inner.is_empty() => String::new(),
            InlineStyle::Emphasis => format!(" *{inner}* "),
            InlineStyle::Strong => format!(" **{inner}** "),
            InlineStyle::Superscript => format!("<sup>{inner}</sup>"),
            InlineStyle::Subscript => format!("<sub>{inner}</sub>"),
        };
        self.push_collapsed(&styled);
    }

    pub fn is_blank(&self) -> bool {
        self.pieces.iter().all(|p| match p {
            Piece::Text(s) => s.trim().is_empty(),
            Piece::Break => true,
        })
    }

    /// Take the buffered content as raw pieces (used for table cells).
    pub fn take_pieces(&mut self) -> Vec<Piece> {
        self.marks.clear();
        std::mem::take(&mut self.pieces)
    }

    /// Take the buffered content as trimmed, non-empty paragraph segments.
    /// Line breaks separate segments.
    pub fn take_segments(&mut self) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = String::new();
        for piece in self.take_pieces() {
            match piece {
                Piece::Text(s) => current.push_str(&s),
                Piece::Break => {
                    let segment = current.trim();
                    if !segment.is_empty() {
                        segments.push(segment.to_string());
                    }
                    current.clear();
                }
            }
        }
        let segment = current.trim();
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
        segments
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
        self.marks.clear();
    }
}

fn is_emphasis_char(c: char) -> bool {
    c == '*' || c == '_'
}

/// Backslash-escape `*` and `_` wherever Markdown could read them as emphasis.
///
/// Leading pass: the character is followed by non-whitespace. Trailing pass:
/// it is preceded by non-whitespace other than a backslash.
pub(crate) fn escape_emphasis(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut escape = vec![false; chars.len()];

    for i in 0..chars.len() {
        if is_emphasis_char(chars[i]) && chars.get(i + 1).is_some_and(|n| !n.is_whitespace()) {
            escape[i] = true;
        }
    }
    for i in 1..chars.len() {
        let prev = chars[i - 1];
        if is_emphasis_char(chars[i]) && !prev.is_whitespace() && prev != '\\' {
            escape[i] = true;
        }
    }

    let mut out = String::with_capacity(text.len() + 4);
    for (c, esc) in chars.into_iter().zip(escape) {
        if esc {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
