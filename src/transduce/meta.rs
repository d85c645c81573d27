// Metadata blocks.
//
// Every `metadaten` element is collected into a flat record of raw field
// values keyed by the closing tag name. The first record describes the whole
// document; later ones describe the norm that follows.

/// `enbez` value that marks a table-of-contents norm.
const TABLE_OF_CONTENTS: &str = "Inhaltsübersicht";

/// Field values collected from one `metadaten` block.
///
/// Keys keep the order in which they first occur; each key keeps its values
/// in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: Vec<(String, Vec<String>)>,
    pending: String,
    toc: bool,
}

impl Metadata {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    /// Store the text collected since the last field under `name`.
    /// Empty values are dropped.
    pub(crate) fn close_field(&mut self, name: &str) {
        let value = std::mem::take(&mut self.pending)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            return;
        }
        if name == "enbez" && value == TABLE_OF_CONTENTS {
            self.toc = true;
            return;
        }
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some((_, values)) => values.push(value),
            None => self.fields.push((name.to_string(), vec![value])),
        }
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values recorded for `key`, in document order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Every field with its values, keys in order of first occurrence.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Whether this block introduces the table of contents.
    pub fn is_table_of_contents(&self) -> bool {
        self.toc
    }

    /// Heading text of a norm: the outline designation (with its title
    /// after ` - `), then the individual designation, then the title.
    pub fn norm_title(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        match (self.get("gliederungsbez"), self.get("gliederungstitel")) {
            (Some(bez), Some(titel)) => parts.push(format!("{bez} - {titel}")),
            (Some(only), None) | (None, Some(only)) => parts.push(only.to_string()),
            (None, None) => {}
        }
        parts.extend(self.get("enbez").map(str::to_string));
        parts.extend(self.get("titel").map(str::to_string));
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Label the heading anchor is derived from.
    pub fn anchor_label(&self) -> Option<&str> {
        self.get("enbez").or_else(|| self.get("gliederungsbez"))
    }
}

/// Strip the ` *)` footnote hint official titles carry.
pub(crate) fn clean_title(title: &str) -> String {
    title.replace(" *)", "").trim().to_string()
}

/// Heading depth tracker.
///
/// A norm with an outline code gets depth `len / 3 + 1` (three characters
/// per outline level). Norms without one sit one level below the last coded
/// norm. Depths are clamped to 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeadingDepth {
    last: u8,
}

impl Default for HeadingDepth {
    fn default() -> Self {
        Self { last: 1 }
    }
}

impl HeadingDepth {
    pub fn next(&mut self, code: Option<&str>) -> u8 {
        match code {
            Some(code) => {
                let depth = (code.chars().count() / 3 + 1).min(6) as u8;
                self.last = depth;
                depth
            }
            None => (self.last + 1).min(6),
        }
    }
}
