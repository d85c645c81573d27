// Element names and attributes.

/// Elements the transducer distinguishes. Names are matched lower-cased,
/// without namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tag {
    Metadaten,
    Norm,
    Textdaten,
    Text,
    Fussnoten,
    Enbez,
    Fnr,
    Dl,
    Dt,
    Dd,
    La,
    P,
    Nb,
    Br,
    Table,
    Tgroup,
    Colspec,
    Thead,
    Tbody,
    Row,
    Entry,
    Footnotes,
    Footnote,
    U,
    I,
    B,
    F,
    Sup,
    Sub,
    Img,
    Title,
    Subtitle,
    /// Inline wrappers without Markdown counterpart.
    Span(String),
    Other(String),
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "metadaten" => Tag::Metadaten,
            "norm" => Tag::Norm,
            "textdaten" => Tag::Textdaten,
            "text" => Tag::Text,
            "fussnoten" => Tag::Fussnoten,
            "enbez" => Tag::Enbez,
            "fnr" => Tag::Fnr,
            "dl" => Tag::Dl,
            "dt" => Tag::Dt,
            "dd" => Tag::Dd,
            "la" => Tag::La,
            "p" => Tag::P,
            "nb" => Tag::Nb,
            "br" => Tag::Br,
            "table" => Tag::Table,
            "tgroup" => Tag::Tgroup,
            "colspec" => Tag::Colspec,
            "thead" => Tag::Thead,
            "tbody" => Tag::Tbody,
            "row" => Tag::Row,
            "entry" => Tag::Entry,
            "footnotes" => Tag::Footnotes,
            "footnote" => Tag::Footnote,
            "u" => Tag::U,
            "i" => Tag::I,
            "b" => Tag::B,
            "f" => Tag::F,
            "sup" => Tag::Sup,
            "sub" => Tag::Sub,
            "img" => Tag::Img,
            "title" => Tag::Title,
            "subtitle" => Tag::Subtitle,
            "sp" | "small" | "quote" | "noindex" => Tag::Span(name.to_string()),
            other => Tag::Other(other.to_string()),
        }
    }

    /// Elements that style text in place instead of delimiting a block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Tag::U
                | Tag::I
                | Tag::B
                | Tag::F
                | Tag::Sup
                | Tag::Sub
                | Tag::Br
                | Tag::Img
                | Tag::Fnr
                | Tag::Span(_)
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::Metadaten => "metadaten",
            Tag::Norm => "norm",
            Tag::Textdaten => "textdaten",
            Tag::Text => "text",
            Tag::Fussnoten => "fussnoten",
            Tag::Enbez => "enbez",
            Tag::Fnr => "fnr",
            Tag::Dl => "dl",
            Tag::Dt => "dt",
            Tag::Dd => "dd",
            Tag::La => "la",
            Tag::P => "p",
            Tag::Nb => "nb",
            Tag::Br => "br",
            Tag::Table => "table",
            Tag::Tgroup => "tgroup",
            Tag::Colspec => "colspec",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Row => "row",
            Tag::Entry => "entry",
            Tag::Footnotes => "footnotes",
            Tag::Footnote => "footnote",
            Tag::U => "u",
            Tag::I => "i",
            Tag::B => "b",
            Tag::F => "f",
            Tag::Sup => "sup",
            Tag::Sub => "sub",
            Tag::Img => "img",
            Tag::Title => "title",
            Tag::Subtitle => "subtitle",
            Tag::Span(name) | Tag::Other(name) => name,
        }
    }
}

/// Attributes of one start tag, keys lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: String) {
        self.0.push((key.to_lowercase(), value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
