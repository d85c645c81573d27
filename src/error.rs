use crate::transduce::Context;

/// Errors that can occur during law-XML-to-Markdown conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LawdownError {
    #[error("XML parse error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed document at byte {position}: {reason}")]
    Malformed { position: u64, reason: Malformed },

    #[error("document contains no metadata block")]
    NoMetadata,

    #[error("document header has no abbreviation (jurabk)")]
    MissingAbbreviation,

    #[error("front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output slug `{slug}` was already produced by another document")]
    DuplicateSlug { slug: String },
}

impl LawdownError {
    /// Whether the document should be skipped rather than reported as broken.
    pub fn is_skip(&self) -> bool {
        matches!(self, LawdownError::NoMetadata)
    }
}

/// Structural defects the transducer refuses to convert.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Malformed {
    #[error("<{0}> opened again inside its own ignored span")]
    NestedIgnore(String),

    #[error("table row has {found} cells but the table declares {expected} columns")]
    ColumnMismatch { expected: usize, found: usize },

    #[error("table opened inside a table cell")]
    NestedTable,

    #[error("expected `{expected}` context on top of the stack, found `{found}`")]
    Unbalanced { expected: Context, found: Context },

    #[error("<{element}> is missing its `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}
