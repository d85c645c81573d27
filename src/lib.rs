// lawdown: German federal law XML to Markdown converter.
//
// Architecture:
//   XML bytes → quick-xml events → transducer (context stack + handlers) → emitter → Markdown
//
// The transducer is a single pass over the event stream. Block boundaries
// flush the pending text through the wrapping engine; tables, lists and
// footnotes keep only the state they need to render the current unit.

mod log;

pub mod batch;
mod emit;
mod error;
mod slug;
mod transduce;

use std::io::BufRead;

use serde_yaml::{Mapping, Value};

pub use emit::wrap::WrapOptions;
pub use error::{LawdownError, Malformed};
pub use slug::slugify;
pub use transduce::meta::Metadata;
pub use transduce::Context;

/// Conversion options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Whether to write the YAML front matter block. Default: `true`.
    pub front_matter: bool,
    /// Extra front matter keys, merged after the computed ones.
    /// Default: `layout: default`.
    pub header: Mapping,
    /// Whether to append `{#id}` anchors to norm headings. Default: `false`.
    pub heading_anchor: bool,
    /// Name of the source the document came from, written as `origslug`.
    pub orig_slug: Option<String>,
    /// Line width and indentation.
    pub wrap: WrapOptions,
}

impl Default for Options {
    fn default() -> Self {
        let mut header = Mapping::new();
        header.insert(Value::from("layout"), Value::from("default"));
        Self {
            front_matter: true,
            header,
            heading_anchor: false,
            orig_slug: None,
            wrap: WrapOptions::default(),
        }
    }
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to write the front matter block.
    pub fn with_front_matter(mut self, front_matter: bool) -> Self {
        self.front_matter = front_matter;
        self
    }

    /// Replace the extra front matter keys.
    pub fn with_header(mut self, header: Mapping) -> Self {
        self.header = header;
        self
    }

    /// Replace the extra front matter keys with a YAML mapping.
    pub fn with_header_yaml(mut self, yaml: &str) -> Result<Self, LawdownError> {
        self.header = serde_yaml::from_str(yaml)?;
        Ok(self)
    }

    /// Set whether norm headings carry `{#id}` anchors.
    pub fn with_heading_anchor(mut self, anchor: bool) -> Self {
        self.heading_anchor = anchor;
        self
    }

    /// Set the `origslug` front matter value.
    pub fn with_orig_slug(mut self, slug: impl Into<String>) -> Self {
        self.orig_slug = Some(slug.into());
        self
    }

    /// Set the wrap width (not counting indentation).
    pub fn with_width(mut self, width: usize) -> Self {
        self.wrap.width = width;
        self
    }

    /// Set the number of spaces per indent level.
    pub fn with_indent_unit(mut self, unit: usize) -> Self {
        self.wrap.indent_unit = unit;
        self
    }
}

/// A converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    /// The Markdown text, ending in a single newline.
    pub markdown: String,
    /// Output slug derived from the document's abbreviation.
    pub slug: String,
    /// The document-level metadata block.
    pub metadata: Metadata,
}

/// Convert a law XML document to Markdown using default options.
///
/// # Examples
///
/// ```
/// let xml = "<dokumente><norm><metadaten><jurabk>ABC</jurabk>\
///            <langue>A Law</langue></metadaten></norm></dokumente>";
/// let converted = lawdown::convert(xml).unwrap();
/// assert_eq!(converted.slug, "abc");
/// assert!(converted.markdown.contains("# A Law (ABC)"));
/// ```
pub fn convert(xml: &str) -> Result<Converted, LawdownError> {
    convert_with(xml, &Options::default())
}

/// Convert a law XML document to Markdown with custom options.
///
/// # Examples
///
/// ```
/// use lawdown::{convert_with, Options};
///
/// let xml = "<dokumente><norm><metadaten><jurabk>ABC</jurabk></metadaten></norm></dokumente>";
/// let options = Options::new().with_front_matter(false);
/// let converted = convert_with(xml, &options).unwrap();
/// assert_eq!(converted.markdown, "# ABC (ABC)\n");
/// ```
pub fn convert_with(xml: &str, options: &Options) -> Result<Converted, LawdownError> {
    convert_reader(xml.as_bytes(), options)
}

/// Convert a law XML document read from `reader`.
pub fn convert_reader<R: BufRead>(reader: R, options: &Options) -> Result<Converted, LawdownError> {
    transduce::transduce(reader, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "<dokumente><norm><metadaten><jurabk>ABC</jurabk>\
        <langue>A Law</langue></metadaten></norm></dokumente>";

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(options.front_matter);
        assert!(!options.heading_anchor);
        assert_eq!(options.wrap, WrapOptions { width: 70, indent_unit: 4 });
        assert_eq!(options.header.get("layout"), Some(&Value::from("default")));
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .with_front_matter(false)
            .with_heading_anchor(true)
            .with_orig_slug("BJNR001950896")
            .with_width(60)
            .with_indent_unit(2);
        assert!(!options.front_matter);
        assert!(options.heading_anchor);
        assert_eq!(options.orig_slug.as_deref(), Some("BJNR001950896"));
        assert_eq!(options.wrap, WrapOptions { width: 60, indent_unit: 2 });
    }

    #[test]
    fn test_header_yaml() {
        let options = Options::new().with_header_yaml("layout: law\nlang: de\n").unwrap();
        assert_eq!(options.header.len(), 2);
        assert!(Options::new().with_header_yaml("- a\n- b\n").is_err());
    }

    #[test]
    fn test_convert_minimal() {
        let converted = convert(MINIMAL).unwrap();
        assert_eq!(converted.slug, "abc");
        assert_eq!(converted.metadata.get("langue"), Some("A Law"));
        assert_eq!(
            converted.markdown,
            "---\nTitle: A Law\njurabk: ABC\nslug: abc\nlayout: default\n---\n\n# A Law (ABC)\n"
        );
    }

    #[test]
    fn test_convert_reader() {
        let options = Options::new().with_front_matter(false);
        let converted = convert_reader(std::io::Cursor::new(MINIMAL), &options).unwrap();
        assert_eq!(converted.markdown, "# A Law (ABC)\n");
    }

    #[test]
    fn test_convert_without_metadata_is_skip() {
        let err = convert("<dokumente></dokumente>").unwrap_err();
        assert!(err.is_skip());
    }
}
