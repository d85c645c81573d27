// Shared test helpers for lawdown.

use std::fs;
use std::path::Path;

use lawdown::Options;
use pulldown_cmark::{Event, Parser, Tag};

/// A fixture's input, expected output and options.
pub struct Fixture {
    pub xml: String,
    pub expected_md: String,
    pub options: Options,
}

/// Load a test fixture.
///
/// Fixture directories contain `index.xml`, `index.md`, and optionally
/// `index.json` with option overrides. Fixtures default to no front matter.
pub fn load_fixture(name: &str) -> Fixture {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures").join(name);
    let xml = fs::read_to_string(base.join("index.xml"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/index.xml", name));
    let md = fs::read_to_string(base.join("index.md"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/index.md", name));

    let mut options = Options::default().with_front_matter(false);

    if let Ok(json_str) = fs::read_to_string(base.join("index.json")) {
        let val: serde_json::Value = serde_json::from_str(&json_str)
            .unwrap_or_else(|e| panic!("Invalid fixture options {}/index.json: {e}", name));
        if let Some(b) = val.get("front_matter").and_then(|v| v.as_bool()) {
            options.front_matter = b;
        }
        if let Some(b) = val.get("heading_anchor").and_then(|v| v.as_bool()) {
            options.heading_anchor = b;
        }
        if let Some(s) = val.get("orig_slug").and_then(|v| v.as_str()) {
            options.orig_slug = Some(s.to_string());
        }
        if let Some(n) = val.get("width").and_then(|v| v.as_u64()) {
            options.wrap.width = n as usize;
        }
        if let Some(s) = val.get("header").and_then(|v| v.as_str()) {
            options = options.with_header_yaml(s).expect("fixture header yaml");
        }
    }

    Fixture {
        xml,
        expected_md: md,
        options,
    }
}

/// Wrap norms in a document with a minimal header (abbreviation `T`).
pub fn law(body: &str) -> String {
    format!(
        "<dokumente><norm><metadaten><jurabk>T</jurabk><langue>Testgesetz</langue>\
         </metadaten></norm>{body}</dokumente>"
    )
}

/// Wrap `text` as the text data of one norm.
pub fn norm_text(text: &str) -> String {
    law(&format!("<norm><textdaten><text>{text}</text></textdaten></norm>"))
}

/// Markdown body after the `# Testgesetz (T)` title line.
pub fn body(markdown: &str) -> &str {
    markdown
        .strip_prefix("# Testgesetz (T)\n\n")
        .unwrap_or_else(|| panic!("unexpected document start: {markdown:?}"))
}

/// Convert without front matter.
pub fn convert_plain(xml: &str) -> String {
    let options = Options::default().with_front_matter(false);
    lawdown::convert_with(xml, &options).unwrap().markdown
}

/// GFM parser options the output targets.
pub fn gfm() -> pulldown_cmark::Options {
    pulldown_cmark::Options::ENABLE_TABLES | pulldown_cmark::Options::ENABLE_FOOTNOTES
}

/// Whether the Markdown contains any emphasis or strong span.
pub fn has_emphasis(markdown: &str) -> bool {
    Parser::new_ext(markdown, gfm())
        .any(|e| matches!(e, Event::Start(Tag::Emphasis) | Event::Start(Tag::Strong)))
}
