// Document header and norm headings.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::error::LawdownError;
use crate::slug::slugify;
use crate::transduce::meta::{clean_title, Metadata};
use crate::transduce::text::escape_emphasis;
use crate::Options;

/// Annotations like `(XXXX)` in entry labels.
static ANCHOR_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(X+\)").unwrap());

/// Rendered document header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentHeader {
    pub slug: String,
    pub markdown: String,
}

/// Render front matter, title and the enactment/citation/status lines of the
/// first metadata block.
pub(crate) fn document_header(
    meta: &Metadata,
    options: &Options,
) -> Result<DocumentHeader, LawdownError> {
    let jurabk = meta.get("jurabk").ok_or(LawdownError::MissingAbbreviation)?;
    let slug = slugify(jurabk);
    let title = clean_title(
        meta.get("langue")
            .or_else(|| meta.get("titel"))
            .unwrap_or(jurabk),
    );

    let mut markdown = String::new();
    if options.front_matter {
        markdown.push_str(&front_matter(&title, jurabk, &slug, options)?);
        markdown.push('\n');
    }

    markdown.push_str(&format!(
        "# {} ({})\n\n",
        escape_emphasis(&title),
        escape_emphasis(jurabk)
    ));

    if let Some(date) = meta.get("ausfertigung-datum") {
        markdown.push_str(&format!("Ausfertigungsdatum\n:   {date}\n\n"));
    }
    if let (Some(periodikum), Some(zitstelle)) = (meta.get("periodikum"), meta.get("zitstelle")) {
        markdown.push_str(&format!(
            "Fundstelle\n:   {}: {}\n\n",
            escape_emphasis(periodikum),
            escape_emphasis(zitstelle)
        ));
    }
    for comment in meta.get_all("standkommentar") {
        let comment = escape_emphasis(comment);
        match comment.split_once(" durch ") {
            Some((kind, rest)) => {
                markdown.push_str(&format!("{} durch\n:   {rest}\n\n", capitalize(kind)));
            }
            None => markdown.push_str(&format!("Stand: {comment}\n\n")),
        }
    }

    Ok(DocumentHeader { slug, markdown })
}

/// YAML front matter between `---` fences.
fn front_matter(
    title: &str,
    jurabk: &str,
    slug: &str,
    options: &Options,
) -> Result<String, serde_yaml::Error> {
    let mut mapping = Mapping::new();
    mapping.insert(Value::from("Title"), Value::from(title));
    if let Some(orig) = &options.orig_slug {
        mapping.insert(Value::from("origslug"), Value::from(orig.as_str()));
    }
    mapping.insert(Value::from("jurabk"), Value::from(jurabk));
    mapping.insert(Value::from("slug"), Value::from(slug));
    for (key, value) in &options.header {
        mapping.insert(key.clone(), value.clone());
    }
    let yaml = serde_yaml::to_string(&mapping)?;
    Ok(format!("---\n{yaml}---\n"))
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Heading line for a norm, or `None` when the block carries no title.
pub(crate) fn norm_heading(meta: &Metadata, with_anchor: bool) -> Option<String> {
    let title = escape_emphasis(&meta.norm_title()?);
    if !with_anchor {
        return Some(title);
    }
    match meta.anchor_label().map(anchor_id) {
        Some(id) if !id.is_empty() => Some(format!("{title} {{#{id}}}")),
        _ => Some(title),
    }
}

/// `§ 5a (XXXX)` -> `P5a`
pub(crate) fn anchor_id(label: &str) -> String {
    ANCHOR_NOISE
        .replace_all(label, "")
        .replace('§', "P")
        .split_whitespace()
        .collect()
}
