// Directory batch conversion.
//
// Input layout: `<input>/<group>/<document>/` with one XML file per document
// directory plus attachments (images). Output layout:
// `<output>/<first char of slug>/<slug>/index.md` with the attachments copied
// alongside. Each document is converted in memory before its output
// directory is touched.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::log::{debug_event, warn_event};
use crate::{convert_reader, LawdownError, Options};

/// Result of converting one document directory.
#[derive(Debug)]
pub enum Outcome {
    Converted { slug: String, path: PathBuf },
    /// The document was not a law (no metadata).
    Skipped { reason: String },
    Failed(LawdownError),
}

#[derive(Debug)]
pub struct DocumentReport {
    /// The XML file that was converted, or the directory that could not be
    /// listed.
    pub source: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn push(&mut self, source: PathBuf, outcome: Outcome) {
        self.documents.push(DocumentReport { source, outcome });
    }

    fn fail(&mut self, source: &Path, err: LawdownError) {
        warn_event!("{}: {err}", source.display());
        self.push(source.to_path_buf(), Outcome::Failed(err));
    }

    fn count(&self, f: impl Fn(&Outcome) -> bool) -> usize {
        self.documents.iter().filter(|d| f(&d.outcome)).count()
    }
}

/// Convert every document directory under `input` into `output`.
///
/// Only failing to list `input` is an error; per-document failures are
/// recorded in the report and never stop the run.
pub fn convert_tree(input: &Path, output: &Path, options: &Options) -> Result<BatchReport, LawdownError> {
    let mut report = BatchReport::default();
    let mut seen = HashSet::new();

    for group in subdirectories(input)? {
        convert_group(&group, output, options, &mut seen, &mut report);
    }

    Ok(report)
}

/// Convert the document directories of one group. A directory that cannot be
/// listed is recorded as failed under its own path.
fn convert_group(
    group: &Path,
    output: &Path,
    options: &Options,
    seen: &mut HashSet<String>,
    report: &mut BatchReport,
) {
    let dirs = match subdirectories(group) {
        Ok(dirs) => dirs,
        Err(err) => return report.fail(group, err),
    };
    for dir in dirs {
        let source = match first_xml(&dir) {
            Ok(Some(source)) => source,
            Ok(None) => {
                debug_event!("no XML in {}", dir.display());
                continue;
            }
            Err(err) => {
                report.fail(&dir, err);
                continue;
            }
        };
        match convert_document(&dir, &source, output, options, seen) {
            Ok((slug, path)) => report.push(source, Outcome::Converted { slug, path }),
            Err(err) if err.is_skip() => {
                let reason = err.to_string();
                report.push(source, Outcome::Skipped { reason });
            }
            Err(err) => report.fail(&source, err),
        }
    }
}

fn convert_document(
    dir: &Path,
    source: &Path,
    output: &Path,
    options: &Options,
    seen: &mut HashSet<String>,
) -> Result<(String, PathBuf), LawdownError> {
    let mut options = options.clone();
    if let Some(name) = dir.file_name() {
        options = options.with_orig_slug(name.to_string_lossy());
    }
    let reader = BufReader::new(File::open(source)?);
    let converted = convert_reader(reader, &options)?;

    if !seen.insert(converted.slug.clone()) {
        return Err(LawdownError::DuplicateSlug {
            slug: converted.slug,
        });
    }

    let initial = converted.slug.chars().next().map_or_else(String::new, String::from);
    let target = output.join(initial).join(&converted.slug);
    if target.exists() {
        fs::remove_dir_all(&target)?;
    }
    fs::create_dir_all(&target)?;
    fs::write(target.join("index.md"), &converted.markdown)?;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path != source {
            if let Some(name) = path.file_name() {
                fs::copy(&path, target.join(name))?;
            }
        }
    }

    debug_event!("{} -> {}", source.display(), target.display());
    Ok((converted.slug, target))
}

fn subdirectories(path: &Path) -> Result<Vec<PathBuf>, LawdownError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn first_xml(dir: &Path) -> Result<Option<PathBuf>, LawdownError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn law(jurabk: &str, body: &str) -> String {
        format!(
            "<dokumente><norm><metadaten><jurabk>{jurabk}</jurabk>\
             <langue>Gesetz {jurabk}</langue></metadaten></norm>\
             <norm><textdaten><text><P>{body}</P></text></textdaten></norm></dokumente>"
        )
    }

    fn write_document(root: &Path, group: &str, name: &str, xml: &str) -> PathBuf {
        let dir = root.join(group).join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{name}.xml")), xml).unwrap();
        dir
    }

    #[test]
    fn test_converts_and_copies_attachments() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let dir = write_document(input.path(), "a", "abcg", &law("ABCG", "Text."));
        fs::write(dir.join("bild.png"), b"png").unwrap();

        let report = convert_tree(input.path(), output.path(), &Options::default()).unwrap();
        assert_eq!(report.converted(), 1);

        let target = output.path().join("a").join("abcg");
        let markdown = fs::read_to_string(target.join("index.md")).unwrap();
        assert!(markdown.contains("origslug: abcg"));
        assert!(markdown.contains("# Gesetz ABCG (ABCG)"));
        assert!(target.join("bild.png").exists());
        assert!(!target.join("abcg.xml").exists());
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_document(input.path(), "a", "broken", "<dokumente><norm></dokumente>");
        write_document(input.path(), "b", "empty", "<dokumente/>");
        write_document(input.path(), "c", "good", &law("Good", "Text."));

        let report = convert_tree(input.path(), output.path(), &Options::default()).unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.converted(), 1);
        assert!(report.has_failures());
        assert!(output.path().join("g").join("good").join("index.md").exists());
        assert!(!output.path().join("b").exists());
    }

    #[test]
    fn test_duplicate_slug() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_document(input.path(), "a", "first", &law("XG", "eins"));
        write_document(input.path(), "a", "second", &law("XG", "zwei"));

        let report = convert_tree(input.path(), output.path(), &Options::default()).unwrap();
        assert_eq!(report.converted(), 1);
        assert!(matches!(
            &report.documents[1].outcome,
            Outcome::Failed(LawdownError::DuplicateSlug { slug }) if slug == "xg"
        ));
        let markdown = fs::read_to_string(output.path().join("x/xg/index.md")).unwrap();
        assert!(markdown.contains("eins"));
    }

    #[test]
    fn test_previous_output_is_replaced() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_document(input.path(), "a", "abc", &law("ABC", "neu"));
        let stale = output.path().join("a").join("abc");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("old.png"), b"old").unwrap();

        convert_tree(input.path(), output.path(), &Options::default()).unwrap();
        assert!(!stale.join("old.png").exists());
        assert!(stale.join("index.md").exists());
    }

    #[test]
    fn test_unlistable_group_is_recorded() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let gone = input.path().join("weg");
        let mut report = BatchReport::default();
        let mut seen = HashSet::new();

        convert_group(&gone, output.path(), &Options::default(), &mut seen, &mut report);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.documents[0].source, gone);
        assert!(matches!(&report.documents[0].outcome, Outcome::Failed(LawdownError::Io(_))));

        write_document(input.path(), "a", "good", &law("Good", "Text."));
        let group = input.path().join("a");
        convert_group(&group, output.path(), &Options::default(), &mut seen, &mut report);
        assert_eq!(report.converted(), 1);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let output = tempfile::tempdir().unwrap();
        let missing = output.path().join("does-not-exist");
        assert!(matches!(
            convert_tree(&missing, output.path(), &Options::default()),
            Err(LawdownError::Io(_))
        ));
    }
}
