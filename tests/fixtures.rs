// Fixture tests: whole documents converted and compared byte for byte.
//
// Each fixture directory contains:
//   index.xml  - law XML input
//   index.md   - expected Markdown output
//   index.json - optional option overrides (see common::load_fixture)

mod common;

use pretty_assertions::assert_eq;

fn fixture_test(name: &str) {
    let f = common::load_fixture(name);
    let result = lawdown::convert_with(&f.xml, &f.options).unwrap();
    assert_eq!(result.markdown, f.expected_md, "fixture: {}", name);
}

#[test]
fn fixture_bgb_excerpt() {
    fixture_test("bgb-excerpt");
}

#[test]
fn fixture_inline_footnotes() {
    fixture_test("inline-footnotes");
}

#[test]
fn fixture_table_spans() {
    fixture_test("table-spans");
}

#[test]
fn fixture_toc_nested_lists() {
    fixture_test("toc-nested-lists");
}

#[test]
fn fixtures_parse_as_gfm() {
    use pulldown_cmark::{Event, Parser, Tag};

    let f = common::load_fixture("table-spans");
    let markdown = lawdown::convert_with(&f.xml, &f.options).unwrap().markdown;
    let tables = Parser::new_ext(&markdown, common::gfm())
        .filter(|e| matches!(e, Event::Start(Tag::Table(_))))
        .count();
    assert_eq!(tables, 1);

    let f = common::load_fixture("inline-footnotes");
    let markdown = lawdown::convert_with(&f.xml, &f.options).unwrap().markdown;
    let defined = Parser::new_ext(&markdown, common::gfm())
        .any(|e| matches!(e, Event::Start(Tag::FootnoteDefinition(ref l)) if l.as_ref() == "F1"));
    assert!(defined);
}
