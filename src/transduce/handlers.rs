// Element handlers.
//
// Every open and close event is routed by the ignore span first, then by the
// context on top of the stack, then by the element. Inside a table cell all
// block structure is flattened into line breaks.

use crate::emit::header::{document_header, norm_heading};
use crate::emit::table::{Align, CellSpec, TableState};
use crate::error::{LawdownError, Malformed};
use crate::log::{debug_event, warn_event};

use super::context::{Context, IgnoreSpan};
use super::meta::Metadata;
use super::tag::{Attributes, Tag};
use super::text::InlineStyle;
use super::{Document, State};

type Result<T> = std::result::Result<T, LawdownError>;

/// Route character data.
pub(crate) fn characters(state: &mut State<'_>, text: &str) {
    if state.ignore.is_some() {
        return;
    }
    match state.stack.top() {
        Context::Meta => state.meta.push_text(text),
        Context::ReadListIndex => state.list_index.push_str(text),
        _ => state.text.push_text(text),
    }
}

/// Route an element open.
pub(crate) fn start(state: &mut State<'_>, tag: Tag, attrs: &Attributes) -> Result<()> {
    if let Some(span) = state.ignore.as_mut() {
        let entered = span.open(&tag);
        return entered.map_err(|reason| state.malformed(reason));
    }
    if tag == Tag::Fussnoten {
        ignore(state, IgnoreSpan::at(tag));
        return Ok(());
    }
    match state.stack.top() {
        Context::Meta => {
            if tag == Tag::Fnr {
                ignore(state, IgnoreSpan::at(tag));
            }
            return Ok(());
        }
        // Markup inside a list marker is dropped, its text kept.
        Context::ReadListIndex => return Ok(()),
        _ => {}
    }
    if state.in_cell() {
        return start_in_cell(state, tag, attrs);
    }

    let top = state.stack.top();
    match tag {
        Tag::Metadaten => {
            state.flush_block();
            state.meta = Metadata::new();
            state.stack.push(Context::Meta);
        }
        Tag::Text => {
            state.flush_block();
            state.stack.push(Context::Text);
        }
        Tag::Fnr => footnote_reference(state, attrs)?,
        Tag::Footnotes => {
            state.flush_block();
            state.emitter.blank_line();
            state.stack.push(Context::Footnotes);
        }
        Tag::Footnote if top == Context::Footnotes => open_footnote(state, attrs)?,
        Tag::Dl => {
            state.flush_text();
            state.emitter.block_break();
            state.emitter.increase_indent();
            state.stack.push(Context::List);
        }
        Tag::Dt => {
            if top == Context::HaveTickNumber {
                close_item(state)?;
            }
            state.flush_text();
            state.list_index.clear();
            state.stack.push(Context::ReadListIndex);
        }
        Tag::Dd => {
            if top != Context::HaveTickNumber {
                state.flush_text();
                state.emitter.set_marker("*".to_string());
                state.stack.push(Context::HaveTickNumber);
            }
        }
        Tag::Table => open_table(state)?,
        Tag::Tgroup => {
            let cols = attrs.get("cols").and_then(|c| c.trim().parse().ok());
            if let (Some(table), Some(cols)) = (state.table.as_mut(), cols) {
                table.declare_columns(cols);
            }
        }
        Tag::Colspec => {
            if let Some(table) = state.table.as_mut() {
                let name = attrs.get("colname").map(str::to_string);
                table.add_column(name, Align::from_attr(attrs.get("align")));
            }
        }
        Tag::Thead if state.table.is_some() => state.stack.push(Context::TableHead),
        Tag::Tbody if state.table.is_some() => state.stack.push(Context::TableBody),
        Tag::Row if top.is_table() => {
            if let Some(table) = state.table.as_mut() {
                table.start_row();
            }
            state.text.clear();
        }
        Tag::Entry if top.is_table() => open_cell(state, attrs)?,
        Tag::Row | Tag::Entry => open_bullet(state),
        Tag::U | Tag::I | Tag::B | Tag::F | Tag::Sup | Tag::Sub => state.text.open_inline(),
        Tag::Br => state.text.push_break(),
        Tag::Img => image(state, attrs),
        Tag::Span(_) => {}
        Tag::P | Tag::La => state.flush_block(),
        _ => {
            state.flush_text();
        }
    }
    Ok(())
}

/// Route an element close.
pub(crate) fn end(state: &mut State<'_>, tag: Tag) -> Result<()> {
    if let Some(span) = &state.ignore {
        if span.ends_at(&tag) {
            debug_event!("ignored span ends at </{}>", tag.name());
            state.ignore = None;
        }
        return Ok(());
    }
    match state.stack.top() {
        Context::Meta => return end_in_meta(state, tag),
        Context::ReadListIndex => {
            if tag == Tag::Dt {
                close_list_index(state)?;
            }
            return Ok(());
        }
        _ => {}
    }
    if state.in_cell() {
        return end_in_cell(state, tag);
    }

    let top = state.stack.top();
    match tag {
        Tag::Text => {
            state.flush_block();
            state.pop(Context::Text)?;
        }
        Tag::Footnotes => {
            state.flush_text();
            state.emitter.flush_marker();
            state.pop(Context::Footnotes)?;
            state.emitter.blank_line();
        }
        Tag::Footnote if top == Context::Footnotes => {
            state.flush_text();
            state.emitter.flush_marker();
            state.emitter.decrease_indent();
            state.emitter.blank_line();
        }
        Tag::Dl => {
            state.flush_text();
            if top == Context::HaveTickNumber {
                close_item(state)?;
            }
            state.pop(Context::List)?;
            state.emitter.decrease_indent();
            state.emitter.blank_line();
        }
        Tag::Dd => close_item(state)?,
        Tag::Table => close_table(state)?,
        Tag::Thead if state.table.is_some() => state.pop(Context::TableHead)?,
        Tag::Tbody if state.table.is_some() => state.pop(Context::TableBody)?,
        Tag::Row if top.is_table() => close_row(state, top == Context::TableHead)?,
        Tag::Entry if top.is_table() => {}
        Tag::Row | Tag::Entry => {
            close_item(state)?;
            state.pop(Context::List)?;
            state.emitter.decrease_indent();
        }
        Tag::U | Tag::I => state.text.close_inline(InlineStyle::Emphasis),
        Tag::B => state.text.close_inline(InlineStyle::Strong),
        Tag::F => state.text.close_inline(InlineStyle::Asterisk),
        Tag::Sup => state.text.close_inline(InlineStyle::Superscript),
        Tag::Sub => state.text.close_inline(InlineStyle::Subscript),
        Tag::Title => title(state, 2),
        Tag::Subtitle => title(state, 3),
        Tag::P | Tag::La => state.flush_block(),
        Tag::Br | Tag::Img | Tag::Fnr | Tag::Span(_) | Tag::Tgroup | Tag::Colspec => {}
        _ => {
            state.flush_text();
        }
    }
    Ok(())
}

fn ignore(state: &mut State<'_>, span: IgnoreSpan) {
    debug_event!("ignoring content until </{}>", span.tag().name());
    state.ignore = Some(span);
}

fn end_in_meta(state: &mut State<'_>, tag: Tag) -> Result<()> {
    if tag != Tag::Metadaten {
        if !tag.is_inline() {
            state.meta.close_field(tag.name());
        }
        return Ok(());
    }
    state.pop(Context::Meta)?;
    let meta = std::mem::take(&mut state.meta);

    if state.document.is_none() {
        let header = document_header(&meta, state.options)?;
        state.emitter.push_raw(&header.markdown);
        state.document = Some(Document {
            slug: header.slug,
            metadata: meta,
        });
        return Ok(());
    }

    if meta.is_table_of_contents() {
        ignore(state, IgnoreSpan::table_of_contents());
        return Ok(());
    }

    let depth = state.depth.next(meta.get("gliederungskennzahl"));
    if let Some(heading) = norm_heading(&meta, state.options.heading_anchor) {
        state.emitter.heading(depth, &heading);
    }
    Ok(())
}

/// `</dt>`: the collected text becomes the item marker.
fn close_list_index(state: &mut State<'_>) -> Result<()> {
    state.pop(Context::ReadListIndex)?;
    let index = std::mem::take(&mut state.list_index);
    let index = index.split_whitespace().collect::<Vec<_>>().join(" ");
    let marker = match index.as_str() {
        "" | "*" => "*".to_string(),
        _ => super::text::escape_emphasis(&index),
    };
    state.emitter.set_marker(marker);
    state.stack.push(Context::HaveTickNumber);
    Ok(())
}

/// Close the list item on top of the stack.
fn close_item(state: &mut State<'_>) -> Result<()> {
    state.flush_text();
    state.pop(Context::HaveTickNumber)?;
    state.emitter.flush_marker();
    state.emitter.blank_line();
    Ok(())
}

/// `row`/`entry` outside a table: a bullet item.
fn open_bullet(state: &mut State<'_>) {
    state.flush_text();
    state.emitter.increase_indent();
    state.stack.push(Context::List);
    state.emitter.set_marker("*".to_string());
    state.stack.push(Context::HaveTickNumber);
}

fn footnote_reference(state: &mut State<'_>, attrs: &Attributes) -> Result<()> {
    let Some(id) = attrs.get("id") else {
        return Err(state.malformed(Malformed::MissingAttribute {
            element: "fnr",
            attribute: "id",
        }));
    };
    if state.footnotes.reference(id) {
        state.text.push_markup(&format!("[^{id}]"));
    }
    Ok(())
}

fn open_footnote(state: &mut State<'_>, attrs: &Attributes) -> Result<()> {
    let Some(id) = attrs.get("id") else {
        return Err(state.malformed(Malformed::MissingAttribute {
            element: "footnote",
            attribute: "id",
        }));
    };
    if !state.footnotes.begin_body(id) {
        warn_event!("footnote {id} defined twice, keeping the first body");
        ignore(state, IgnoreSpan::at(Tag::Footnote));
        return Ok(());
    }
    state.flush_block();
    state.emitter.increase_indent();
    state.emitter.set_marker(format!("[^{id}]:"));
    Ok(())
}

fn image(state: &mut State<'_>, attrs: &Attributes) {
    let Some(src) = attrs.get("src") else {
        return;
    };
    let alt = attrs.get("alt").filter(|a| !a.trim().is_empty()).unwrap_or(src);
    let alt = alt.replace('[', "\\[").replace(']', "\\]");
    state.text.push_markup(&format!("![{alt}]({src})"));
}

fn title(state: &mut State<'_>, depth: u8) {
    let segments = state.text.take_segments();
    if !segments.is_empty() {
        state.emitter.heading(depth, &segments.join(" "));
    }
}

fn open_table(state: &mut State<'_>) -> Result<()> {
    if state.table.is_some() {
        return Err(state.malformed(Malformed::NestedTable));
    }
    state.flush_text();
    state.emitter.block_break();
    debug_event!("table opened at depth {}", state.stack.depth());
    state.table = Some(TableState::new());
    state.stack.push(Context::Table);
    Ok(())
}

fn close_table(state: &mut State<'_>) -> Result<()> {
    state.flush_text();
    state.pop(Context::Table)?;
    if let Some(mut table) = state.table.take() {
        for line in table.finish() {
            state.emitter.line(&line);
        }
    }
    state.emitter.blank_line();
    Ok(())
}

fn open_cell(state: &mut State<'_>, attrs: &Attributes) -> Result<()> {
    let spec = CellSpec {
        colname: attrs.get("colname").map(str::to_string),
        namest: attrs.get("namest").map(str::to_string),
        nameend: attrs.get("nameend").map(str::to_string),
        morerows: attrs
            .get("morerows")
            .and_then(|m| m.trim().parse().ok())
            .unwrap_or(0),
    };
    state.text.clear();
    let started = match state.table.as_mut() {
        Some(table) => table.start_cell(&spec),
        None => Ok(()),
    };
    started.map_err(|reason| state.malformed(reason))
}

fn close_row(state: &mut State<'_>, in_head: bool) -> Result<()> {
    state.text.clear();
    let lines = match state.table.as_mut() {
        Some(table) => table.end_row(in_head),
        None => Ok(Vec::new()),
    };
    let lines = lines.map_err(|reason| state.malformed(reason))?;
    for line in &lines {
        state.emitter.line(line);
    }
    Ok(())
}

/// Inside a cell only inline content survives; blocks become line breaks.
fn start_in_cell(state: &mut State<'_>, tag: Tag, attrs: &Attributes) -> Result<()> {
    match tag {
        Tag::Table | Tag::Row | Tag::Entry => Err(state.malformed(Malformed::NestedTable)),
        Tag::Fnr => footnote_reference(state, attrs),
        Tag::U | Tag::I | Tag::B | Tag::F | Tag::Sup | Tag::Sub => {
            state.text.open_inline();
            Ok(())
        }
        Tag::Br => {
            state.text.push_break();
            Ok(())
        }
        Tag::Img => {
            image(state, attrs);
            Ok(())
        }
        Tag::Span(_) => Ok(()),
        _ => {
            state.text.push_boundary();
            Ok(())
        }
    }
}

fn end_in_cell(state: &mut State<'_>, tag: Tag) -> Result<()> {
    match tag {
        Tag::Entry => {
            let content = state.text.take_pieces();
            if let Some(table) = state.table.as_mut() {
                table.end_cell(content);
            }
        }
        Tag::U | Tag::I => state.text.close_inline(InlineStyle::Emphasis),
        Tag::B => state.text.close_inline(InlineStyle::Strong),
        Tag::F => state.text.close_inline(InlineStyle::Asterisk),
        Tag::Sup => state.text.close_inline(InlineStyle::Superscript),
        Tag::Sub => state.text.close_inline(InlineStyle::Subscript),
        Tag::Br | Tag::Img | Tag::Fnr | Tag::Span(_) => {}
        _ => state.text.push_boundary(),
    }
    Ok(())
}
