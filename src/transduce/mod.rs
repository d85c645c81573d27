// Law XML → Markdown transducer.
//
// Reads the document as a stream of quick-xml events and routes each event
// by the context on top of a stack. Text accumulates until a block boundary
// flushes it through the emitter. Nothing is buffered beyond the current
// paragraph, the current table row and the metadata block being read.

pub(crate) mod context;
pub(crate) mod handlers;
pub(crate) mod meta;
pub(crate) mod tag;
pub(crate) mod text;

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::emit::footnote::FootnoteRegistry;
use crate::emit::table::TableState;
use crate::emit::Emitter;
use crate::error::{LawdownError, Malformed};
use crate::log::warn_event;
use crate::{Converted, Options};

pub use context::Context;
use context::{ContextStack, IgnoreSpan};
use meta::{HeadingDepth, Metadata};
use tag::{Attributes, Tag};
use text::TextBuffer;

/// The document-level facts fixed by the first metadata block.
#[derive(Debug)]
pub(crate) struct Document {
    pub slug: String,
    pub metadata: Metadata,
}

/// Transducer state threaded through all handlers.
pub(crate) struct State<'o> {
    pub options: &'o Options,
    /// Reader offset of the event being handled.
    pub position: u64,
    pub stack: ContextStack,
    pub ignore: Option<IgnoreSpan>,
    pub text: TextBuffer,
    /// Metadata block currently being read.
    pub meta: Metadata,
    pub document: Option<Document>,
    pub depth: HeadingDepth,
    /// Marker text collected inside `dt`.
    pub list_index: String,
    pub table: Option<TableState>,
    pub footnotes: FootnoteRegistry,
    pub emitter: Emitter,
}

impl<'o> State<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            position: 0,
            stack: ContextStack::new(),
            ignore: None,
            text: TextBuffer::new(),
            meta: Metadata::new(),
            document: None,
            depth: HeadingDepth::default(),
            list_index: String::new(),
            table: None,
            footnotes: FootnoteRegistry::new(),
            emitter: Emitter::new(options.wrap),
        }
    }

    pub fn malformed(&self, reason: Malformed) -> LawdownError {
        LawdownError::Malformed {
            position: self.position,
            reason,
        }
    }

    /// Pop `expected` off the context stack.
    pub fn pop(&mut self, expected: Context) -> Result<(), LawdownError> {
        self.stack
            .pop(expected)
            .map_err(|reason| LawdownError::Malformed {
                position: self.position,
                reason,
            })
    }

    pub fn in_cell(&self) -> bool {
        self.table.as_ref().is_some_and(TableState::cell_open)
    }

    /// Emit the pending text as a paragraph. Returns whether anything was
    /// written. Inside a table, text outside any cell is dropped; inside a
    /// cell it stays pending until the cell closes.
    pub fn flush_text(&mut self) -> bool {
        if self.in_cell() {
            return false;
        }
        if self.table.is_some() {
            if !self.text.is_blank() {
                warn_event!("dropping text inside a table outside any cell");
            }
            self.text.clear();
            return false;
        }
        let segments = self.text.take_segments();
        if segments.is_empty() {
            return false;
        }
        self.emitter.paragraph(&segments);
        true
    }

    /// Flush pending text and separate it from the next block.
    pub fn flush_block(&mut self) {
        if self.flush_text() {
            self.emitter.blank_line();
        }
    }

    pub fn finish(mut self) -> Result<Converted, LawdownError> {
        self.flush_text();
        self.emitter.flush_marker();

        let missing: Vec<String> = self
            .footnotes
            .unrendered()
            .into_iter()
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            self.emitter.blank_line();
            for id in &missing {
                warn_event!("footnote {id} is referenced but never defined");
                self.emitter.line(&format!("[^{id}]:"));
            }
        }

        let document = self.document.ok_or(LawdownError::NoMetadata)?;
        Ok(Converted {
            markdown: self.emitter.finish(),
            slug: document.slug,
            metadata: document.metadata,
        })
    }
}

/// Run the transducer over an XML document.
pub(crate) fn transduce<R: BufRead>(input: R, options: &Options) -> Result<Converted, LawdownError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(false);

    let mut state = State::new(options);
    let mut buf = Vec::new();
    let mut pending = String::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(source) => {
                return Err(LawdownError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })
            }
        };
        match event {
            Event::Text(e) => pending.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => pending.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&name) {
                    Some(resolved) => pending.push_str(&resolved),
                    None => {
                        pending.push('&');
                        pending.push_str(&name);
                        pending.push(';');
                    }
                }
            }
            Event::Start(e) => {
                flush_pending(&mut state, &mut pending);
                state.position = reader.buffer_position() as u64;
                let (tag, attrs) = start_tag(&e);
                handlers::start(&mut state, tag, &attrs)?;
            }
            Event::Empty(e) => {
                flush_pending(&mut state, &mut pending);
                state.position = reader.buffer_position() as u64;
                let (tag, attrs) = start_tag(&e);
                handlers::start(&mut state, tag.clone(), &attrs)?;
                handlers::end(&mut state, tag)?;
            }
            Event::End(e) => {
                flush_pending(&mut state, &mut pending);
                state.position = reader.buffer_position() as u64;
                let name = String::from_utf8_lossy(local_name(e.name().as_ref())).to_lowercase();
                handlers::end(&mut state, Tag::from_name(&name))?;
            }
            Event::Eof => break,
            // Declarations, processing instructions, comments and DOCTYPE.
            _ => {}
        }
        buf.clear();
    }

    flush_pending(&mut state, &mut pending);
    state.finish()
}

/// Dispatch merged character data as one event.
fn flush_pending(state: &mut State<'_>, pending: &mut String) {
    if !pending.is_empty() {
        handlers::characters(state, pending);
        pending.clear();
    }
}

fn start_tag(e: &BytesStart<'_>) -> (Tag, Attributes) {
    let name = String::from_utf8_lossy(local_name(e.name().as_ref())).to_lowercase();
    let mut attrs = Attributes::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(local_name(attr.key.as_ref())).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw.into_owned(),
        };
        attrs.push(&key, value);
    }
    (Tag::from_name(&name), attrs)
}

/// Strip a namespace prefix.
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve predefined and numeric character references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32).map(String::from)
}
