// Context stack.
//
// The transducer routes every event by the context on top of this stack.
// Contexts are pushed and popped by the structural elements that own them;
// popping anything but the expected context is a structural error.

use std::fmt;

use crate::error::Malformed;
use crate::transduce::tag::Tag;

/// Where in the document structure the transducer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Root,
    /// Inside a `metadaten` block.
    Meta,
    Text,
    List,
    Table,
    TableHead,
    TableBody,
    Footnotes,
    /// Collecting a list item's marker from `dt`.
    ReadListIndex,
    /// A list item whose marker is known.
    HaveTickNumber,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::Root => "root",
            Context::Meta => "meta",
            Context::Text => "text",
            Context::List => "list",
            Context::Table => "table",
            Context::TableHead => "thead",
            Context::TableBody => "tbody",
            Context::Footnotes => "footnotes",
            Context::ReadListIndex => "read-list-index",
            Context::HaveTickNumber => "have-tick-number",
        }
    }

    pub(crate) fn is_table(self) -> bool {
        matches!(self, Context::Table | Context::TableHead | Context::TableBody)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub(crate) struct ContextStack {
    stack: Vec<Context>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Context::Root],
        }
    }

    pub fn top(&self) -> Context {
        self.stack.last().copied().unwrap_or(Context::Root)
    }

    pub fn push(&mut self, context: Context) {
        self.stack.push(context);
    }

    /// Pop `expected` off the top. The root context is never popped.
    pub fn pop(&mut self, expected: Context) -> Result<(), Malformed> {
        let found = self.top();
        if found != expected || found == Context::Root {
            return Err(Malformed::Unbalanced { expected, found });
        }
        self.stack.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// A subtree swallowed until `until` closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IgnoreSpan {
    until: Tag,
    /// Whether `until` itself has been opened.
    entered: bool,
    /// Also ends when the enclosing norm closes first.
    or_norm: bool,
}

impl IgnoreSpan {
    /// Span started by opening `tag`.
    pub fn at(tag: Tag) -> Self {
        Self {
            until: tag,
            entered: true,
            or_norm: false,
        }
    }

    /// Swallow the text data of a table-of-contents norm.
    pub fn table_of_contents() -> Self {
        Self {
            until: Tag::Textdaten,
            entered: false,
            or_norm: true,
        }
    }

    /// Track an element opened inside the span.
    pub fn open(&mut self, tag: &Tag) -> Result<(), Malformed> {
        if *tag != self.until {
            return Ok(());
        }
        if self.entered {
            return Err(Malformed::NestedIgnore(tag.name().to_string()));
        }
        self.entered = true;
        Ok(())
    }

    pub fn ends_at(&self, tag: &Tag) -> bool {
        (self.entered && *tag == self.until) || (self.or_norm && *tag == Tag::Norm)
    }

    pub fn tag(&self) -> &Tag {
        &self.until
    }
}
