// Footnote registry.
//
// Tracks which footnote ids have been referenced and which have had their
// body rendered, so that each anchor appears once and each body once.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub(crate) struct FootnoteRegistry {
    /// Ids in order of first reference.
    order: Vec<String>,
    anchored: HashSet<String>,
    rendered: HashSet<String>,
}

impl FootnoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reference. Returns true when this is the first reference,
    /// i.e. when the anchor should be written.
    pub fn reference(&mut self, id: &str) -> bool {
        if !self.anchored.insert(id.to_string()) {
            return false;
        }
        self.order.push(id.to_string());
        true
    }

    /// Start rendering a body. Returns false when the body was already
    /// rendered and this one must be skipped.
    pub fn begin_body(&mut self, id: &str) -> bool {
        self.rendered.insert(id.to_string())
    }

    /// Ids that were referenced but never received a body, in order of
    /// first reference.
    pub fn unrendered(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|id| !self.rendered.contains(id.as_str()))
            .map(String::as_str)
            .collect()
    }
}
