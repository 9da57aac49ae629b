//! Cursor over the documents of a store.
//!
//! The store reads every document up front and hands the results to a
//! [`DocumentIterator`]. A failure while building it is kept on the
//! iterator and reported by [`DocumentIterator::error`] instead of being
//! raised at construction.

use crate::errors::EdvError;

/// Exhaust-once cursor over `(key, document bytes)` entries.
///
/// Call [`advance`](Self::advance) before reading [`key`](Self::key) or
/// [`value`](Self::value). After [`release`](Self::release) the iterator is
/// permanently empty and reports [`EdvError::IteratorReleased`].
#[derive(Debug)]
pub struct DocumentIterator {
    entries: Vec<(String, Vec<u8>)>,
    /// Index of the current entry; `None` before the first `advance`.
    position: Option<usize>,
    error: Option<EdvError>,
    released: bool,
}

impl DocumentIterator {
    pub(crate) fn new(entries: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            entries,
            position: None,
            error: None,
            released: false,
        }
    }

    pub(crate) fn failed(error: EdvError) -> Self {
        Self {
            entries: Vec::new(),
            position: None,
            error: Some(error),
            released: false,
        }
    }

    /// Move to the next entry. Returns `false` once exhausted or released,
    /// and keeps returning `false` from then on.
    pub fn advance(&mut self) -> bool {
        if self.released || self.error.is_some() {
            return false;
        }

        let next = self.position.map_or(0, |p| p.saturating_add(1));
        if next < self.entries.len() {
            self.position = Some(next);
            true
        } else {
            // Park past the end so `key`/`value` go empty.
            self.position = Some(self.entries.len());
            false
        }
    }

    /// Key of the current entry, or `""` when there is none.
    pub fn key(&self) -> &str {
        self.current().map_or("", |(k, _)| k.as_str())
    }

    /// Document bytes of the current entry, or empty when there is none.
    pub fn value(&self) -> &[u8] {
        self.current().map(|(_, v)| v.as_slice()).unwrap_or(&[])
    }

    /// The construction error, or [`EdvError::IteratorReleased`] after
    /// [`release`](Self::release).
    pub fn error(&self) -> Option<&EdvError> {
        self.error.as_ref()
    }

    /// Drop the entries. Safe to call more than once.
    pub fn release(&mut self) {
        self.released = true;
        self.entries = Vec::new();
        self.position = None;
        self.error = Some(EdvError::IteratorReleased);
    }

    /// Number of entries materialized for this iterator.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current(&self) -> Option<&(String, Vec<u8>)> {
        if self.released {
            return None;
        }
        self.position.and_then(|p| self.entries.get(p))
    }
}
