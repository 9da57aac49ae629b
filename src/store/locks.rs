//! In-process write serialization per index token.
//!
//! Put is a query followed by a create or update. Two writers in the same
//! process racing on one key could both see "no document" and both create.
//! Holding the key's lock across the query and the write closes that window
//! for writers sharing a [`Provider`](super::Provider). Writers in other
//! processes are not covered; for those the `unique` flag on the key
//! attribute is the only guard, and only if the vault enforces it.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, PoisonError};

/// Set of keys with a write in flight.
#[derive(Debug, Default)]
pub struct WriteLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

/// Held for the duration of one write; releases the key when dropped.
#[must_use = "the key is unlocked as soon as the guard is dropped"]
#[derive(Debug)]
pub struct WriteGuard<'a> {
    locks: &'a WriteLocks,
    key: String,
}

impl WriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other writer holds `key`, then take it.
    pub fn lock(&self, key: &str) -> WriteGuard<'_> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while held.contains(key) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(key.to_string());

        WriteGuard {
            locks: self,
            key: key.to_string(),
        }
    }

    /// Number of keys currently locked.
    pub fn len(&self) -> usize {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        let mut held = self
            .locks
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.key);
        drop(held);
        self.locks.released.notify_all();
    }
}
