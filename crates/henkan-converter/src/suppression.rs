//! Candidates the user asked never to see again.
//!
//! `SuppressionDictionary` stores (key, value) pairs behind a `RwLock` so
//! entries can be edited while converters hold a shared reference.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Filter applied to conversion candidates after rewriting.
pub trait SuppressionFilter: Send + Sync {
    fn is_empty(&self) -> bool;

    /// Whether the (key, value) candidate must be removed.
    fn suppress_entry(&self, key: &str, value: &str) -> bool;
}

#[derive(Default)]
pub struct SuppressionDictionary {
    entries: RwLock<HashSet<(String, String)>>,
}

impl SuppressionDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry. An empty key matches every key with `value`, and an
    /// empty value matches every value of `key`. Returns `true` if newly added;
    /// an entry with both fields empty is rejected.
    pub fn add_entry(&self, key: &str, value: &str) -> bool {
        if key.is_empty() && value.is_empty() {
            return false;
        }
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((key.to_string(), value.to_string()))
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl SuppressionFilter for SuppressionDictionary {
    fn is_empty(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn suppress_entry(&self, key: &str, value: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        if entries.is_empty() {
            return false;
        }
        let probe = |k: &str, v: &str| entries.contains(&(k.to_string(), v.to_string()));
        probe(key, value) || probe("", value) || probe(key, "")
    }
}
