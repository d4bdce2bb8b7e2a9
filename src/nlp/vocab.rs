//! Interned string store shared by every stage of a pipeline.
//!
//! Entity labels are carried around as [`LabelId`]s and only turned back into
//! text at the edges (serialisation, logging, assertions).

use std::{
    fmt,
    sync::{PoisonError, RwLock},
};

use indexmap::IndexSet;
use serde::Serialize;

/// Labels every store knows about before any stage registers its own.
pub const BUILTIN_LABELS: &[&str] = &[
    "PERSON",
    "NORP",
    "FAC",
    "ORG",
    "GPE",
    "LOC",
    "PRODUCT",
    "EVENT",
    "WORK_OF_ART",
    "LAW",
    "LANGUAGE",
    "DATE",
    "TIME",
    "PERCENT",
    "MONEY",
    "QUANTITY",
    "ORDINAL",
    "CARDINAL",
];

/// Handle to an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LabelId(usize);

impl LabelId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Append-only interning table. Ids are stable for the lifetime of the store.
#[derive(Debug)]
pub struct StringStore {
    strings: RwLock<IndexSet<String>>,
}

impl Default for StringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StringStore {
    /// Create a store seeded with [`BUILTIN_LABELS`].
    pub fn new() -> Self {
        let strings = BUILTIN_LABELS.iter().map(|s| (*s).to_string()).collect();
        Self {
            strings: RwLock::new(strings),
        }
    }

    /// Intern `value`, returning the existing id when it is already present.
    pub fn add(&self, value: &str) -> LabelId {
        if let Some(id) = self.get(value) {
            return id;
        }
        // insert_full is a no-op for a value another writer added in between
        let mut strings = self.strings.write().unwrap_or_else(PoisonError::into_inner);
        let (idx, _) = strings.insert_full(value.to_string());
        LabelId(idx)
    }

    pub fn get(&self, value: &str) -> Option<LabelId> {
        let strings = self.strings.read().unwrap_or_else(PoisonError::into_inner);
        strings.get_index_of(value).map(LabelId)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.get(value).is_some()
    }

    /// Text of an interned id.
    pub fn resolve(&self, id: LabelId) -> Option<String> {
        let strings = self.strings.read().unwrap_or_else(PoisonError::into_inner);
        strings.get_index(id.0).cloned()
    }

    pub fn len(&self) -> usize {
        self.strings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
