//! Case-insensitive symbol tables
//!
//! String-keyed tables where registration lower-cases the key, so every key
//! in the map is already normalized. Lookup by a `Value` name has a fast path
//! for names that are all-lowercase (no allocation); mixed-case names go
//! through a lower-cased temporary that is dropped before the lookup returns.

use crate::value::Value;
use rustc_hash::FxHashMap;

/// Check whether a name contains no ASCII uppercase characters.
///
/// Symbol normalization is ASCII-only, matching the host VM's identifier
/// rules.
pub fn is_all_lower(name: &str) -> bool {
    !name.bytes().any(|b| b.is_ascii_uppercase())
}

/// Case-insensitive, string-keyed symbol table.
///
/// Insertion is the single point responsible for case normalization: all
/// stored keys are lower-cased.
#[derive(Debug, Clone)]
pub struct SymbolTable<V> {
    entries: FxHashMap<String, V>,
}

impl<V> SymbolTable<V> {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Insert an entry under the lower-cased form of `name`.
    ///
    /// Returns the previous entry for that name, if any.
    pub fn insert(&mut self, name: &str, value: V) -> Option<V> {
        self.entries.insert(name.to_ascii_lowercase(), value)
    }

    /// Look up an entry by a candidate name value.
    ///
    /// Non-string names report not-found rather than failing. All-lowercase
    /// names are looked up directly; otherwise a lower-cased copy is used
    /// for the probe and freed regardless of the outcome.
    pub fn lookup(&self, name: &Value) -> Option<&V> {
        let name = match name.as_str() {
            Some(s) => s,
            None => return None,
        };
        if is_all_lower(name) {
            self.entries.get(name)
        } else {
            let lowered = name.to_ascii_lowercase();
            self.entries.get(&lowered)
        }
    }

    /// Look up an entry by an already-normalized key
    pub fn get(&self, name: &str) -> Option<&V> {
        debug_assert!(is_all_lower(name));
        self.entries.get(name)
    }

    /// Remove the entry for an already-normalized key, returning it
    pub fn remove(&mut self, name: &str) -> Option<V> {
        debug_assert!(is_all_lower(name));
        self.entries.remove(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (normalized key, entry) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
