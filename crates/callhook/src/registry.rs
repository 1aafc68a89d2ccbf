//! Global dispatch registry
//!
//! Maps class identity to its dispatch table. The registry exclusively owns
//! the tables; dropping a table releases every record handle reachable from
//! it. One registry exists per execution context, so no locking is needed.

use crate::dispatch::{AllocMode, ClassDispatchTable};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Registry of per-class dispatch tables, keyed by lower-cased class name.
///
/// Free functions are conventionally registered under the empty class name.
#[derive(Debug, Default)]
pub struct DispatchRegistry {
    tables: FxHashMap<String, ClassDispatchTable>,
}

impl DispatchRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tables: FxHashMap::default(),
        }
    }

    /// Install a fresh dispatch table for `class_name` and return it.
    ///
    /// Last writer wins: any previous table for that class is dropped,
    /// releasing every record it held.
    pub fn open_class_table(
        &mut self,
        class_name: &str,
        mode: AllocMode,
    ) -> &mut ClassDispatchTable {
        let key = class_name.to_ascii_lowercase();
        debug!(class = %key, ?mode, "opening class dispatch table");
        match self.tables.entry(key) {
            Entry::Occupied(mut entry) => {
                // Last writer wins; the evicted table releases its records
                entry.insert(ClassDispatchTable::new(mode));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(ClassDispatchTable::new(mode)),
        }
    }

    /// Get the dispatch table for a class, if one was opened
    pub fn table(&self, class_name: &str) -> Option<&ClassDispatchTable> {
        self.tables.get(&class_name.to_ascii_lowercase())
    }

    /// Get the dispatch table for a class, mutably
    pub fn table_mut(&mut self, class_name: &str) -> Option<&mut ClassDispatchTable> {
        self.tables.get_mut(&class_name.to_ascii_lowercase())
    }

    /// Number of classes with open tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no tables are open
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop every table, releasing all records.
    ///
    /// Used between isolated execution contexts (e.g. per request) so no
    /// interception state leaks across them.
    pub fn clear(&mut self) {
        debug!(tables = self.tables.len(), "clearing dispatch registry");
        self.tables.clear();
    }
}
