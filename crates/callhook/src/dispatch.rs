//! Dispatch records and per-class dispatch tables
//!
//! A `DispatchRecord` binds a target function name to the substitute callable
//! that wraps it. Records are shared across tables by `Rc`; dropping the last
//! handle releases the record's owned fields, so every removal path (entry
//! overwrite, table teardown, registry teardown) funnels through one release
//! point.

use crate::function::Function;
use crate::symbols::{is_all_lower, SymbolTable};
use crate::value::{Value, VmStr};
use std::rc::Rc;
use tracing::trace;

/// Allocation mode for a dispatch table, fixed at creation.
///
/// Determines the lifetime class of every record stored through the table:
/// `Transient` entries live for one request, `Persistent` entries survive
/// across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocMode {
    /// Request-scoped storage
    Transient,
    /// Process-lifetime storage
    Persistent,
}

/// Interception metadata for one (class, function) pair.
#[derive(Debug)]
pub struct DispatchRecord {
    /// Lower-cased name of the intercepted function
    pub name: VmStr,
    /// The wrapper callable invoked in place of the target
    pub substitute: Rc<Function>,
    /// Lifetime class inherited from the table the record was stored in
    pub mode: AllocMode,
}

impl DispatchRecord {
    /// Create a record template.
    ///
    /// The name must already be normalized; table insertion stores it as-is.
    pub fn new(name: VmStr, substitute: Rc<Function>) -> Self {
        Self {
            name,
            substitute,
            mode: AllocMode::Transient,
        }
    }
}

impl Drop for DispatchRecord {
    fn drop(&mut self) {
        trace!(name = %self.name, "releasing dispatch record");
    }
}

/// Per-class mapping from normalized function name to dispatch record.
#[derive(Debug)]
pub struct ClassDispatchTable {
    records: SymbolTable<Rc<DispatchRecord>>,
    mode: AllocMode,
}

impl ClassDispatchTable {
    /// Create an empty table with the given allocation mode
    pub fn new(mode: AllocMode) -> Self {
        Self {
            records: SymbolTable::new(),
            mode,
        }
    }

    /// The allocation mode fixed at table creation
    pub fn mode(&self) -> AllocMode {
        self.mode
    }

    /// Install a dispatch record built from `template`.
    ///
    /// A new record is allocated in this table's mode; the template's name
    /// and substitute are acquired by shared ownership, not cloned. The entry
    /// is keyed by the record's (already-normalized) name; an existing entry
    /// for that name is released. Returns whether the insertion succeeded —
    /// allocation exhaustion is fatal, so a `true` result is the only
    /// observable outcome.
    pub fn store(&mut self, template: &DispatchRecord) -> bool {
        debug_assert!(is_all_lower(&template.name));
        let name = Rc::clone(&template.name);
        let record = Rc::new(DispatchRecord {
            name: Rc::clone(&name),
            substitute: Rc::clone(&template.substitute),
            mode: self.mode,
        });
        trace!(name = %name, mode = ?self.mode, "storing dispatch record");
        self.records.insert(&name, record);
        true
    }

    /// Look up a record by a candidate name value (case-insensitive)
    pub fn lookup(&self, name: &Value) -> Option<&Rc<DispatchRecord>> {
        self.records.lookup(name)
    }

    /// Look up a record by an already-normalized name
    pub fn get(&self, name: &str) -> Option<&Rc<DispatchRecord>> {
        self.records.get(name)
    }

    /// Remove the record for an already-normalized name, releasing this
    /// table's share of it
    pub fn remove(&mut self, name: &str) -> bool {
        self.records.remove(name).is_some()
    }

    /// Number of installed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over (normalized name, record) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<DispatchRecord>)> {
        self.records.iter()
    }
}
