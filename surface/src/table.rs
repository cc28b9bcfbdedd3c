//! Export tables.
//!
//! A unit declares its exports once through [`ExportTableBuilder`]. The built
//! [`ExportTable`] is read-only: names are unique and signatures never change,
//! so a host may resolve a [`Binding`] once and keep it for as long as the unit
//! stays loaded.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::instance::CallContext;
use crate::value::{Signature, Value};
use crate::SurfaceError;

/// Implementation of an export, as seen by the host.
pub type ExportFn = fn(&CallContext<'_>, &[Value]) -> Result<Option<Value>, SurfaceError>;

static NEXT_TABLE_ID: AtomicU32 = AtomicU32::new(1);

/// One entry of an export table.
#[derive(Clone, Copy)]
pub struct ExportedFunction {
    /// Symbol name the host resolves.
    pub name: &'static str,
    /// Declared parameter and result types.
    pub signature: Signature,
    /// Implementation.
    pub func: ExportFn,
}

impl fmt::Debug for ExportedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}

/// Immutable name → function table of one unit.
#[derive(Debug)]
pub struct ExportTable {
    /// Unit the exports belong to.
    unit: &'static str,
    /// Process-unique id, assigned when the table is built.
    id: u32,
    /// Exports keyed by symbol name.
    exports: BTreeMap<&'static str, ExportedFunction>,
}

impl ExportTable {
    /// Start declaring the exports of `unit`.
    pub fn builder(unit: &'static str) -> ExportTableBuilder {
        ExportTableBuilder {
            unit,
            exports: Vec::new(),
        }
    }

    /// Name of the owning unit.
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// Process-unique id of this table. Two tables declared for the same
    /// unit name still get different ids.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Look up an export by name.
    pub fn get(&self, name: &str) -> Option<&ExportedFunction> {
        self.exports.get(name)
    }

    /// Resolve an export into a binding the host can cache.
    pub fn bind(&self, name: &str) -> Result<Binding, SurfaceError> {
        let export = self
            .get(name)
            .ok_or_else(|| SurfaceError::ExportNotFound(String::from(name)))?;
        Ok(Binding {
            unit: self.unit,
            table: self.id,
            name: export.name,
            signature: export.signature,
            func: export.func,
        })
    }

    /// Exported symbol names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.exports.keys().copied().collect()
    }

    /// Iterate over exports in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ExportedFunction> {
        self.exports.values()
    }

    /// Number of exports.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the table has no exports.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Collects exports before freezing them into an [`ExportTable`].
pub struct ExportTableBuilder {
    unit: &'static str,
    exports: Vec<ExportedFunction>,
}

impl ExportTableBuilder {
    /// Declare an export.
    pub fn export(mut self, name: &'static str, signature: Signature, func: ExportFn) -> Self {
        self.exports.push(ExportedFunction {
            name,
            signature,
            func,
        });
        self
    }

    /// Freeze the table.
    ///
    /// Fails on an empty or non-ASCII-identifier name, or on a name
    /// declared twice.
    pub fn build(self) -> Result<ExportTable, SurfaceError> {
        let mut exports = BTreeMap::new();
        for export in self.exports {
            validate_name(export.name)?;
            if exports.insert(export.name, export).is_some() {
                return Err(SurfaceError::DuplicateExport(String::from(export.name)));
            }
        }
        let id = NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "[{}] export table #{} built: {} exports",
            self.unit,
            id,
            exports.len()
        );
        Ok(ExportTable {
            unit: self.unit,
            id,
            exports,
        })
    }
}

/// Symbol names must resolve through a plain C-style lookup.
fn validate_name(name: &str) -> Result<(), SurfaceError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SurfaceError::InvalidExport(alloc::format!(
            "'{}' is not a C identifier",
            name
        )))
    }
}

/// A resolved export, detached from the table.
#[derive(Clone, Copy)]
pub struct Binding {
    /// Unit the binding was resolved against.
    pub unit: &'static str,
    /// Id of the table the binding was resolved against.
    pub table: u32,
    /// Symbol name.
    pub name: &'static str,
    /// Declared signature.
    pub signature: Signature,
    /// Implementation.
    pub func: ExportFn,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.unit, self.name, self.signature)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
