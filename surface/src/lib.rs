//! Export Surface
//!
//! This crate provides the host-callable export surface shared by the
//! WebAssembly units in this workspace. A unit publishes a fixed table of
//! named functions with declared signatures; a host resolves entries by name
//! and invokes them with primitive values or pointers into linear memory.
//!
//! # Architecture
//!
//! - `value`: Value types, runtime values and function signatures
//! - `table`: Immutable export tables, builders and cached bindings
//! - `memory`: Linear memory owned by one loaded unit
//! - `record`: Fixed plain layouts for structured arguments (`Employee`)
//! - `instance`: A loaded unit (table + memory) invoked by the host
//! - `diag`: Diagnostic lines a unit hands to its host

#![no_std]

extern crate alloc;

pub mod diag;
pub mod instance;
pub mod memory;
pub mod record;
pub mod table;
pub mod value;

use alloc::string::String;
use core::fmt;

pub use instance::{CallContext, Instance};
pub use record::{Employee, EmployeeRef};
pub use table::{Binding, ExportFn, ExportTable, ExportTableBuilder, ExportedFunction};
pub use value::{Signature, Value, ValueType};

/// Export surface error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Export registered with an unusable name.
    InvalidExport(String),
    /// Two exports registered under the same name.
    DuplicateExport(String),
    /// No export with this name in the table.
    ExportNotFound(String),
    /// Binding resolved against a different unit.
    UnitMismatch {
        expected: &'static str,
        got: &'static str,
    },
    /// Binding resolved against another table declared for the same unit.
    ForeignBinding {
        unit: &'static str,
        name: &'static str,
    },
    /// Wrong number of arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Argument of the wrong type.
    TypeMismatch {
        name: String,
        index: usize,
        expected: ValueType,
        got: ValueType,
    },
    /// Export returned something other than its declared result.
    ResultMismatch(String),
    /// Null pointer passed where a structured argument was expected.
    NullReference,
    /// Structured argument bytes do not decode.
    InvalidRecord(String),
    /// Memory access violation.
    MemoryError(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::InvalidExport(msg) => write!(f, "invalid export: {}", msg),
            SurfaceError::DuplicateExport(name) => write!(f, "duplicate export: {}", name),
            SurfaceError::ExportNotFound(name) => write!(f, "export not found: {}", name),
            SurfaceError::UnitMismatch { expected, got } => {
                write!(f, "binding belongs to unit {}, instance is {}", got, expected)
            }
            SurfaceError::ForeignBinding { unit, name } => {
                write!(f, "{}::{} was bound from another {} table", unit, name, unit)
            }
            SurfaceError::ArityMismatch { name, expected, got } => {
                write!(f, "{}: expected {} arguments, got {}", name, expected, got)
            }
            SurfaceError::TypeMismatch {
                name,
                index,
                expected,
                got,
            } => write!(
                f,
                "{}: argument {} expected {}, got {}",
                name, index, expected, got
            ),
            SurfaceError::ResultMismatch(name) => {
                write!(f, "{}: result does not match signature", name)
            }
            SurfaceError::NullReference => write!(f, "null reference"),
            SurfaceError::InvalidRecord(msg) => write!(f, "invalid record: {}", msg),
            SurfaceError::MemoryError(msg) => write!(f, "memory error: {}", msg),
        }
    }
}

/// Configuration for a loaded unit.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Initial linear memory (in pages, 64KB each).
    pub initial_memory_pages: u32,
    /// Maximum linear memory (in pages).
    pub max_memory_pages: Option<u32>,
    /// Emit a `trace` record for every host call.
    pub trace_calls: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        SurfaceConfig {
            initial_memory_pages: 1,
            max_memory_pages: Some(16), // 1 MB
            trace_calls: true,
        }
    }
}

/// Load a unit's export table into a fresh instance.
pub fn load(table: &'static ExportTable) -> Result<Instance, SurfaceError> {
    Instance::new(table)
}

/// Load a unit, call one export and drop the instance.
pub fn invoke(
    table: &'static ExportTable,
    name: &str,
    args: &[Value],
) -> Result<Option<Value>, SurfaceError> {
    let mut inst = load(table)?;
    inst.call(name, args)
}
