//! Hello World unit
//!
//! The first of the two demonstration units. It exports an integer `sum`, a
//! diagnostic action (`myFunction` / `call_no_arg_function`) and an inert
//! `set_employee` that accepts a host-built record by pointer.
//!
//! The raw `extern "C"` symbols live in [`ffi`] and are what a wasm host
//! resolves. [`export_table`] describes the same exports as an
//! [`ExportTable`] for hosts driving the unit through `export_surface`.
//!
//! Every export is stateless. The only side effect is a diagnostic line,
//! handed to the host through [`export_surface::diag`].

pub mod ffi;
mod table;

use export_surface::{diag, EmployeeRef};

pub use export_surface::ExportTable;
pub use table::export_table;

/// Unit name reported by the export table.
pub const UNIT: &str = "hello_world";

/// Line emitted by `myFunction`.
pub const MY_FUNCTION_CALLED: &str = "myFunction called";
/// Line emitted by `call_no_arg_function`.
pub const NO_ARG_FUNCTION_CALLED: &str = "call_no_arg_function called";
/// Line emitted by `sum`.
pub const SUM_CALLED: &str = "sum called";

/// `a + b`, wrapping on overflow like wasm `i32.add`.
pub fn sum(a: i32, b: i32) -> i32 {
    diag::emit(UNIT, SUM_CALLED);
    add(a, b)
}

fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Diagnostic action behind `myFunction`.
pub fn my_function() {
    diag::emit(UNIT, MY_FUNCTION_CALLED);
}

/// Host-triggered action with no input and no result.
pub fn call_no_arg_function() {
    diag::emit(UNIT, NO_ARG_FUNCTION_CALLED);
}

/// Accept an employee record for the duration of the call. Does nothing
/// with it.
pub fn set_employee(employee: &EmployeeRef<'_>) {
    log::debug!(
        "[{}] set_employee: name={} age={}",
        UNIT,
        employee.name,
        employee.age
    );
}

// ── Tests ────────────────────────────────────────────────────────────
