//! Add Numbers unit
//!
//! A second, independently loaded unit that exports a single addition.
//! It shares no symbols with `hello_world`, so both can be loaded side by
//! side by the same host.

use export_surface::value::arg_i32;
use export_surface::{CallContext, ExportTable, Signature, SurfaceError, Value, ValueType};
use spin::Once;

/// Unit name reported by the export table.
pub const UNIT: &str = "add_numbers";

const ADD_NUMBERS: Signature =
    Signature::new(&[ValueType::I32, ValueType::I32], Some(ValueType::I32));

static TABLE: Once<ExportTable> = Once::new();

/// `a + b`, wrapping on overflow like wasm `i32.add`.
pub fn add_numbers(a: i32, b: i32) -> i32 {
    log::info!("[{}] add_numbers called", UNIT);
    a.wrapping_add(b)
}

/// The unit's export table, built on first use.
pub fn export_table() -> Result<&'static ExportTable, SurfaceError> {
    TABLE.try_call_once(|| {
        ExportTable::builder(UNIT)
            .export("add_numbers", ADD_NUMBERS, call_add_numbers)
            .build()
    })
}

fn call_add_numbers(_ctx: &CallContext<'_>, args: &[Value]) -> Result<Option<Value>, SurfaceError> {
    let a = arg_i32(args, 0)?;
    let b = arg_i32(args, 1)?;
    Ok(Some(Value::I32(add_numbers(a, b))))
}

/// Raw symbols resolved by the host.
pub mod ffi {
    #[no_mangle]
    pub extern "C" fn add_numbers(a: i32, b: i32) -> i32 {
        crate::add_numbers(a, b)
    }

    /// Empty command entry point for hosts that expect one.
    #[cfg(target_arch = "wasm32")]
    #[no_mangle]
    pub extern "C" fn _start() {}
}

// ── Tests ────────────────────────────────────────────────────────────
