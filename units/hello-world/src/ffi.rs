//! Raw symbols resolved by the host.
//!
//! All exports use the C calling convention under their exact, unmangled
//! names. Records passed by pointer are only borrowed for the call.

use core::ffi::c_char;

use export_surface::record::EMPLOYEE_LAYOUT;
use export_surface::{EmployeeRef, SurfaceError};

/// `Employee` as laid out in wasm32 linear memory.
#[repr(C)]
#[derive(Debug)]
pub struct RawEmployee {
    pub name: *const u8,
    pub name_len: usize,
    pub age: i32,
}

// On wasm32 the raw struct must match the host-side layout byte for byte.
#[cfg(target_arch = "wasm32")]
const _: () = {
    assert!(core::mem::size_of::<RawEmployee>() == EMPLOYEE_LAYOUT.size as usize);
    assert!(core::mem::align_of::<RawEmployee>() == EMPLOYEE_LAYOUT.align as usize);
};

impl RawEmployee {
    /// Borrow the record as an [`EmployeeRef`].
    ///
    /// # Safety
    ///
    /// `name` must point to `name_len` readable bytes that stay alive and
    /// unchanged while the returned view is in use.
    pub unsafe fn view(&self) -> Result<EmployeeRef<'_>, SurfaceError> {
        let bytes: &[u8] = if self.name_len == 0 {
            &[]
        } else if self.name.is_null() {
            return Err(SurfaceError::InvalidRecord(format!(
                "{} name points at null",
                EMPLOYEE_LAYOUT.name
            )));
        } else {
            unsafe { core::slice::from_raw_parts(self.name, self.name_len) }
        };
        let name = core::str::from_utf8(bytes).map_err(|e| {
            SurfaceError::InvalidRecord(format!("{} name: {}", EMPLOYEE_LAYOUT.name, e))
        })?;
        Ok(EmployeeRef {
            name,
            age: self.age,
        })
    }
}

/// Diagnostic action. `argc` and `argv` are accepted and ignored.
#[no_mangle]
pub extern "C" fn myFunction(_argc: i32, _argv: *const *const c_char) {
    crate::my_function();
}

#[no_mangle]
pub extern "C" fn call_no_arg_function() {
    crate::call_no_arg_function();
}

#[no_mangle]
pub extern "C" fn sum(a: i32, b: i32) -> i32 {
    crate::sum(a, b)
}

/// Inert record sink.
///
/// A null or undecodable record cannot be reported through a `void` C
/// return, so it traps instead of being ignored.
///
/// # Safety
///
/// A non-null `employee` must point to a valid [`RawEmployee`] whose name
/// bytes are readable for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn set_employee(employee: *const RawEmployee) {
    let raw = match unsafe { employee.as_ref() } {
        Some(raw) => raw,
        None => trap(&SurfaceError::NullReference),
    };
    match unsafe { raw.view() } {
        Ok(view) => crate::set_employee(&view),
        Err(e) => trap(&e),
    }
}

fn trap(reason: &SurfaceError) -> ! {
    log::error!("[{}] set_employee: {}", crate::UNIT, reason);
    abort()
}

#[cfg(target_arch = "wasm32")]
fn abort() -> ! {
    core::arch::wasm32::unreachable()
}

#[cfg(not(target_arch = "wasm32"))]
fn abort() -> ! {
    std::process::abort()
}

// ── Tests ────────────────────────────────────────────────────────────
