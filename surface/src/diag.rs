//! Guest diagnostics.
//!
//! A unit has no console of its own. On wasm32 it hands each line to the
//! host through the imported `env.log(ptr, len)`; the host reads `len` bytes
//! at `ptr` out of the unit's memory and prints them. Native builds send the
//! same line to the `log` facade.
//!
//! Hosts driving a unit through an [`ExportTable`](crate::ExportTable) get
//! the host half of this import as [`CallContext::log`](crate::CallContext::log).

#[cfg(target_arch = "wasm32")]
mod host {
    #[link(wasm_import_module = "env")]
    extern "C" {
        #[link_name = "log"]
        pub fn host_log(ptr: *const u8, len: usize);
    }
}

/// Emit one diagnostic line for `unit`.
pub fn emit(unit: &str, message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let line = alloc::format!("[{}] {}", unit, message);
        // The host only reads the bytes during the call.
        unsafe { host::host_log(line.as_ptr(), line.len()) };
    }
    #[cfg(not(target_arch = "wasm32"))]
    log::info!("[{}] {}", unit, message);
}
