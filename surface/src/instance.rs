//! Loaded units and host calls.
//!
//! An [`Instance`] pairs a unit's export table with its own linear memory.
//! Loading the same table twice yields two instances that share nothing but
//! the read-only table.

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::memory::LinearMemory;
use crate::record::{self, Employee, EMPLOYEE_LAYOUT};
use crate::table::{Binding, ExportTable};
use crate::value::Value;
use crate::{SurfaceConfig, SurfaceError};

/// First offset handed out by the host allocator; 0 stays the null reference.
const HEAP_BASE: u32 = 16;

static NEXT_INSTANCE_ID: AtomicU32 = AtomicU32::new(1);

/// What an export sees of the caller during one call.
///
/// Memory is only reachable through a shared borrow, so an export can read
/// host-built records but never write through them or keep them.
pub struct CallContext<'a> {
    memory: &'a LinearMemory,
    unit: &'static str,
    instance_id: u32,
    /// Lines handed to the host during this call.
    lines: RefCell<Vec<String>>,
}

impl<'a> CallContext<'a> {
    /// Read-only view of the caller's linear memory.
    pub fn memory(&self) -> &'a LinearMemory {
        self.memory
    }

    /// Unit being called.
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// Id of the loaded instance.
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// Hand a diagnostic line to the host. The line is kept by the
    /// instance once the call completes.
    pub fn log(&self, message: &str) {
        self.lines.borrow_mut().push(String::from(message));
    }
}

/// A loaded unit.
pub struct Instance {
    /// Unit-wide, read-only export table.
    table: &'static ExportTable,

    /// Memory owned by this load only.
    memory: LinearMemory,

    config: SurfaceConfig,

    /// Process-unique load id.
    id: u32,

    /// Next free offset for host allocations.
    heap_top: u32,

    /// Completed calls.
    calls: u64,

    /// Diagnostic lines received from the unit, oldest first.
    diagnostics: Vec<String>,
}

impl Instance {
    /// Load a unit with the default configuration.
    pub fn new(table: &'static ExportTable) -> Result<Self, SurfaceError> {
        Self::new_with_config(table, SurfaceConfig::default())
    }

    /// Load a unit with a custom configuration.
    pub fn new_with_config(
        table: &'static ExportTable,
        config: SurfaceConfig,
    ) -> Result<Self, SurfaceError> {
        let memory = LinearMemory::new(config.initial_memory_pages, config.max_memory_pages)?;
        let id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "[{}#{}] loaded with {} exports, {} pages",
            table.unit(),
            id,
            table.len(),
            memory.pages()
        );
        Ok(Instance {
            table,
            memory,
            config,
            id,
            heap_top: HEAP_BASE,
            calls: 0,
            diagnostics: Vec::new(),
        })
    }

    /// Call an export by name.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Option<Value>, SurfaceError> {
        let binding = self.table.bind(name)?;
        self.call_bound(&binding, args)
    }

    /// Call a previously resolved export.
    pub fn call_bound(
        &mut self,
        binding: &Binding,
        args: &[Value],
    ) -> Result<Option<Value>, SurfaceError> {
        if binding.table != self.table.id() {
            if binding.unit != self.table.unit() {
                return Err(SurfaceError::UnitMismatch {
                    expected: self.table.unit(),
                    got: binding.unit,
                });
            }
            return Err(SurfaceError::ForeignBinding {
                unit: binding.unit,
                name: binding.name,
            });
        }
        binding.signature.check_args(binding.name, args)?;

        if self.config.trace_calls {
            log::trace!("[{}#{}] call {}{:?}", binding.unit, self.id, binding.name, args);
        }

        let ctx = CallContext {
            memory: &self.memory,
            unit: self.table.unit(),
            instance_id: self.id,
            lines: RefCell::new(Vec::new()),
        };
        let result = (binding.func)(&ctx, args);

        for line in ctx.lines.into_inner() {
            log::info!("[{}#{}] {}", binding.unit, self.id, line);
            self.diagnostics.push(line);
        }
        let result = result?;

        if !binding.signature.check_result(result.as_ref()) {
            return Err(SurfaceError::ResultMismatch(String::from(binding.name)));
        }

        self.calls += 1;
        Ok(result)
    }

    /// Reserve `size` bytes of linear memory aligned to `align`, growing the
    /// memory when needed. Returns the offset.
    pub fn alloc(&mut self, size: u32, align: u32) -> Result<u32, SurfaceError> {
        if align == 0 || !align.is_power_of_two() {
            return Err(SurfaceError::MemoryError(alloc::format!(
                "Invalid alignment {}",
                align
            )));
        }
        let start = self
            .heap_top
            .checked_add(align - 1)
            .map(|v| v & !(align - 1))
            .ok_or_else(|| SurfaceError::MemoryError("Heap overflow".into()))?;
        let end = start
            .checked_add(size)
            .ok_or_else(|| SurfaceError::MemoryError("Heap overflow".into()))?;

        while end as usize > self.memory.size() {
            self.memory.grow(1)?;
        }
        self.heap_top = end;
        Ok(start)
    }

    /// Allocate and write an `Employee` record. Returns the pointer to pass
    /// to `set_employee`.
    pub fn alloc_employee(&mut self, employee: &Employee) -> Result<u32, SurfaceError> {
        let name_len = u32::try_from(employee.name.len())
            .map_err(|_| SurfaceError::InvalidRecord("Employee name too long".into()))?;
        let name_ptr = self.alloc(name_len, 1)?;
        let ptr = self.alloc(EMPLOYEE_LAYOUT.size, EMPLOYEE_LAYOUT.align)?;
        record::write_employee(&mut self.memory, ptr, name_ptr, employee)?;
        Ok(ptr)
    }

    /// The unit's export table.
    pub fn exports(&self) -> &'static ExportTable {
        self.table
    }

    /// Get the linear memory.
    pub fn memory(&self) -> &LinearMemory {
        &self.memory
    }

    /// Process-unique id of this load.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Diagnostic lines the unit has handed to the host so far.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Number of successful calls made through this instance.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

// ── Tests ────────────────────────────────────────────────────────────
