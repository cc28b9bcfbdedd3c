//! Plain layouts for structured arguments.
//!
//! The host builds a record's bytes on its own, so the layout is fixed and
//! versioned here instead of negotiated: fixed field order, fixed-width
//! little-endian primitives, no padding between fields.
//!
//! `Employee` (layout version 1, 12 bytes, align 4):
//!
//! | offset | field      | type |
//! |--------|------------|------|
//! | 0      | `name_ptr` | u32  |
//! | 4      | `name_len` | u32  |
//! | 8      | `age`      | i32  |

use alloc::string::String;

use crate::memory::LinearMemory;
use crate::SurfaceError;

/// Primitive field types allowed in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Offset into linear memory.
    Ptr,
    U32,
    I32,
}

impl FieldType {
    /// Width in bytes.
    pub const fn size(self) -> u32 {
        match self {
            FieldType::Ptr | FieldType::U32 | FieldType::I32 => 4,
        }
    }
}

/// One field of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub offset: u32,
}

/// Fixed memory layout agreed between host and unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Record name.
    pub name: &'static str,
    /// Bumped on any change to `fields`, `size` or `align`.
    pub version: u32,
    /// Total size in bytes.
    pub size: u32,
    /// Required alignment of the record start.
    pub align: u32,
    /// Fields in memory order.
    pub fields: &'static [Field],
}

impl RecordLayout {
    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reject records built against another version of this layout.
    pub fn expect_version(&self, version: u32) -> Result<(), SurfaceError> {
        if version != self.version {
            return Err(SurfaceError::InvalidRecord(alloc::format!(
                "{} layout version {} requested, this build has {}",
                self.name,
                version,
                self.version
            )));
        }
        Ok(())
    }

    /// Check that fields are ordered, aligned, non-overlapping and in bounds.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        if self.align == 0 || !self.align.is_power_of_two() {
            return Err(SurfaceError::InvalidRecord(alloc::format!(
                "{}: alignment {} is not a power of two",
                self.name,
                self.align
            )));
        }
        if self.size % self.align != 0 {
            return Err(SurfaceError::InvalidRecord(alloc::format!(
                "{}: size {} not a multiple of alignment {}",
                self.name,
                self.size,
                self.align
            )));
        }

        let mut next_free = 0u32;
        for field in self.fields {
            let width = field.ty.size();
            if field.offset < next_free {
                return Err(SurfaceError::InvalidRecord(alloc::format!(
                    "{}.{}: overlaps previous field",
                    self.name,
                    field.name
                )));
            }
            if field.offset % width != 0 {
                return Err(SurfaceError::InvalidRecord(alloc::format!(
                    "{}.{}: misaligned at offset {}",
                    self.name,
                    field.name,
                    field.offset
                )));
            }
            next_free = field.offset + width;
            if next_free > self.size {
                return Err(SurfaceError::InvalidRecord(alloc::format!(
                    "{}.{}: extends past record size {}",
                    self.name,
                    field.name,
                    self.size
                )));
            }
        }
        Ok(())
    }
}

/// Layout of the `Employee` argument taken by `set_employee`.
pub const EMPLOYEE_LAYOUT: RecordLayout = RecordLayout {
    name: "Employee",
    version: 1,
    size: 12,
    align: 4,
    fields: &[
        Field {
            name: "name_ptr",
            ty: FieldType::Ptr,
            offset: 0,
        },
        Field {
            name: "name_len",
            ty: FieldType::U32,
            offset: 4,
        },
        Field {
            name: "age",
            ty: FieldType::I32,
            offset: 8,
        },
    ],
};

const NAME_PTR: usize = 0;
const NAME_LEN: usize = 4;
const AGE: usize = 8;

/// Host-side, owned employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub name: String,
    pub age: i32,
}

impl Employee {
    pub fn new(name: &str, age: i32) -> Self {
        Employee {
            name: String::from(name),
            age,
        }
    }
}

/// Borrowed view of an employee record.
///
/// The lifetime ties the view to the memory borrow of a single call, so an
/// export cannot keep it once the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeRef<'a> {
    pub name: &'a str,
    pub age: i32,
}

/// Null and alignment checks shared by the reader and the writer.
fn check_record_ptr(ptr: u32) -> Result<(), SurfaceError> {
    if ptr == 0 {
        return Err(SurfaceError::NullReference);
    }
    if ptr % EMPLOYEE_LAYOUT.align != 0 {
        return Err(SurfaceError::InvalidRecord(alloc::format!(
            "Employee at {:#x} is not {}-byte aligned",
            ptr,
            EMPLOYEE_LAYOUT.align
        )));
    }
    Ok(())
}

fn check_name_ptr(name_ptr: u32, name_len: u32) -> Result<(), SurfaceError> {
    if name_len > 0 && name_ptr == 0 {
        return Err(SurfaceError::InvalidRecord(
            "Employee name points at null".into(),
        ));
    }
    Ok(())
}

impl<'a> EmployeeRef<'a> {
    /// Decode the record at `ptr` using the current layout.
    pub fn read(memory: &'a LinearMemory, ptr: u32) -> Result<Self, SurfaceError> {
        Self::read_versioned(memory, ptr, EMPLOYEE_LAYOUT.version)
    }

    /// Decode the record at `ptr`, which the host built against layout
    /// `version`.
    pub fn read_versioned(
        memory: &'a LinearMemory,
        ptr: u32,
        version: u32,
    ) -> Result<Self, SurfaceError> {
        EMPLOYEE_LAYOUT.expect_version(version)?;
        check_record_ptr(ptr)?;

        let base = ptr as usize;
        let name_ptr = memory.read_u32(base + NAME_PTR)?;
        let name_len = memory.read_u32(base + NAME_LEN)?;
        let age = memory.read_i32(base + AGE)?;

        check_name_ptr(name_ptr, name_len)?;
        let bytes = memory.read_bytes(name_ptr as usize, name_len as usize)?;
        let name = core::str::from_utf8(bytes)
            .map_err(|e| SurfaceError::InvalidRecord(alloc::format!("Employee name: {}", e)))?;

        Ok(EmployeeRef { name, age })
    }

    /// Copy into an owned value.
    pub fn to_employee(&self) -> Employee {
        Employee::new(self.name, self.age)
    }
}

/// Write `employee` as a record at `ptr`, with its name bytes at `name_ptr`.
///
/// Anything [`EmployeeRef::read`] would reject is refused here, and every
/// range is checked before the first byte is written, so a failed write
/// leaves memory as it was.
pub fn write_employee(
    memory: &mut LinearMemory,
    ptr: u32,
    name_ptr: u32,
    employee: &Employee,
) -> Result<(), SurfaceError> {
    check_record_ptr(ptr)?;
    let name = employee.name.as_bytes();
    let name_len = u32::try_from(name.len())
        .map_err(|_| SurfaceError::InvalidRecord("Employee name too long".into()))?;
    check_name_ptr(name_ptr, name_len)?;

    let base = ptr as usize;
    let size = EMPLOYEE_LAYOUT.size as usize;
    memory.check_range(base, size)?;
    memory.check_range(name_ptr as usize, name.len())?;

    let name_start = name_ptr as usize;
    if !name.is_empty() && name_start < base + size && base < name_start + name.len() {
        return Err(SurfaceError::InvalidRecord(alloc::format!(
            "Employee name at {:#x} overlaps the record at {:#x}",
            name_ptr,
            ptr
        )));
    }

    memory.write_bytes(name_start, name)?;
    memory.write_u32(base + NAME_PTR, name_ptr)?;
    memory.write_u32(base + NAME_LEN, name_len)?;
    memory.write_i32(base + AGE, employee.age)?;
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────
