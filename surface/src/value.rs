//! Values and signatures crossing the export boundary.

use alloc::string::String;
use core::fmt;

use crate::SurfaceError;

/// Value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    I32,
    /// Offset into the unit's linear memory. Lowered to `i32` on wasm32.
    Ptr,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::I32 => "i32",
            ValueType::Ptr => "ptr",
        };
        f.write_str(s)
    }
}

/// A value passed to or returned from an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    I32(i32),
    Ptr(u32),
}

impl Value {
    /// Get the value type.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::Ptr(_) => ValueType::Ptr,
        }
    }

    /// Get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as a linear memory offset.
    pub fn as_ptr(&self) -> Option<u32> {
        match self {
            Value::Ptr(v) => Some(*v),
            _ => None,
        }
    }
}

/// Function signature of an export.
///
/// Signatures are `'static` so a table can be declared once and never change
/// while a unit is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Parameter types, in call order.
    pub params: &'static [ValueType],
    /// Result type, `None` for exports that return nothing.
    pub result: Option<ValueType>,
}

impl Signature {
    /// Create a signature.
    pub const fn new(params: &'static [ValueType], result: Option<ValueType>) -> Self {
        Signature { params, result }
    }

    /// `() -> ()`
    pub const fn unit() -> Self {
        Signature::new(&[], None)
    }

    /// Check call arguments against the parameter list.
    pub fn check_args(&self, name: &str, args: &[Value]) -> Result<(), SurfaceError> {
        if args.len() != self.params.len() {
            return Err(SurfaceError::ArityMismatch {
                name: String::from(name),
                expected: self.params.len(),
                got: args.len(),
            });
        }
        for (index, (arg, expected)) in args.iter().zip(self.params).enumerate() {
            let got = arg.value_type();
            if got != *expected {
                return Err(SurfaceError::TypeMismatch {
                    name: String::from(name),
                    index,
                    expected: *expected,
                    got,
                });
            }
        }
        Ok(())
    }

    /// Check a returned value against the declared result.
    pub fn check_result(&self, result: Option<&Value>) -> bool {
        match (self.result, result) {
            (None, None) => true,
            (Some(expected), Some(v)) => v.value_type() == expected,
            _ => false,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")?;
        if let Some(r) = self.result {
            write!(f, " -> {}", r)?;
        }
        Ok(())
    }
}

/// Fetch argument `idx` as an i32.
pub fn arg_i32(args: &[Value], idx: usize) -> Result<i32, SurfaceError> {
    match args.get(idx) {
        Some(Value::I32(v)) => Ok(*v),
        Some(other) => Err(SurfaceError::TypeMismatch {
            name: String::from("<arg>"),
            index: idx,
            expected: ValueType::I32,
            got: other.value_type(),
        }),
        None => Err(SurfaceError::ArityMismatch {
            name: String::from("<arg>"),
            expected: idx + 1,
            got: args.len(),
        }),
    }
}

/// Fetch argument `idx` as a linear memory offset.
pub fn arg_ptr(args: &[Value], idx: usize) -> Result<u32, SurfaceError> {
    match args.get(idx) {
        Some(Value::Ptr(v)) => Ok(*v),
        Some(other) => Err(SurfaceError::TypeMismatch {
            name: String::from("<arg>"),
            index: idx,
            expected: ValueType::Ptr,
            got: other.value_type(),
        }),
        None => Err(SurfaceError::ArityMismatch {
            name: String::from("<arg>"),
            expected: idx + 1,
            got: args.len(),
        }),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
