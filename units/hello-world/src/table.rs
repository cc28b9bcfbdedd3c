//! Export table of the hello world unit.

use export_surface::value::{arg_i32, arg_ptr};
use export_surface::{
    CallContext, EmployeeRef, ExportTable, Signature, SurfaceError, Value, ValueType,
};
use spin::Once;

const MY_FUNCTION: Signature = Signature::new(&[ValueType::I32, ValueType::Ptr], None);
const SUM: Signature = Signature::new(&[ValueType::I32, ValueType::I32], Some(ValueType::I32));
const SET_EMPLOYEE: Signature = Signature::new(&[ValueType::Ptr], None);

static TABLE: Once<ExportTable> = Once::new();

/// The unit's export table, built on first use.
pub fn export_table() -> Result<&'static ExportTable, SurfaceError> {
    TABLE.try_call_once(build)
}

fn build() -> Result<ExportTable, SurfaceError> {
    ExportTable::builder(crate::UNIT)
        .export("myFunction", MY_FUNCTION, my_function)
        .export("call_no_arg_function", Signature::unit(), call_no_arg_function)
        .export("sum", SUM, sum)
        .export("set_employee", SET_EMPLOYEE, set_employee)
        .build()
}

// Diagnostic lines go to the calling host through the context, the same
// way the wasm build hands them to `env.log`.

fn my_function(ctx: &CallContext<'_>, args: &[Value]) -> Result<Option<Value>, SurfaceError> {
    arg_i32(args, 0)?;
    arg_ptr(args, 1)?;
    ctx.log(crate::MY_FUNCTION_CALLED);
    Ok(None)
}

fn call_no_arg_function(
    ctx: &CallContext<'_>,
    _args: &[Value],
) -> Result<Option<Value>, SurfaceError> {
    ctx.log(crate::NO_ARG_FUNCTION_CALLED);
    Ok(None)
}

fn sum(ctx: &CallContext<'_>, args: &[Value]) -> Result<Option<Value>, SurfaceError> {
    let a = arg_i32(args, 0)?;
    let b = arg_i32(args, 1)?;
    ctx.log(crate::SUM_CALLED);
    Ok(Some(Value::I32(crate::add(a, b))))
}

fn set_employee(ctx: &CallContext<'_>, args: &[Value]) -> Result<Option<Value>, SurfaceError> {
    let employee = EmployeeRef::read(ctx.memory(), arg_ptr(args, 0)?)?;
    crate::set_employee(&employee);
    Ok(None)
}

// ── Tests ────────────────────────────────────────────────────────────
