//! Cross-unit scenarios.

use std::thread;

use export_surface::{EmployeeRef, ExportTable, Instance, SurfaceError, Value};
use hello_world::{MY_FUNCTION_CALLED, NO_ARG_FUNCTION_CALLED};

use crate::capture::{lines_of, matching};
use crate::fixtures::{ada, load_add_numbers, load_hello_world, Host};

fn i32_result(out: Result<Option<Value>, SurfaceError>) -> i32 {
    out.unwrap().and_then(|v| v.as_i32()).unwrap()
}

#[test]
fn test_sum_scenarios() {
    let mut host = Host::load().unwrap();
    let hw = &mut host.hello_world;
    assert_eq!(i32_result(hw.call("sum", &[Value::I32(2), Value::I32(3)])), 5);
    assert_eq!(i32_result(hw.call("sum", &[Value::I32(-5), Value::I32(5)])), 0);
}

#[test]
fn test_add_numbers_scenario() {
    let mut host = Host::load().unwrap();
    let out = host
        .add_numbers
        .call("add_numbers", &[Value::I32(10), Value::I32(32)]);
    assert_eq!(i32_result(out), 42);
}

#[test]
fn test_additions_agree_and_commute() {
    let mut host = Host::load_quiet().unwrap();
    let samples = [i32::MIN, -99, -1, 0, 1, 2, 99, i32::MAX];
    for &a in &samples {
        for &b in &samples {
            let s = i32_result(host.hello_world.call("sum", &[Value::I32(a), Value::I32(b)]));
            let t = i32_result(host.hello_world.call("sum", &[Value::I32(b), Value::I32(a)]));
            let n = i32_result(
                host.add_numbers
                    .call("add_numbers", &[Value::I32(a), Value::I32(b)]),
            );
            assert_eq!(s, a.wrapping_add(b));
            assert_eq!(s, t);
            assert_eq!(s, n);
        }
    }
}

#[test]
fn test_overflow_wraps_in_both_units() {
    let mut host = Host::load().unwrap();
    let args = [Value::I32(i32::MAX), Value::I32(1)];
    assert_eq!(i32_result(host.hello_world.call("sum", &args)), i32::MIN);
    assert_eq!(i32_result(host.add_numbers.call("add_numbers", &args)), i32::MIN);
}

#[test]
fn test_no_arg_function_leaves_sums_unchanged() {
    let mut host = Host::load().unwrap();
    let args = [Value::I32(20), Value::I32(22)];
    let before_sum = i32_result(host.hello_world.call("sum", &args));
    let before_add = i32_result(host.add_numbers.call("add_numbers", &args));

    assert_eq!(host.hello_world.call("call_no_arg_function", &[]), Ok(None));
    assert_eq!(
        host.hello_world
            .call("myFunction", &[Value::I32(1), Value::Ptr(0)]),
        Ok(None)
    );

    assert_eq!(i32_result(host.hello_world.call("sum", &args)), before_sum);
    assert_eq!(i32_result(host.add_numbers.call("add_numbers", &args)), before_add);
}

#[test]
fn test_set_employee_does_not_mutate_record() {
    let mut hw = load_hello_world().unwrap();
    let ptr = hw.alloc_employee(&ada()).unwrap();
    let size = hw.memory().size();
    let before = hw.memory().read_bytes(0, size).unwrap().to_vec();

    assert_eq!(hw.call("set_employee", &[Value::Ptr(ptr)]), Ok(None));

    assert_eq!(hw.memory().read_bytes(0, size).unwrap(), &before[..]);
    let view = EmployeeRef::read(hw.memory(), ptr).unwrap();
    assert_eq!(view.name, "Ada");
    assert_eq!(view.age, 30);
}

#[test]
fn test_set_employee_rejects_bad_references() {
    let mut hw = load_hello_world().unwrap();
    assert_eq!(
        hw.call("set_employee", &[Value::Ptr(0)]),
        Err(SurfaceError::NullReference)
    );
    assert!(matches!(
        hw.call("set_employee", &[Value::Ptr(0xffff_fff0)]),
        Err(SurfaceError::MemoryError(_))
    ));
    assert!(matches!(
        hw.call("set_employee", &[Value::I32(16)]),
        Err(SurfaceError::TypeMismatch { .. })
    ));
    assert_eq!(hw.calls(), 0);
}

#[test]
fn test_two_loads_are_independent() {
    let mut first = load_hello_world().unwrap();
    let mut second = load_hello_world().unwrap();
    assert_ne!(first.id(), second.id());
    assert!(std::ptr::eq(first.exports(), second.exports()));

    // A record written into one load is invisible to the other.
    let ptr = first.alloc_employee(&ada()).unwrap();
    let unseen = EmployeeRef::read(second.memory(), ptr).unwrap();
    assert_eq!(unseen.name, "");
    assert_eq!(unseen.age, 0);

    let args = [Value::I32(2), Value::I32(3)];
    assert_eq!(i32_result(first.call("sum", &args)), 5);
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 0);
    assert_eq!(i32_result(second.call("sum", &args)), 5);

    let mut adder_a = load_add_numbers().unwrap();
    let mut adder_b = load_add_numbers().unwrap();
    let args = [Value::I32(10), Value::I32(32)];
    assert_eq!(i32_result(adder_a.call("add_numbers", &args)), 42);
    assert_eq!(i32_result(adder_b.call("add_numbers", &args)), 42);
    assert_eq!(adder_a.calls(), 1);
    assert_eq!(adder_b.calls(), 1);
}

#[test]
fn test_units_do_not_share_names() {
    let host = Host::load().unwrap();
    let hw = host.hello_world.exports();
    let an = host.add_numbers.exports();
    for name in an.names() {
        assert!(hw.get(name).is_none(), "{} exported by both units", name);
    }
}

#[test]
fn test_cached_binding_survives_calls_but_not_units() {
    let mut host = Host::load().unwrap();
    let sum = host.hello_world.exports().bind("sum").unwrap();
    let add = host.add_numbers.exports().bind("add_numbers").unwrap();

    for i in 0..4 {
        let args = [Value::I32(i), Value::I32(i)];
        assert_eq!(i32_result(host.hello_world.call_bound(&sum, &args)), 2 * i);
        assert_eq!(i32_result(host.add_numbers.call_bound(&add, &args)), 2 * i);
    }

    assert_eq!(
        host.add_numbers
            .call_bound(&sum, &[Value::I32(1), Value::I32(1)]),
        Err(SurfaceError::UnitMismatch {
            expected: "add_numbers",
            got: "hello_world"
        })
    );
}

#[test]
fn test_raw_symbols_match_table() {
    assert_eq!(hello_world::ffi::sum(2, 3), 5);
    assert_eq!(add_numbers::ffi::add_numbers(10, 32), 42);

    let name = "Ada";
    let raw = hello_world::ffi::RawEmployee {
        name: name.as_ptr(),
        name_len: name.len(),
        age: 30,
    };
    unsafe { hello_world::ffi::set_employee(&raw) };
    assert_eq!(raw.age, 30);
    assert_eq!(unsafe { raw.view() }.unwrap().name, "Ada");
}

#[test]
fn test_actions_log_once_per_call() {
    let raw = lines_of(|| {
        hello_world::ffi::myFunction(0, std::ptr::null());
        hello_world::ffi::call_no_arg_function();
        hello_world::ffi::call_no_arg_function();
    });
    assert_eq!(matching(&raw, MY_FUNCTION_CALLED).len(), 1);
    assert_eq!(matching(&raw, NO_ARG_FUNCTION_CALLED).len(), 2);

    let mut hw = load_hello_world().unwrap();
    let table = lines_of(|| {
        hw.call("myFunction", &[Value::I32(1), Value::Ptr(0)]).unwrap();
        hw.call("call_no_arg_function", &[]).unwrap();
    });
    assert_eq!(matching(&table, MY_FUNCTION_CALLED).len(), 1);
    assert_eq!(matching(&table, NO_ARG_FUNCTION_CALLED).len(), 1);
    assert_eq!(hw.diagnostics(), [MY_FUNCTION_CALLED, NO_ARG_FUNCTION_CALLED]);
}

#[test]
fn test_concurrent_first_use_and_shared_binding() {
    let tables: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                s.spawn(move || {
                    let table = hello_world::export_table().unwrap();
                    let sum = table.bind("sum").unwrap();
                    let mut inst = Instance::new(table).unwrap();
                    assert_eq!(
                        inst.call_bound(&sum, &[Value::I32(i), Value::I32(1)]),
                        Ok(Some(Value::I32(i + 1)))
                    );
                    table as *const ExportTable as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(tables.windows(2).all(|w| w[0] == w[1]));

    let shared = hello_world::export_table().unwrap().bind("sum").unwrap();
    thread::scope(|s| {
        for i in 0..8 {
            let shared = &shared;
            s.spawn(move || {
                let mut inst = load_hello_world().unwrap();
                for j in 0..16 {
                    assert_eq!(
                        inst.call_bound(shared, &[Value::I32(i), Value::I32(j)]),
                        Ok(Some(Value::I32(i + j)))
                    );
                }
                assert_eq!(inst.calls(), 16);
            });
        }
    });
}
