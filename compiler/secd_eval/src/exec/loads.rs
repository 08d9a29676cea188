//! `LD`, `LDC`, `LDF`, `DUM`.

use secd_ir::{LookupError, Opcode, Value};

use crate::errors::{environment_lookup, truncated_control, type_mismatch, EvalErrorKind};
use crate::machine::Machine;

/// An inline `LD` index. A negative `Int` is out of bounds; anything else
/// that is not an `Int` is a type error.
fn index(item: &Value) -> Result<usize, EvalErrorKind> {
    match item {
        Value::Int(n) => usize::try_from(*n).map_err(|_| {
            environment_lookup(Opcode::Ld, LookupError::NegativeIndex { index: *n })
        }),
        other => Err(type_mismatch(Opcode::Ld, "index", other)),
    }
}

/// `LD frame slot`.
pub(super) fn ld(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let (Some(frame), Some(slot)) = (machine.control.front(), machine.control.get(1)) else {
        return Err(truncated_control(Opcode::Ld, 2, machine.control.len()));
    };
    let (frame, slot) = (index(frame)?, index(slot)?);
    let value = machine
        .environment
        .lookup(frame, slot)
        .map_err(|error| environment_lookup(Opcode::Ld, error))?;
    if machine.strict_scalar_loads && matches!(value, Value::List(_)) {
        return Err(type_mismatch(Opcode::Ld, "scalar", &value));
    }

    machine.control.drain(..2);
    machine.stack.push(value);
    Ok(())
}

/// `LDC literal`: push the next Control item without executing it.
pub(super) fn ldc(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let literal = machine
        .control
        .pop_front()
        .ok_or_else(|| truncated_control(Opcode::Ldc, 1, 0))?;
    machine.stack.push(literal);
    Ok(())
}

/// `LDF body`: close over a copy of the current environment.
pub(super) fn ldf(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let code = match machine.control.front() {
        Some(Value::Code(code)) => code.clone(),
        Some(other) => return Err(type_mismatch(Opcode::Ldf, "code block", other)),
        None => return Err(truncated_control(Opcode::Ldf, 1, 0)),
    };
    machine.control.pop_front();
    let closure = Value::closure(code, machine.environment.clone());
    machine.stack.push(closure);
    Ok(())
}

pub(super) fn dum(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    machine.environment.push_placeholder();
    Ok(())
}
