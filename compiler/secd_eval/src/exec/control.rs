//! Control transfer: `SEL`, `JOIN`, `AP`, `RAP`, `RTN`.
//!
//! `SEL` saves the rest of Control as a `Branch` entry; `AP`/`RAP` save
//! the caller's Environment, Stack and Control as a `Call` entry. `JOIN`
//! and `RTN` only accept the entry kind their partner pushed, so a
//! mismatched program fails with `EmptyDump` instead of resuming from the
//! wrong continuation.

use std::collections::VecDeque;
use std::mem;

use secd_ir::{Code, Opcode, Value};

use crate::errors::{empty_dump, truncated_control, type_mismatch, EvalErrorKind};
use crate::machine::{DumpEntry, Machine};

fn block(opcode: Opcode, item: &Value) -> Result<Code, EvalErrorKind> {
    match item {
        Value::Code(code) => Ok(code.clone()),
        other => Err(type_mismatch(opcode, "code block", other)),
    }
}

fn to_control(code: &Code) -> VecDeque<Value> {
    code.iter().cloned().collect()
}

/// `SEL then else`: branch on the popped condition.
pub(super) fn sel(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let truthy = machine.peek(Opcode::Sel)?.is_truthy();
    let (Some(then_arm), Some(else_arm)) = (machine.control.front(), machine.control.get(1))
    else {
        return Err(truncated_control(Opcode::Sel, 2, machine.control.len()));
    };
    let then_arm = block(Opcode::Sel, then_arm)?;
    let else_arm = block(Opcode::Sel, else_arm)?;

    machine.stack.pop();
    machine.control.drain(..2);
    let rest = mem::take(&mut machine.control);
    machine.dump.push(DumpEntry::Branch { control: rest });
    machine.control = to_control(if truthy { &then_arm } else { &else_arm });
    Ok(())
}

/// `JOIN`: resume the continuation saved by the matching `SEL`.
pub(super) fn join(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    match machine.dump.pop() {
        Some(DumpEntry::Branch { control }) => {
            machine.control = control;
            Ok(())
        }
        other => {
            let found = DumpEntry::describe(other.as_ref());
            machine.dump.extend(other);
            Err(empty_dump(Opcode::Join, "branch continuation", found))
        }
    }
}

/// `RTN`: restore the caller and push the return value onto its stack.
pub(super) fn rtn(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    machine.peek(Opcode::Rtn)?;
    match machine.dump.pop() {
        Some(DumpEntry::Call {
            environment,
            stack,
            control,
        }) => {
            let returned = mem::replace(&mut machine.stack, stack).pop();
            machine.environment = environment;
            machine.control = control;
            machine.stack.extend(returned);
            tracing::trace!(depth = machine.dump.len(), "return");
            Ok(())
        }
        other => {
            let found = DumpEntry::describe(other.as_ref());
            machine.dump.extend(other);
            Err(empty_dump(Opcode::Rtn, "call frame", found))
        }
    }
}

/// `AP` / `RAP`: enter a closure with the popped argument list.
///
/// `AP` runs the body in `[args] + closure_env`. `RAP` fills the closure's
/// innermost frame in place when it is still a `DUM` placeholder, so the
/// recursive closures captured under that placeholder can see each other;
/// otherwise it runs in `[args] + closure_env[1:]`.
pub(super) fn apply(machine: &mut Machine, opcode: Opcode) -> Result<(), EvalErrorKind> {
    let (callee, args) = machine.pop_pair(opcode)?;
    let closure = match callee {
        Value::Closure(closure) => closure,
        other => {
            let error = type_mismatch(opcode, "closure", &other);
            machine.stack.push(other);
            machine.stack.push(args);
            return Err(error);
        }
    };

    let frame = match args {
        Value::List(items) => items,
        bare => vec![bare],
    };
    let captured = closure.environment();
    let environment = if opcode == Opcode::Rap {
        match captured.frames().first() {
            Some(front) => match front.fill(frame) {
                Ok(()) => captured.clone(),
                Err(frame) => captured.with_front_replaced(frame),
            },
            None => captured.with_front_replaced(frame),
        }
    } else {
        captured.extended(frame)
    };

    let saved = DumpEntry::Call {
        environment: mem::replace(&mut machine.environment, environment),
        stack: mem::take(&mut machine.stack),
        control: mem::replace(&mut machine.control, to_control(closure.code())),
    };
    machine.dump.push(saved);
    tracing::trace!(%opcode, depth = machine.dump.len(), "call");
    Ok(())
}
