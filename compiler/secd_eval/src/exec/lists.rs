//! Stack shuffling and list instructions.

use secd_ir::{Opcode, Value};

use crate::errors::{type_mismatch, type_mismatch_named, EvalErrorKind};
use crate::machine::Machine;

pub(super) fn pop(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    machine.pop(Opcode::Pop)?;
    Ok(())
}

pub(super) fn dup(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let top = machine.peek(Opcode::Dup)?.clone();
    machine.stack.push(top);
    Ok(())
}

pub(super) fn swap(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let (a, b) = machine.pop_pair(Opcode::Swap)?;
    machine.stack.push(b);
    machine.stack.push(a);
    Ok(())
}

/// `CONS`: the top value becomes the head of `[head, tail]`.
pub(super) fn cons(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let (tail, head) = machine.pop_pair(Opcode::Cons)?;
    machine.stack.push(Value::cons(head, tail));
    Ok(())
}

/// `CAR` (index 0) and `CDR` (index 1).
pub(super) fn element(
    machine: &mut Machine,
    opcode: Opcode,
    index: usize,
) -> Result<(), EvalErrorKind> {
    let item = match machine.peek(opcode)? {
        Value::List(items) => match items.get(index) {
            Some(item) => item.clone(),
            None if items.is_empty() => {
                return Err(type_mismatch_named(opcode, "cons cell", "empty list"))
            }
            None => return Err(type_mismatch_named(opcode, "cons cell", "short list")),
        },
        other => return Err(type_mismatch(opcode, "list", other)),
    };
    machine.replace_top(item);
    Ok(())
}

pub(super) fn nil(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    machine.stack.push(Value::nil());
    Ok(())
}

pub(super) fn atom(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let is_atom = machine.peek(Opcode::Atom)?.is_atom();
    machine.replace_top(Value::Bool(is_atom));
    Ok(())
}
