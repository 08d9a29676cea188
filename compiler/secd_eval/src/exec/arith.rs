//! `ADD`, `SUB`, `MUL`, `DIV`, `EQ`, `LT`, `GT`.
//!
//! Operands are named by push order: `a` was pushed first, `b` last (and
//! is popped first).

use std::cmp::Ordering;

use secd_ir::{Opcode, Value};

use crate::errors::{division_by_zero, integer_overflow, type_mismatch, EvalErrorKind};
use crate::machine::Machine;

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_value(opcode: Opcode, value: &Value) -> Result<Self, EvalErrorKind> {
        match value {
            Value::Int(n) => Ok(Number::Int(*n)),
            Value::Float(x) => Ok(Number::Float(*x)),
            other => Err(type_mismatch(opcode, "number", other)),
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "mixed int/float arithmetic promotes to float"
    )]
    fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }
}

fn operands(machine: &Machine, opcode: Opcode) -> Result<(Number, Number), EvalErrorKind> {
    let (a, b) = machine.peek_pair(opcode)?;
    Ok((
        Number::from_value(opcode, a)?,
        Number::from_value(opcode, b)?,
    ))
}

/// `a ∘ b`. `SUB` is `a - b`; `DIV` is real division.
pub(super) fn binary(machine: &mut Machine, opcode: Opcode) -> Result<(), EvalErrorKind> {
    let (a, b) = operands(machine, opcode)?;
    let result = match (a, b) {
        (Number::Int(a), Number::Int(b)) => int_binary(opcode, a, b)?,
        (a, b) => float_binary(opcode, a.to_f64(), b.to_f64())?,
    };
    machine.replace_pair(result);
    Ok(())
}

fn int_binary(opcode: Opcode, a: i64, b: i64) -> Result<Value, EvalErrorKind> {
    let checked = match opcode {
        Opcode::Add => a.checked_add(b),
        Opcode::Sub => a.checked_sub(b),
        Opcode::Mul => a.checked_mul(b),
        _ => {
            if b == 0 {
                return Err(division_by_zero());
            }
            return float_binary(opcode, Number::Int(a).to_f64(), Number::Int(b).to_f64());
        }
    };
    checked
        .map(Value::Int)
        .ok_or_else(|| integer_overflow(opcode))
}

fn float_binary(opcode: Opcode, a: f64, b: f64) -> Result<Value, EvalErrorKind> {
    let result = match opcode {
        Opcode::Add => a + b,
        Opcode::Sub => a - b,
        Opcode::Mul => a * b,
        _ => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            a / b
        }
    };
    Ok(Value::Float(result))
}

/// `EQ`: structural equality of any two values.
pub(super) fn eq(machine: &mut Machine) -> Result<(), EvalErrorKind> {
    let (a, b) = machine.peek_pair(Opcode::Eq)?;
    let equal = a == b;
    machine.replace_pair(Value::Bool(equal));
    Ok(())
}

/// `LT` pushes `b < a`, `GT` pushes `b > a`.
///
/// The comparison runs top-of-stack first. Programs written for this
/// machine rely on that order, so it is kept as is.
pub(super) fn compare(machine: &mut Machine, opcode: Opcode) -> Result<(), EvalErrorKind> {
    let (a, b) = operands(machine, opcode)?;
    let ordering = match (b, a) {
        (Number::Int(b), Number::Int(a)) => Some(b.cmp(&a)),
        (b, a) => b.to_f64().partial_cmp(&a.to_f64()),
    };
    let wanted = if opcode == Opcode::Lt {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    machine.replace_pair(Value::Bool(ordering == Some(wanted)));
    Ok(())
}
