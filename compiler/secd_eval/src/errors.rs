//! Error types and centralized error constructors for the machine.
//!
//! `EvalErrorKind` is the typed failure category raised by a single
//! instruction. `EvalError` is what the driver hands back: the kind plus
//! the step index, the opcode being executed and the machine state right
//! before the failing step.
//!
//! Handlers build kinds through the factory functions below rather than
//! spelling out variants, so messages stay in one place.

use secd_ir::{AsmError, LookupError, Opcode, Value};

use crate::snapshot::Snapshot;

/// Typed failure category.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("{opcode} requires {needed} stack operand(s), found {found}")]
    StackUnderflow {
        opcode: Opcode,
        needed: usize,
        found: usize,
    },

    #[error("type mismatch in {opcode}: expected {expected}, got {got}")]
    TypeMismatch {
        opcode: Opcode,
        expected: &'static str,
        got: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {opcode}")]
    IntegerOverflow { opcode: Opcode },

    #[error("environment access error: {source}")]
    EnvironmentBounds { source: LookupError },

    /// `JOIN` or `RTN` without a matching saved entry on top of the dump.
    #[error("{opcode} requires a saved {expected} on the dump, found {found}")]
    EmptyDump {
        opcode: Opcode,
        expected: &'static str,
        found: &'static str,
    },

    /// An instruction's inline operands are missing from Control.
    #[error("{opcode} requires {needed} inline operand(s) in control, found {found}")]
    TruncatedControl {
        opcode: Opcode,
        needed: usize,
        found: usize,
    },

    #[error("unknown command: {item}")]
    UnknownCommand { item: String },

    #[error("step budget of {budget} exceeded")]
    StepBudgetExceeded { budget: usize },
}

impl EvalErrorKind {
    /// Whether this aborts for non-termination rather than a fault in the
    /// supplied code.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalErrorKind::StepBudgetExceeded { .. })
    }
}

/// Evaluation error reported by the driver.
#[derive(Clone, Debug, thiserror::Error)]
#[error("step {step}: {kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// 1-based index of the failing step.
    pub step: usize,
    /// Opcode being executed, if the failing item was an instruction.
    pub opcode: Option<Opcode>,
    /// Registers as they were before the failing step.
    pub state: Box<Snapshot>,
}

/// Result of an evaluation: the top of Stack, or `None` if it was empty.
pub type EvalResult = Result<Option<Value>, EvalError>;

/// Failure of `eval_source`: the text did not assemble, or the program
/// failed.
#[derive(Clone, Debug, thiserror::Error)]
pub enum EvalSourceError {
    #[error(transparent)]
    Asm(#[from] AsmError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

// Stack errors

pub fn stack_underflow(opcode: Opcode, needed: usize, found: usize) -> EvalErrorKind {
    EvalErrorKind::StackUnderflow {
        opcode,
        needed,
        found,
    }
}

// Type errors

/// Operand of the wrong shape.
pub fn type_mismatch(opcode: Opcode, expected: &'static str, got: &Value) -> EvalErrorKind {
    type_mismatch_named(opcode, expected, got.type_name())
}

/// Type mismatch where the offending shape has no `Value` to name it.
pub fn type_mismatch_named(
    opcode: Opcode,
    expected: &'static str,
    got: &'static str,
) -> EvalErrorKind {
    EvalErrorKind::TypeMismatch {
        opcode,
        expected,
        got,
    }
}

// Arithmetic errors

pub fn division_by_zero() -> EvalErrorKind {
    EvalErrorKind::DivisionByZero
}

pub fn integer_overflow(opcode: Opcode) -> EvalErrorKind {
    EvalErrorKind::IntegerOverflow { opcode }
}

// Environment errors

/// Map a failed lookup. Reading an unfilled letrec frame is a type error,
/// not a bounds error.
pub fn environment_lookup(opcode: Opcode, error: LookupError) -> EvalErrorKind {
    match error {
        LookupError::Uninitialized { .. } => {
            type_mismatch_named(opcode, "bound frame", "letrec placeholder")
        }
        source => EvalErrorKind::EnvironmentBounds { source },
    }
}

// Dump and control errors

pub fn empty_dump(opcode: Opcode, expected: &'static str, found: &'static str) -> EvalErrorKind {
    EvalErrorKind::EmptyDump {
        opcode,
        expected,
        found,
    }
}

pub fn truncated_control(opcode: Opcode, needed: usize, found: usize) -> EvalErrorKind {
    EvalErrorKind::TruncatedControl {
        opcode,
        needed,
        found,
    }
}

pub fn unknown_command(item: &Value) -> EvalErrorKind {
    EvalErrorKind::UnknownCommand {
        item: item.to_string(),
    }
}

// Driver errors

pub fn step_budget_exceeded(budget: usize) -> EvalErrorKind {
    EvalErrorKind::StepBudgetExceeded { budget }
}
