//! The four SECD registers and the step function.
//!
//! - **Stack**: operand stack, top = last element
//! - **Environment**: frames addressed by `(frame, slot)`
//! - **Control**: remaining instructions, consumed from the front
//! - **Dump**: LIFO of saved continuations (`SEL`) and call frames (`AP`/`RAP`)
//!
//! A step either commits its whole effect or fails leaving the registers
//! exactly as they were before the step.

use std::collections::VecDeque;
use std::fmt;

use secd_ir::{Environment, Opcode, Value};

use crate::config::MachineConfig;
use crate::errors::{stack_underflow, unknown_command, EvalErrorKind};
use crate::exec;
use crate::snapshot::Snapshot;

/// A saved entry on the Dump.
#[derive(Clone, Debug)]
pub enum DumpEntry {
    /// Continuation saved by `SEL`, restored by `JOIN`.
    Branch { control: VecDeque<Value> },
    /// Caller state saved by `AP`/`RAP`, restored by `RTN`.
    Call {
        environment: Environment,
        stack: Vec<Value>,
        control: VecDeque<Value>,
    },
}

impl DumpEntry {
    /// Name used in `EmptyDump` reports.
    pub fn describe(entry: Option<&DumpEntry>) -> &'static str {
        match entry {
            None => "nothing",
            Some(DumpEntry::Branch { .. }) => "branch continuation",
            Some(DumpEntry::Call { .. }) => "call frame",
        }
    }
}

/// Write a control sequence in block form.
fn fmt_control(f: &mut fmt::Formatter<'_>, control: &VecDeque<Value>) -> fmt::Result {
    let items: Vec<Value> = control.iter().cloned().collect();
    write!(f, "{}", Value::code(items))
}

impl fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpEntry::Branch { control } => {
                f.write_str("join ")?;
                fmt_control(f, control)
            }
            DumpEntry::Call {
                environment,
                stack,
                control,
            } => {
                write!(
                    f,
                    "call(env={environment}, stack={}, control=",
                    Value::List(stack.clone())
                )?;
                fmt_control(f, control)?;
                f.write_str(")")
            }
        }
    }
}

/// A failed step: what went wrong and which instruction was running.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct StepError {
    pub kind: EvalErrorKind,
    pub opcode: Option<Opcode>,
}

/// SECD machine state.
#[derive(Clone, Debug)]
pub struct Machine {
    pub(crate) stack: Vec<Value>,
    pub(crate) environment: Environment,
    pub(crate) control: VecDeque<Value>,
    pub(crate) dump: Vec<DumpEntry>,
    /// Reject `LD` of a list value.
    pub(crate) strict_scalar_loads: bool,
}

impl Machine {
    /// A fresh machine with default configuration and `program` in Control.
    pub fn new(program: &[Value]) -> Self {
        Machine::with_config(program, &MachineConfig::default())
    }

    /// A fresh machine with `program` in Control, configured by `config`.
    pub fn with_config(program: &[Value], config: &MachineConfig) -> Self {
        Machine {
            stack: Vec::new(),
            environment: Environment::new(),
            control: program.iter().cloned().collect(),
            dump: Vec::new(),
            strict_scalar_loads: config.strict_scalar_loads,
        }
    }

    /// Rebuild a machine from a captured snapshot (e.g. the state carried
    /// by an `EvalError`) to replay the failing step.
    pub fn from_snapshot(snapshot: &Snapshot, config: &MachineConfig) -> Self {
        Machine {
            stack: snapshot.stack.clone(),
            environment: snapshot.environment.clone(),
            control: snapshot.control.iter().cloned().collect(),
            dump: snapshot.dump.clone(),
            strict_scalar_loads: config.strict_scalar_loads,
        }
    }

    /// Get the Stack, top last.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Get the current Environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Get the remaining Control.
    pub fn control(&self) -> &VecDeque<Value> {
        &self.control
    }

    /// Get the Dump, most recent entry last.
    pub fn dump(&self) -> &[DumpEntry] {
        &self.dump
    }

    /// Whether Control is exhausted.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.control.is_empty()
    }

    /// The instruction at the head of Control, if it is one.
    pub fn next_opcode(&self) -> Option<Opcode> {
        match self.control.front() {
            Some(Value::Op(op)) => Some(*op),
            _ => None,
        }
    }

    /// Top of Stack.
    pub fn result(&self) -> Option<Value> {
        self.stack.last().cloned()
    }

    /// Copy of all four registers, labelled with `step`.
    pub fn snapshot(&self, step: usize) -> Snapshot {
        Snapshot {
            step,
            stack: self.stack.clone(),
            environment: self.environment.clone(),
            control: self.control.iter().cloned().collect(),
            dump: self.dump.clone(),
        }
    }

    /// Execute one item from the front of Control.
    ///
    /// Instructions dispatch to their handler; literals (numbers, booleans,
    /// strings, lists) are pushed as they are. A bare code block or closure
    /// is not executable and fails with `UnknownCommand`. Stepping a halted
    /// machine does nothing.
    pub fn step(&mut self) -> Result<(), StepError> {
        let Some(item) = self.control.pop_front() else {
            return Ok(());
        };
        match item {
            Value::Op(op) => {
                if let Err(kind) = exec::dispatch(self, op) {
                    self.control.push_front(Value::Op(op));
                    return Err(StepError {
                        kind,
                        opcode: Some(op),
                    });
                }
                Ok(())
            }
            literal if literal.is_literal() => {
                self.stack.push(literal);
                Ok(())
            }
            other => {
                let kind = unknown_command(&other);
                self.control.push_front(other);
                Err(StepError { kind, opcode: None })
            }
        }
    }

    // Operand access shared by the handlers. Every accessor validates
    // before it removes anything.

    pub(crate) fn peek(&self, opcode: Opcode) -> Result<&Value, EvalErrorKind> {
        self.stack
            .last()
            .ok_or_else(|| stack_underflow(opcode, 1, 0))
    }

    /// The top two values as `(a, b)`, `b` being the top.
    pub(crate) fn peek_pair(&self, opcode: Opcode) -> Result<(&Value, &Value), EvalErrorKind> {
        match self.stack.as_slice() {
            [.., a, b] => Ok((a, b)),
            short => Err(stack_underflow(opcode, 2, short.len())),
        }
    }

    pub(crate) fn pop(&mut self, opcode: Opcode) -> Result<Value, EvalErrorKind> {
        self.stack
            .pop()
            .ok_or_else(|| stack_underflow(opcode, 1, 0))
    }

    /// Remove the top two values as `(a, b)`, `b` being the former top.
    pub(crate) fn pop_pair(&mut self, opcode: Opcode) -> Result<(Value, Value), EvalErrorKind> {
        let found = self.stack.len();
        let Some(split) = found.checked_sub(2) else {
            return Err(stack_underflow(opcode, 2, found));
        };
        let mut top = self.stack.split_off(split);
        match (top.pop(), top.pop()) {
            (Some(b), Some(a)) => Ok((a, b)),
            _ => Err(stack_underflow(opcode, 2, found)),
        }
    }

    /// Replace the top value with `value`.
    pub(crate) fn replace_top(&mut self, value: Value) {
        self.stack.pop();
        self.stack.push(value);
    }

    /// Replace the top two values with `value`.
    pub(crate) fn replace_pair(&mut self, value: Value) {
        let keep = self.stack.len().saturating_sub(2);
        self.stack.truncate(keep);
        self.stack.push(value);
    }
}
