//! Runtime values for the SECD machine.
//!
//! Every register holds `Value`s. Control holds them too: an instruction is
//! `Value::Op`, a nested block (`LDF` body, `SEL` arm) is `Value::Code`, and
//! anything else is a literal.
//!
//! # Sharing
//!
//! `Code` blocks are immutable and shared through `Arc`. Lists are owned
//! vectors, so cloning a list is a structural copy. Closures carry an
//! `Environment`, whose frames are shared handles; see `crate::frame`.

use std::fmt;
use std::sync::Arc;

use crate::frame::Environment;
use crate::opcode::Opcode;

/// An immutable instruction block.
pub type Code = Arc<[Value]>;

/// Runtime value in the SECD machine.
#[derive(Clone, Debug)]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    Str(Arc<str>),
    /// Ordered sequence. The empty list is nil; `[head, tail]` is a cons cell.
    List(Vec<Value>),
    /// Function value produced by `LDF`.
    Closure(Closure),
    /// An instruction appearing in Control (or loaded as data by `LDC`).
    Op(Opcode),
    /// A nested instruction block.
    Code(Code),
}

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a float value.
    #[inline]
    pub fn float(x: f64) -> Self {
        Value::Float(x)
    }

    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create a list from its elements.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    /// The empty list.
    pub fn nil() -> Self {
        Value::List(Vec::new())
    }

    /// A two-element cons cell `[head, tail]`.
    pub fn cons(head: Value, tail: Value) -> Self {
        Value::List(vec![head, tail])
    }

    /// A nested instruction block.
    pub fn code(items: Vec<Value>) -> Self {
        Value::Code(items.into())
    }

    /// Create a closure over `environment`.
    pub fn closure(code: Code, environment: Environment) -> Self {
        Value::Closure(Closure::new(code, environment))
    }

    /// Short name of the value's shape, used in type mismatch reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Closure(_) => "closure",
            Value::Op(_) => "instruction",
            Value::Code(_) => "code block",
        }
    }

    /// Truthiness used by `SEL`.
    ///
    /// `false`, zero, the empty string and the empty list are false;
    /// everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Closure(_) | Value::Op(_) | Value::Code(_) => true,
        }
    }

    /// `ATOM`: anything that is not a list.
    pub fn is_atom(&self) -> bool {
        !matches!(self, Value::List(_))
    }

    /// Whether a bare occurrence in Control is pushed directly onto Stack.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Str(_) | Value::List(_)
        )
    }

    /// Whether the value is an `Int` or a `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Opcode> for Value {
    fn from(op: Opcode) -> Self {
        Value::Op(op)
    }
}

#[allow(
    clippy::float_cmp,
    clippy::cast_precision_loss,
    reason = "structural equality treats 1 and 1.0 as the same number"
)]
fn int_eq_float(n: i64, x: f64) -> bool {
    n as f64 == x
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp, reason = "structural equality on floats is exact")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(n), Value::Float(x)) | (Value::Float(x), Value::Int(n)) => {
                int_eq_float(*n, *x)
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => a == b,
            (Value::Op(a), Value::Op(b)) => a == b,
            (Value::Code(a), Value::Code(b)) => a == b,
            _ => false,
        }
    }
}

/// Write `items` separated by `sep`.
fn write_separated(f: &mut fmt::Formatter<'_>, items: &[Value], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Write a block in the same form `assemble` reads back.
fn write_code(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("(")?;
    write_separated(f, items, " ")?;
    f.write_str(")")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            // Debug keeps the decimal point, so `2.0` does not read back as `2`.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write_quoted(f, s),
            Value::List(items) => {
                f.write_str("[")?;
                write_separated(f, items, ", ")?;
                f.write_str("]")
            }
            Value::Closure(closure) => write!(f, "{closure}"),
            Value::Op(op) => write!(f, "{op}"),
            Value::Code(code) => write_code(f, code),
        }
    }
}

/// A function value: an instruction block plus the environment it was
/// created in.
///
/// The captured environment is a snapshot of the frame list at `LDF` time.
/// Equality compares code structurally and frames by identity, so comparing
/// (or printing) a recursive closure never walks the cycle through its
/// letrec frame.
#[derive(Clone)]
pub struct Closure {
    code: Code,
    environment: Environment,
}

impl Closure {
    /// Create a closure from a body and its captured environment.
    pub fn new(code: Code, environment: Environment) -> Self {
        Closure { code, environment }
    }

    /// Get the closure body.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Get the captured environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.environment.same_frames(&other.environment)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("code", &self.code)
            .field("frames", &self.environment.len())
            .finish()
    }
}

impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<closure ")?;
        write_code(f, &self.code)?;
        write!(f, " env={}>", self.environment.len())
    }
}

#[cfg(test)]
mod tests;
