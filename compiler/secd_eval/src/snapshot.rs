//! Point-in-time copies of the machine registers.
//!
//! Snapshots feed the trace sink and are attached to every `EvalError`.
//! Environment frames inside a snapshot are the same shared handles the
//! machine uses, so a letrec placeholder filled after the snapshot was
//! taken shows up filled.

use std::fmt;

use secd_ir::{Environment, Value};

use crate::machine::DumpEntry;

/// Copy of Stack, Environment, Control and Dump.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Step the snapshot was taken before (1-based).
    pub step: usize,
    pub stack: Vec<Value>,
    pub environment: Environment,
    pub control: Vec<Value>,
    pub dump: Vec<DumpEntry>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Step {}:", self.step)?;
        writeln!(f, "Stack: {}", Value::List(self.stack.clone()))?;
        writeln!(f, "Environment: {}", self.environment)?;
        writeln!(f, "Control: {}", secd_ir::disassemble(&self.control))?;
        f.write_str("Dump: [")?;
        for (i, entry) in self.dump.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{entry}")?;
        }
        f.write_str("]")
    }
}
