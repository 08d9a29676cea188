//! SECD abstract machine.
//!
//! Evaluates instruction streams built from `secd_ir` values on a machine
//! with four registers: Stack, Environment, Control and Dump.
//!
//! # Architecture
//!
//! - `Machine`: the registers plus a failure-atomic `step`
//! - `exec`: one handler per opcode, dispatched by `match`
//! - `Evaluator`: runs a machine to completion under a step budget and
//!   feeds per-step snapshots to a `TraceSink`
//! - `errors`: `EvalErrorKind`, `EvalError` and their constructors
//!
//! ```text
//! let result = secd_eval::eval_source("LDC 5 LDC 3 ADD")?;
//! assert_eq!(result, Some(Value::Int(8)));
//! ```

mod config;
pub mod errors;
mod evaluator;
mod exec;
mod machine;
mod snapshot;
mod trace;

pub use config::{MachineConfig, DEFAULT_STEP_BUDGET};
pub use errors::{EvalError, EvalErrorKind, EvalResult, EvalSourceError};
pub use evaluator::{eval, eval_source, Evaluator, EvaluatorBuilder};
pub use machine::{DumpEntry, Machine, StepError};
pub use snapshot::Snapshot;
pub use trace::{buffer_sink, log_sink, silent_sink, SharedTraceSink, TraceBuffer, TraceSink};

pub use secd_ir::{assemble, disassemble, AsmError, Environment, Frame, Opcode, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=secd_eval=debug` for per-step snapshots from the log sink or
/// `RUST_LOG=secd_eval=trace` for call/return events.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
