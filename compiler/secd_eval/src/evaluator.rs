//! Evaluation driver.
//!
//! `Evaluator` repeatedly steps a `Machine` until Control is exhausted, a
//! step fails, or the step budget runs out. The result is the value on top
//! of Stack at halt, or `None` when Stack is empty.
//!
//! Budget check happens before each step: with a budget of `n`, a program
//! that halts after exactly `n` steps succeeds, and one that still has
//! Control left after `n` steps fails with `StepBudgetExceeded` on step
//! `n + 1`.

use secd_ir::{assemble, Value};

use crate::config::MachineConfig;
use crate::errors::{step_budget_exceeded, EvalError, EvalResult, EvalSourceError};
use crate::machine::{Machine, StepError};
use crate::trace::{log_sink, silent_sink, SharedTraceSink};

/// Builder for `Evaluator`.
///
/// Without an explicit trace sink, `trace_steps` picks the log sink and the
/// default is silent.
#[derive(Default)]
pub struct EvaluatorBuilder {
    config: MachineConfig,
    sink: Option<SharedTraceSink>,
}

impl EvaluatorBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        EvaluatorBuilder::default()
    }

    /// Replace the whole configuration. A zero step budget is raised to 1.
    #[must_use]
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Maximum number of steps. Values below 1 are raised to 1.
    #[must_use]
    pub fn step_budget(mut self, budget: usize) -> Self {
        self.config = self.config.with_step_budget(budget);
        self
    }

    /// Whether `LD` rejects list values.
    #[must_use]
    pub fn strict_scalar_loads(mut self, strict: bool) -> Self {
        self.config.strict_scalar_loads = strict;
        self
    }

    /// Log a snapshot per step when no sink is given.
    #[must_use]
    pub fn trace_steps(mut self, enabled: bool) -> Self {
        self.config.trace_steps = enabled;
        self
    }

    /// Send per-step snapshots to `sink`. Overrides `trace_steps`.
    #[must_use]
    pub fn trace_sink(mut self, sink: SharedTraceSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Create the evaluator.
    pub fn build(self) -> Evaluator {
        let config = self.config.with_step_budget(self.config.step_budget);
        let sink = self.sink.unwrap_or_else(|| {
            if config.trace_steps {
                log_sink()
            } else {
                silent_sink()
            }
        });
        Evaluator { config, sink }
    }
}

/// Runs programs to completion on fresh machines.
#[derive(Clone)]
pub struct Evaluator {
    config: MachineConfig,
    sink: SharedTraceSink,
}

impl Default for Evaluator {
    fn default() -> Self {
        EvaluatorBuilder::new().build()
    }
}

impl Evaluator {
    /// Create a builder with the default configuration.
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    /// An evaluator configured from the `SECD_*` environment variables.
    pub fn from_env() -> Self {
        EvaluatorBuilder::new()
            .config(MachineConfig::from_env())
            .build()
    }

    /// Get the configuration the evaluator runs with.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Get the sink receiving per-step snapshots.
    pub fn trace_sink(&self) -> &SharedTraceSink {
        &self.sink
    }

    /// Evaluate `program` on a fresh machine.
    #[tracing::instrument(level = "debug", skip_all, fields(len = program.len()))]
    pub fn eval(&self, program: &[Value]) -> EvalResult {
        let mut machine = Machine::with_config(program, &self.config);
        self.run(&mut machine)
    }

    /// Drive `machine` until it halts.
    ///
    /// On failure the machine is left in the state it had before the
    /// failing step, which is also the state carried by the error.
    #[tracing::instrument(level = "debug", skip_all, fields(budget = self.config.step_budget))]
    pub fn run(&self, machine: &mut Machine) -> EvalResult {
        let mut steps = 0usize;
        while !machine.is_halted() {
            let step = steps + 1;
            if steps == self.config.step_budget {
                return Err(abort(
                    machine,
                    step,
                    StepError {
                        kind: step_budget_exceeded(self.config.step_budget),
                        opcode: machine.next_opcode(),
                    },
                ));
            }

            if self.sink.is_enabled() {
                self.sink.record(machine.snapshot(step));
            }
            tracing::trace!(
                step,
                opcode = ?machine.next_opcode(),
                stack = machine.stack().len(),
                dump = machine.dump().len(),
                "step"
            );

            if let Err(error) = machine.step() {
                return Err(abort(machine, step, error));
            }
            steps = step;
        }
        tracing::debug!(steps, "halted");
        Ok(machine.result())
    }
}

fn abort(machine: &Machine, step: usize, error: StepError) -> EvalError {
    tracing::debug!(step, kind = %error.kind, "evaluation aborted");
    EvalError {
        kind: error.kind,
        step,
        opcode: error.opcode,
        state: Box::new(machine.snapshot(step)),
    }
}

/// Evaluate `program` with the default configuration.
pub fn eval(program: &[Value]) -> EvalResult {
    Evaluator::default().eval(program)
}

/// Assemble `source` and evaluate it with the default configuration.
pub fn eval_source(source: &str) -> Result<Option<Value>, EvalSourceError> {
    let program = assemble(source)?;
    Ok(eval(&program)?)
}
