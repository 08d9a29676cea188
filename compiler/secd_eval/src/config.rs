//! Machine configuration.
//!
//! The tunables are the step budget, whether `LD` rejects list values, and
//! whether every step is traced. Defaults can be overridden from the
//! environment:
//!
//! - `SECD_STEP_BUDGET`: positive integer (default 1000)
//! - `SECD_STRICT_LOADS`: `true`/`false`/`1`/`0` (default true)
//! - `SECD_TRACE`: `true`/`false`/`1`/`0` (default false)

/// Steps allowed before evaluation is aborted.
pub const DEFAULT_STEP_BUDGET: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum number of steps. An evaluator treats anything below 1 as 1.
    pub step_budget: usize,
    /// Fail `LD` with `TypeMismatch` when the loaded value is a list.
    pub strict_scalar_loads: bool,
    /// Emit a snapshot per step through the log sink when no explicit sink
    /// is configured.
    pub trace_steps: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            step_budget: DEFAULT_STEP_BUDGET,
            strict_scalar_loads: true,
            trace_steps: false,
        }
    }
}

impl MachineConfig {
    /// Defaults overridden by `SECD_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    ///
    /// Malformed values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = MachineConfig::default();
        if let Some(raw) = lookup("SECD_STEP_BUDGET") {
            match raw.trim().parse::<usize>() {
                Ok(budget) if budget > 0 => config.step_budget = budget,
                _ => tracing::warn!(value = %raw, "ignoring invalid SECD_STEP_BUDGET"),
            }
        }
        if let Some(raw) = lookup("SECD_STRICT_LOADS") {
            match parse_flag(&raw) {
                Some(flag) => config.strict_scalar_loads = flag,
                None => tracing::warn!(value = %raw, "ignoring invalid SECD_STRICT_LOADS"),
            }
        }
        if let Some(raw) = lookup("SECD_TRACE") {
            match parse_flag(&raw) {
                Some(flag) => config.trace_steps = flag,
                None => tracing::warn!(value = %raw, "ignoring invalid SECD_TRACE"),
            }
        }
        config
    }

    /// Set the step budget. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = budget.max(1);
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
