//! Per-step debug output.
//!
//! The driver hands a snapshot of the registers to the trace sink before
//! each step. Where the snapshots go depends on the sink:
//! - `Silent`: nowhere (default)
//! - `Log`: a `debug` event on the `secd_eval::trace` target
//! - `Buffer`: captured in memory for inspection by tests and tools
//!
//! Enum dispatch rather than a trait object, since there are only three
//! destinations and the sink is consulted on every step.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::snapshot::Snapshot;

/// In-memory snapshot capture.
#[derive(Default)]
pub struct TraceBuffer {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl TraceBuffer {
    /// Create an empty trace buffer.
    pub fn new() -> Self {
        TraceBuffer::default()
    }

    /// Append a snapshot.
    pub fn push(&self, snapshot: Snapshot) {
        self.snapshots.lock().push(snapshot);
    }

    /// Copy of everything captured so far.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().clone()
    }

    /// Number of captured snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.snapshots.lock().is_empty()
    }

    /// Drop all captured snapshots.
    pub fn clear(&self) {
        self.snapshots.lock().clear();
    }
}

/// Destination for per-step snapshots.
pub enum TraceSink {
    Silent,
    Log,
    Buffer(TraceBuffer),
}

impl TraceSink {
    /// Whether the driver should bother taking snapshots.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, TraceSink::Silent)
    }

    /// Hand one snapshot to the sink.
    pub fn record(&self, snapshot: Snapshot) {
        match self {
            TraceSink::Silent => {}
            TraceSink::Log => {
                tracing::debug!(target: "secd_eval::trace", step = snapshot.step, "{snapshot}");
            }
            TraceSink::Buffer(buffer) => buffer.push(snapshot),
        }
    }

    /// Captured snapshots. Empty for sinks that do not capture.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        match self {
            TraceSink::Buffer(buffer) => buffer.snapshots(),
            TraceSink::Silent | TraceSink::Log => Vec::new(),
        }
    }

    /// Clear captured snapshots.
    pub fn clear(&self) {
        if let TraceSink::Buffer(buffer) = self {
            buffer.clear();
        }
    }
}

/// Trace sink shared between an evaluator and its caller.
pub type SharedTraceSink = Arc<TraceSink>;

/// Discard all snapshots.
pub fn silent_sink() -> SharedTraceSink {
    Arc::new(TraceSink::Silent)
}

/// Emit snapshots as `tracing` events.
pub fn log_sink() -> SharedTraceSink {
    Arc::new(TraceSink::Log)
}

/// Capture snapshots for later inspection.
pub fn buffer_sink() -> SharedTraceSink {
    Arc::new(TraceSink::Buffer(TraceBuffer::new()))
}
