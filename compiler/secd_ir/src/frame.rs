//! Environment frames.
//!
//! An `Environment` is an ordered list of frames; index 0 is the innermost
//! frame. Variables are addressed by `(frame, slot)`.
//!
//! # Letrec
//!
//! `DUM` pushes a placeholder frame and `RAP` later fills it. The fill
//! happens in place on the shared `Frame` handle, so closures created
//! between the two instructions (which captured the placeholder) see the
//! real bindings once it is filled. This is the only in-place frame
//! mutation: a bound frame never changes, and cloning an `Environment`
//! copies its frame list.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::value::Value;

enum Slots {
    /// Installed by `DUM`, not yet filled by `RAP`.
    Placeholder,
    Bound(Vec<Value>),
}

/// Shared handle to one frame's slots.
#[derive(Clone)]
pub struct Frame(Arc<RwLock<Slots>>);

impl Frame {
    /// A bound frame holding `values`.
    pub fn new(values: Vec<Value>) -> Self {
        Frame(Arc::new(RwLock::new(Slots::Bound(values))))
    }

    /// An uninitialised letrec frame.
    pub fn placeholder() -> Self {
        Frame(Arc::new(RwLock::new(Slots::Placeholder)))
    }

    /// Whether the frame is still an unfilled `DUM` placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(*self.0.read(), Slots::Placeholder)
    }

    /// Copy of the slot values, or `None` for a placeholder.
    pub fn values(&self) -> Option<Vec<Value>> {
        match &*self.0.read() {
            Slots::Placeholder => None,
            Slots::Bound(values) => Some(values.clone()),
        }
    }

    /// Fill a placeholder in place.
    ///
    /// Returns the values back if the frame is already bound.
    pub fn fill(&self, values: Vec<Value>) -> Result<(), Vec<Value>> {
        let mut slots = self.0.write();
        match &*slots {
            Slots::Placeholder => {
                *slots = Slots::Bound(values);
                Ok(())
            }
            Slots::Bound(_) => Err(values),
        }
    }

    /// Whether both handles point at the same frame.
    pub fn ptr_eq(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.read() {
            Slots::Placeholder => f.write_str("Frame(<dummy>)"),
            Slots::Bound(values) => f.debug_tuple("Frame").field(values).finish(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.read() {
            Slots::Placeholder => f.write_str("<dummy>"),
            Slots::Bound(values) => write!(f, "{}", Value::List(values.clone())),
        }
    }
}

/// Why an `(frame, slot)` lookup failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("frame {frame} out of bounds (environment has {depth} frames)")]
    FrameOutOfBounds { frame: usize, depth: usize },
    #[error("slot [{frame},{slot}] out of bounds (frame has {width} slots)")]
    SlotOutOfBounds {
        frame: usize,
        slot: usize,
        width: usize,
    },
    #[error("frame {frame} is an uninitialised letrec placeholder")]
    Uninitialized { frame: usize },
    #[error("negative environment index {index}")]
    NegativeIndex { index: i64 },
}

/// Ordered list of frames, innermost first.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Environment { frames: Vec::new() }
    }

    /// Create an environment from frames, innermost first.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Environment { frames }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get the frames, innermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// `DUM`: insert a placeholder as the new innermost frame.
    pub fn push_placeholder(&mut self) {
        self.frames.insert(0, Frame::placeholder());
    }

    /// `[args] + self`.
    pub fn extended(&self, args: Vec<Value>) -> Environment {
        let mut frames = Vec::with_capacity(self.frames.len() + 1);
        frames.push(Frame::new(args));
        frames.extend(self.frames.iter().cloned());
        Environment { frames }
    }

    /// `[args] + self[1:]`: a fresh frame in place of the innermost one.
    pub fn with_front_replaced(&self, args: Vec<Value>) -> Environment {
        let mut frames = Vec::with_capacity(self.frames.len().max(1));
        frames.push(Frame::new(args));
        frames.extend(self.frames.iter().skip(1).cloned());
        Environment { frames }
    }

    /// Read slot `slot` of frame `frame`.
    pub fn lookup(&self, frame: usize, slot: usize) -> Result<Value, LookupError> {
        let handle = self.frames.get(frame).ok_or(LookupError::FrameOutOfBounds {
            frame,
            depth: self.frames.len(),
        })?;
        match &*handle.0.read() {
            Slots::Placeholder => Err(LookupError::Uninitialized { frame }),
            Slots::Bound(values) => {
                values
                    .get(slot)
                    .cloned()
                    .ok_or(LookupError::SlotOutOfBounds {
                        frame,
                        slot,
                        width: values.len(),
                    })
            }
        }
    }

    /// Whether both environments hold the same frame handles in order.
    pub fn same_frames(&self, other: &Environment) -> bool {
        self.frames.len() == other.frames.len()
            && self
                .frames
                .iter()
                .zip(&other.frames)
                .all(|(a, b)| a.ptr_eq(b))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{frame}")?;
        }
        f.write_str("]")
    }
}
