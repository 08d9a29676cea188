//! SECD IR - values and instruction streams for the SECD machine.
//!
//! This crate contains the data the machine operates on:
//! - `Opcode`: the closed instruction set
//! - `Value`: the tagged union flowing through every register, including
//!   instruction items (`Value::Op`) and nested blocks (`Value::Code`)
//! - `Frame` / `Environment`: lexical frames addressed by `(frame, slot)`
//! - `assemble` / `disassemble`: a plain-text form of instruction streams
//!
//! # Design Philosophy
//!
//! - **No names at runtime**: variables are `(frame, slot)` index pairs,
//!   resolved by whatever front end produced the stream.
//! - **Snapshots, not aliases**: cloning an `Environment` copies its frame
//!   list. The only in-place frame mutation is filling a `DUM` placeholder.

mod asm;
mod frame;
mod opcode;
mod value;

pub use asm::{assemble, disassemble, AsmError};
pub use frame::{Environment, Frame, LookupError};
pub use opcode::{Opcode, UnknownMnemonic};
pub use value::{Closure, Code, Value};
