//! The SECD instruction set.
//!
//! The set is closed, so dispatch is an exhaustive `match` rather than a
//! string-keyed table.

use std::fmt;
use std::str::FromStr;

/// One SECD instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Arithmetic and comparison
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Gt,

    // Stack shuffling
    Pop,
    Dup,
    Swap,

    // Lists
    Cons,
    Car,
    Cdr,
    Nil,
    Atom,

    // Control transfer
    Sel,
    Join,
    Rtn,

    // Loads and closures
    Ld,
    Ldc,
    Ldf,
    Ap,
    Rap,
    Dum,
}

impl Opcode {
    /// Every opcode, in table order.
    pub const ALL: [Opcode; 24] = [
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Eq,
        Opcode::Lt,
        Opcode::Gt,
        Opcode::Pop,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Cons,
        Opcode::Car,
        Opcode::Cdr,
        Opcode::Nil,
        Opcode::Atom,
        Opcode::Sel,
        Opcode::Join,
        Opcode::Rtn,
        Opcode::Ld,
        Opcode::Ldc,
        Opcode::Ldf,
        Opcode::Ap,
        Opcode::Rap,
        Opcode::Dum,
    ];

    /// Upper-case mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Eq => "EQ",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Pop => "POP",
            Opcode::Dup => "DUP",
            Opcode::Swap => "SWAP",
            Opcode::Cons => "CONS",
            Opcode::Car => "CAR",
            Opcode::Cdr => "CDR",
            Opcode::Nil => "NIL",
            Opcode::Atom => "ATOM",
            Opcode::Sel => "SEL",
            Opcode::Join => "JOIN",
            Opcode::Rtn => "RTN",
            Opcode::Ld => "LD",
            Opcode::Ldc => "LDC",
            Opcode::Ldf => "LDF",
            Opcode::Ap => "AP",
            Opcode::Rap => "RAP",
            Opcode::Dum => "DUM",
        }
    }

    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(word: &str) -> Option<Opcode> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(word))
    }

    /// Number of Stack values the instruction needs to be present.
    ///
    /// `DUP` reads its operand without consuming it but still needs one.
    pub fn stack_operands(self) -> usize {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Eq
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Swap
            | Opcode::Cons
            | Opcode::Ap
            | Opcode::Rap => 2,
            Opcode::Pop
            | Opcode::Dup
            | Opcode::Car
            | Opcode::Cdr
            | Opcode::Atom
            | Opcode::Sel
            | Opcode::Rtn => 1,
            Opcode::Nil
            | Opcode::Join
            | Opcode::Ld
            | Opcode::Ldc
            | Opcode::Ldf
            | Opcode::Dum => 0,
        }
    }

    /// Number of items the instruction reads inline from Control.
    pub fn control_operands(self) -> usize {
        match self {
            Opcode::Ld | Opcode::Sel => 2,
            Opcode::Ldc | Opcode::Ldf => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Error returned when a word is not a known mnemonic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown mnemonic `{0}`")]
pub struct UnknownMnemonic(pub String);

impl FromStr for Opcode {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Opcode::from_mnemonic(s).ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}
