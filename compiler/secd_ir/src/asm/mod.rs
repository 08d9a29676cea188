//! Plain-text form of instruction streams.
//!
//! ```text
//! ; (fn x y => x + y) 5 3
//! LDC 3 LDC 5 CONS
//! LDF (LD 0 0 LD 0 1 ADD RTN)
//! SWAP AP
//! ```
//!
//! - mnemonics are case-insensitive and become `Value::Op`, except that
//!   lowercase `nil` is the empty-list literal
//! - `( ... )` is a nested code block, `[ ... ]` a list literal
//! - `true`, `false`, `nil`, integers, floats (including `inf`, `-inf` and
//!   `NaN`) and double-quoted strings
//! - `;` starts a line comment; commas are whitespace
//!
//! `Display` on `Value` writes the same syntax, so `disassemble` output
//! assembles back to an equal stream. `NaN` reads back as `NaN`, which
//! never compares equal to itself.

use std::ops::Range;

use logos::Logos;

use crate::opcode::Opcode;
use crate::value::Value;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"([ \t\r\n,]+|;[^\n]*)")]
enum Token {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(
        r"-?[0-9]+(\.[0-9]+([eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)",
        |lex| lex.slice().parse::<f64>().ok()
    )]
    #[token("inf", |_| f64::INFINITY)]
    #[token("-inf", |_| f64::NEG_INFINITY)]
    #[token("NaN", |_| f64::NAN)]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
}

/// Strip the quotes and resolve escapes. Unknown escapes are rejected.
fn unescape(quoted: &str) -> Option<String> {
    let inner = quoted.get(1..quoted.len().checked_sub(1)?)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            _ => return None,
        }
    }
    Some(out)
}

/// Error produced while reading an instruction stream.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AsmError {
    #[error("invalid token at {span:?}")]
    InvalidToken { span: Range<usize> },
    #[error("unknown mnemonic `{word}` at {span:?}")]
    UnknownMnemonic { word: String, span: Range<usize> },
    #[error("unexpected `{found}` at {span:?}")]
    UnexpectedClose { found: char, span: Range<usize> },
    #[error("`{open}` opened at {span:?} is never closed")]
    Unclosed { open: char, span: Range<usize> },
    #[error("list literals may only hold literals; found {found} at {span:?}")]
    NotALiteral {
        found: &'static str,
        span: Range<usize>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Group {
    Code,
    List,
}

impl Group {
    fn open(self) -> char {
        match self {
            Group::Code => '(',
            Group::List => '[',
        }
    }
}

/// An unfinished `( ... )` or `[ ... ]`.
struct Open {
    group: Group,
    span: Range<usize>,
    items: Vec<Value>,
}

/// Read an instruction stream.
///
/// Nesting is tracked with an explicit stack, so deep blocks do not
/// recurse.
pub fn assemble(source: &str) -> Result<Vec<Value>, AsmError> {
    let mut top: Vec<Value> = Vec::new();
    let mut open: Vec<Open> = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let Ok(token) = token else {
            return Err(AsmError::InvalidToken { span });
        };

        let in_list = open.last().is_some_and(|o| o.group == Group::List);
        let item = match token {
            Token::LParen | Token::LBracket => {
                let group = if token == Token::LParen {
                    if in_list {
                        return Err(AsmError::NotALiteral {
                            found: "code block",
                            span,
                        });
                    }
                    Group::Code
                } else {
                    Group::List
                };
                open.push(Open {
                    group,
                    span,
                    items: Vec::new(),
                });
                continue;
            }
            Token::RParen | Token::RBracket => {
                let group = if token == Token::RParen {
                    Group::Code
                } else {
                    Group::List
                };
                match open.pop() {
                    Some(done) if done.group == group => match group {
                        Group::Code => Value::code(done.items),
                        Group::List => Value::List(done.items),
                    },
                    _ => {
                        let found = if group == Group::Code { ')' } else { ']' };
                        return Err(AsmError::UnexpectedClose { found, span });
                    }
                }
            }
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::Nil => Value::nil(),
            Token::Int(n) => Value::Int(n),
            Token::Float(x) => Value::Float(x),
            Token::Str(s) => Value::string(s),
            Token::Word => {
                let word = lexer.slice();
                let Some(op) = Opcode::from_mnemonic(word) else {
                    return Err(AsmError::UnknownMnemonic {
                        word: word.to_string(),
                        span,
                    });
                };
                if in_list {
                    return Err(AsmError::NotALiteral {
                        found: "instruction",
                        span,
                    });
                }
                Value::Op(op)
            }
        };

        match open.last_mut() {
            Some(parent) => parent.items.push(item),
            None => top.push(item),
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(AsmError::Unclosed {
            open: unclosed.group.open(),
            span: unclosed.span,
        });
    }
    Ok(top)
}

/// Write a program in the form `assemble` reads.
pub fn disassemble(program: &[Value]) -> String {
    program
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
