//! Structured error reporting for assembly.

use thiserror::Error;

/// The kinds of error assembly can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleErrorKind {
    /// The mnemonic is not in the instruction table.
    #[error("unknown instruction: {0}")]
    UnknownMnemonic(String),
    /// The operand is not a valid register name.
    #[error("invalid register: {0}")]
    InvalidRegister(String),
    /// The operand is not a valid `D(%reg)` memory reference.
    #[error("invalid memory operand: {0}")]
    InvalidMemoryOperand(String),
    /// The operand is not a valid decimal or hexadecimal literal.
    #[error("invalid integer literal: {0}")]
    InvalidLiteral(String),
    /// The instruction received the wrong number of operands.
    #[error("expected {expected} operand(s) for {mnemonic}")]
    OperandCount {
        /// The mnemonic as written.
        mnemonic: String,
        /// How many comma-separated operands the form takes.
        expected: usize,
    },
    /// `.align` was given a non-positive boundary.
    #[error("invalid alignment: {0}")]
    InvalidAlignment(i64),
    /// `.pos` was given a negative address.
    #[error("invalid position: {0}")]
    InvalidPosition(i64),
    /// A referenced label was never defined.
    #[error("undefined label: {0}")]
    UndefinedLabel(String),
}

/// An assembly error tagged with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct AssembleError {
    /// 1-indexed line the error was raised on.
    pub line: usize,
    /// What went wrong.
    pub kind: AssembleErrorKind,
}

impl AssembleError {
    /// Tags an error kind with its source line.
    #[must_use]
    pub const fn new(line: usize, kind: AssembleErrorKind) -> Self {
        Self { line, kind }
    }
}
