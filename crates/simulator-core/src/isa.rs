//! Instruction encoding tables for the sequential Y86-64 ISA.
//!
//! The first instruction byte splits into `icode` (high nibble, instruction
//! family) and `ifun` (low nibble, sub-operation). Any `icode` above `0xB`
//! is illegal by definition; an unassigned `ifun` inside a legal family is
//! not an encoding fault and resolves to a benign no-op at execute time.

use crate::state::ConditionCodes;

/// Instruction families selected by the high nibble of the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Icode {
    Halt = 0x0,
    Nop = 0x1,
    Rrmovq = 0x2,
    Irmovq = 0x3,
    Rmmovq = 0x4,
    Mrmovq = 0x5,
    Opq = 0x6,
    Jxx = 0x7,
    Call = 0x8,
    Ret = 0x9,
    Pushq = 0xA,
    Popq = 0xB,
}

impl Icode {
    /// Decodes the high nibble of an instruction byte. `None` means an
    /// illegal instruction (`icode > 0xB`).
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Option<Self> {
        match bits {
            0x0 => Some(Self::Halt),
            0x1 => Some(Self::Nop),
            0x2 => Some(Self::Rrmovq),
            0x3 => Some(Self::Irmovq),
            0x4 => Some(Self::Rmmovq),
            0x5 => Some(Self::Mrmovq),
            0x6 => Some(Self::Opq),
            0x7 => Some(Self::Jxx),
            0x8 => Some(Self::Call),
            0x9 => Some(Self::Ret),
            0xA => Some(Self::Pushq),
            0xB => Some(Self::Popq),
            _ => None,
        }
    }

    /// Returns the encoding nibble for this family.
    #[must_use]
    pub const fn as_nibble(self) -> u8 {
        self as u8
    }

    /// Families whose encoding carries a register-specifier byte.
    #[must_use]
    pub const fn has_register_byte(self) -> bool {
        matches!(
            self,
            Self::Rrmovq
                | Self::Irmovq
                | Self::Rmmovq
                | Self::Mrmovq
                | Self::Opq
                | Self::Pushq
                | Self::Popq
        )
    }

    /// Families whose encoding carries an 8-byte little-endian constant.
    #[must_use]
    pub const fn has_constant(self) -> bool {
        matches!(
            self,
            Self::Irmovq | Self::Rmmovq | Self::Mrmovq | Self::Jxx | Self::Call
        )
    }

    /// Total encoded length in bytes of an instruction in this family.
    #[must_use]
    pub const fn encoded_len(self) -> i64 {
        1 + self.has_register_byte() as i64 + 8 * self.has_constant() as i64
    }
}

/// ALU operations selected by `ifun` within the OPQ family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AluOp {
    Add = 0,
    Sub = 1,
    And = 2,
    Xor = 3,
}

impl AluOp {
    /// Decodes an OPQ `ifun`. `None` for unassigned sub-operations.
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Add),
            1 => Some(Self::Sub),
            2 => Some(Self::And),
            3 => Some(Self::Xor),
            _ => None,
        }
    }

    /// Applies the operation to operands `a` and `b`, computing `b op a`
    /// with wrap-around 64-bit arithmetic.
    #[must_use]
    pub const fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Self::Add => b.wrapping_add(a),
            Self::Sub => b.wrapping_sub(a),
            Self::And => b & a,
            Self::Xor => b ^ a,
        }
    }

    /// Signed-overflow predicate over the operands and the wrapped result.
    /// Logical operations never overflow.
    #[must_use]
    pub const fn overflows(self, a: i64, b: i64, result: i64) -> bool {
        match self {
            Self::Add => (a > 0 && b > 0 && result < 0) || (a < 0 && b < 0 && result >= 0),
            Self::Sub => (b > 0 && a < 0 && result < 0) || (b < 0 && a > 0 && result >= 0),
            Self::And | Self::Xor => false,
        }
    }
}

/// Branch and conditional-move conditions selected by `ifun` within the
/// JXX and RRMOVQ families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Condition {
    Always = 0,
    Le = 1,
    L = 2,
    E = 3,
    Ne = 4,
    Ge = 5,
    G = 6,
}

impl Condition {
    /// Decodes a condition `ifun`. `None` for unassigned conditions, which
    /// evaluate as not-taken.
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Always),
            1 => Some(Self::Le),
            2 => Some(Self::L),
            3 => Some(Self::E),
            4 => Some(Self::Ne),
            5 => Some(Self::Ge),
            6 => Some(Self::G),
            _ => None,
        }
    }

    /// Evaluates the condition against the current condition codes.
    #[must_use]
    pub const fn holds(self, cc: ConditionCodes) -> bool {
        let ConditionCodes { zf, sf, of } = cc;
        match self {
            Self::Always => true,
            Self::Le => (sf != of) || zf,
            Self::L => sf != of,
            Self::E => zf,
            Self::Ne => !zf,
            Self::Ge => sf == of,
            Self::G => sf == of && !zf,
        }
    }
}
