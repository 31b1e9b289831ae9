/// Number of architecturally visible general-purpose registers.
pub const REGISTER_COUNT: usize = 15;

/// Nibble value reserved in the encoding for "no register".
pub const NO_REGISTER: u8 = 0xF;

/// Architecturally visible general-purpose register identifier.
///
/// The encoding reserves nibble `0xF` for "no register"; that sentinel is
/// modelled as `Option<Register>` throughout the core rather than as a
/// sixteenth variant, so sentinel reads and writes are total operations on
/// the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    Rax = 0,
    Rcx = 1,
    Rdx = 2,
    Rbx = 3,
    Rsp = 4,
    Rbp = 5,
    Rsi = 6,
    Rdi = 7,
    R8 = 8,
    R9 = 9,
    R10 = 10,
    R11 = 11,
    R12 = 12,
    R13 = 13,
    R14 = 14,
}

impl Register {
    /// Ordered list of all architectural registers, in ID order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::Rax,
        Self::Rcx,
        Self::Rdx,
        Self::Rbx,
        Self::Rsp,
        Self::Rbp,
        Self::Rsi,
        Self::Rdi,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
    ];

    /// Returns the array index for this register (`0..=14`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes a 4-bit register specifier. The reserved `0xF` nibble means
    /// "no register" and decodes to `None`.
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Rax),
            1 => Some(Self::Rcx),
            2 => Some(Self::Rdx),
            3 => Some(Self::Rbx),
            4 => Some(Self::Rsp),
            5 => Some(Self::Rbp),
            6 => Some(Self::Rsi),
            7 => Some(Self::Rdi),
            8 => Some(Self::R8),
            9 => Some(Self::R9),
            10 => Some(Self::R10),
            11 => Some(Self::R11),
            12 => Some(Self::R12),
            13 => Some(Self::R13),
            14 => Some(Self::R14),
            _ => None,
        }
    }

    /// Architectural name of this register, without the `%` sigil.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rax => "rax",
            Self::Rcx => "rcx",
            Self::Rdx => "rdx",
            Self::Rbx => "rbx",
            Self::Rsp => "rsp",
            Self::Rbp => "rbp",
            Self::Rsi => "rsi",
            Self::Rdi => "rdi",
            Self::R8 => "r8",
            Self::R9 => "r9",
            Self::R10 => "r10",
            Self::R11 => "r11",
            Self::R12 => "r12",
            Self::R13 => "r13",
            Self::R14 => "r14",
        }
    }
}

/// Architectural register file: fifteen signed 64-bit registers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterFile {
    regs: [i64; REGISTER_COUNT],
}

impl RegisterFile {
    /// Reads a register. Reading the no-register sentinel yields 0.
    #[must_use]
    pub const fn get(&self, reg: Option<Register>) -> i64 {
        match reg {
            Some(reg) => self.regs[reg.index()],
            None => 0,
        }
    }

    /// Writes a register. Writes to the no-register sentinel are suppressed.
    pub const fn set(&mut self, reg: Option<Register>, value: i64) {
        if let Some(reg) = reg {
            self.regs[reg.index()] = value;
        }
    }
}
