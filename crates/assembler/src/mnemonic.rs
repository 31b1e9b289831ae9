//! Mnemonic resolution against the core encoding tables.

use simulator_core::{Icode, Register};

/// Single source-of-truth mnemonic table: name, instruction family, `ifun`.
///
/// Any name not present here is not a Y86-64 instruction.
pub const MNEMONIC_TABLE: &[(&str, Icode, u8)] = &[
    ("halt", Icode::Halt, 0),
    ("nop", Icode::Nop, 0),
    ("rrmovq", Icode::Rrmovq, 0),
    ("cmovle", Icode::Rrmovq, 1),
    ("cmovl", Icode::Rrmovq, 2),
    ("cmove", Icode::Rrmovq, 3),
    ("cmovne", Icode::Rrmovq, 4),
    ("cmovge", Icode::Rrmovq, 5),
    ("cmovg", Icode::Rrmovq, 6),
    ("irmovq", Icode::Irmovq, 0),
    ("rmmovq", Icode::Rmmovq, 0),
    ("mrmovq", Icode::Mrmovq, 0),
    ("addq", Icode::Opq, 0),
    ("subq", Icode::Opq, 1),
    ("andq", Icode::Opq, 2),
    ("xorq", Icode::Opq, 3),
    ("jmp", Icode::Jxx, 0),
    ("jle", Icode::Jxx, 1),
    ("jl", Icode::Jxx, 2),
    ("je", Icode::Jxx, 3),
    ("jne", Icode::Jxx, 4),
    ("jge", Icode::Jxx, 5),
    ("jg", Icode::Jxx, 6),
    ("call", Icode::Call, 0),
    ("ret", Icode::Ret, 0),
    ("pushq", Icode::Pushq, 0),
    ("popq", Icode::Popq, 0),
];

/// Resolves a lowercase mnemonic into its `(icode, ifun)` pair.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<(Icode, u8)> {
    MNEMONIC_TABLE
        .iter()
        .find_map(|(entry, icode, ifun)| (*entry == name).then_some((*icode, *ifun)))
}

/// Resolves a `%`-prefixed register name.
#[must_use]
pub fn resolve_register(name: &str) -> Option<Register> {
    let bare = name.strip_prefix('%')?;
    Register::ALL.iter().copied().find(|reg| reg.name() == bare)
}
