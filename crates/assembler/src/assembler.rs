//! Assembly driver: single forward pass with backpatched label references.
//!
//! Labels may be used before they are defined; every label reference emits
//! a placeholder quad that is patched once the whole source has been read.

use std::collections::HashMap;
use std::fmt::Write as _;

use simulator_core::{Icode, Register, NO_REGISTER};

use crate::encoder::ObjectImage;
use crate::errors::{AssembleError, AssembleErrorKind};
use crate::mnemonic::{resolve_mnemonic, resolve_register};

/// A statement that emitted bytes, kept for listing rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSpan {
    /// Absolute address of the first emitted byte.
    pub address: usize,
    /// Number of bytes emitted.
    pub length: usize,
    /// The source line as written.
    pub source: String,
}

/// A finished assembly: bytes, symbol table, and per-statement spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    bytes: Vec<u8>,
    labels: HashMap<String, i64>,
    statements: Vec<StatementSpan>,
}

impl Assembly {
    /// Assembled bytes, indexed by address from 0.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Looks up a label's address.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<i64> {
        self.labels.get(name).copied()
    }

    /// Renders the hexadecimal image text consumed by the simulator
    /// loader: one `0xADDR: BYTES | source` line per emitting statement.
    #[must_use]
    pub fn render_image(&self) -> String {
        let mut out = String::new();
        for span in &self.statements {
            let mut hex = String::with_capacity(span.length * 2);
            for byte in &self.bytes[span.address..span.address + span.length] {
                let _ = write!(hex, "{byte:02x}");
            }
            let _ = writeln!(out, "0x{:03x}: {:<20} | {}", span.address, hex, span.source);
        }
        out
    }
}

/// Assembles Y86-64 source text.
///
/// # Errors
///
/// Returns the first [`AssembleError`] encountered, tagged with its source
/// line.
pub fn assemble(source: &str) -> Result<Assembly, AssembleError> {
    let mut assembler = Assembler::default();
    for (index, raw) in source.lines().enumerate() {
        assembler
            .statement(raw)
            .map_err(|kind| AssembleError::new(index + 1, kind))?;
    }
    assembler.resolve()
}

#[derive(Debug, Clone)]
struct PendingRef {
    address: usize,
    label: String,
    line: usize,
}

#[derive(Debug, Default)]
struct Assembler {
    image: ObjectImage,
    labels: HashMap<String, i64>,
    pending: Vec<PendingRef>,
    statements: Vec<StatementSpan>,
    line: usize,
}

impl Assembler {
    fn statement(&mut self, raw: &str) -> Result<(), AssembleErrorKind> {
        self.line += 1;

        let mut text = raw;
        if let Some(hash) = text.find('#') {
            text = &text[..hash];
        }
        if let Some(slashes) = text.find("//") {
            text = &text[..slashes];
        }
        let mut text = text.trim();

        if let Some((label, rest)) = text.split_once(':') {
            let label = label.trim();
            if !label.is_empty() {
                self.labels
                    .insert(label.to_string(), self.image.cursor() as i64);
            }
            text = rest.trim();
        }

        if text.is_empty() {
            return Ok(());
        }

        let (mnemonic, operands) = match text.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (text, ""),
        };
        let mnemonic = mnemonic.to_lowercase();

        let start = self.image.cursor();
        match mnemonic.as_str() {
            ".pos" => {
                let addr = parse_literal(operands)?;
                if addr < 0 {
                    return Err(AssembleErrorKind::InvalidPosition(addr));
                }
                self.image.set_cursor(addr as usize);
                return Ok(());
            }
            ".align" => {
                let boundary = parse_literal(operands)?;
                if boundary <= 0 {
                    return Err(AssembleErrorKind::InvalidAlignment(boundary));
                }
                while self.image.cursor() % boundary as usize != 0 {
                    self.image.emit_byte(0);
                }
            }
            ".quad" => self.emit_value_or_label(operands)?,
            _ => self.instruction(&mnemonic, operands)?,
        }

        let end = self.image.cursor();
        if end > start {
            self.statements.push(StatementSpan {
                address: start,
                length: end - start,
                source: raw.trim().to_string(),
            });
        }
        Ok(())
    }

    fn instruction(&mut self, mnemonic: &str, operands: &str) -> Result<(), AssembleErrorKind> {
        let Some((icode, ifun)) = resolve_mnemonic(mnemonic) else {
            return Err(AssembleErrorKind::UnknownMnemonic(mnemonic.to_string()));
        };
        self.image.emit_byte((icode.as_nibble() << 4) | ifun);

        match icode {
            Icode::Halt | Icode::Nop | Icode::Ret => {}
            Icode::Rrmovq | Icode::Opq => {
                let [ra, rb] = two_operands(mnemonic, operands)?;
                let ra = register(ra)?;
                let rb = register(rb)?;
                self.image.emit_byte(register_pair(ra as u8, rb as u8));
            }
            Icode::Irmovq => {
                let [value, rb] = two_operands(mnemonic, operands)?;
                let rb = register(rb)?;
                self.image.emit_byte(register_pair(NO_REGISTER, rb as u8));
                self.emit_value_or_label(value)?;
            }
            Icode::Rmmovq => {
                let [ra, mem] = two_operands(mnemonic, operands)?;
                let ra = register(ra)?;
                let (displacement, rb) = memory_operand(mem)?;
                self.image.emit_byte(register_pair(ra as u8, rb as u8));
                self.image.emit_quad(displacement);
            }
            Icode::Mrmovq => {
                let [mem, ra] = two_operands(mnemonic, operands)?;
                let (displacement, rb) = memory_operand(mem)?;
                let ra = register(ra)?;
                self.image.emit_byte(register_pair(ra as u8, rb as u8));
                self.image.emit_quad(displacement);
            }
            Icode::Jxx | Icode::Call => {
                if operands.is_empty() {
                    return Err(AssembleErrorKind::OperandCount {
                        mnemonic: mnemonic.to_string(),
                        expected: 1,
                    });
                }
                self.emit_value_or_label(operands)?;
            }
            Icode::Pushq | Icode::Popq => {
                let ra = register(operands)?;
                self.image.emit_byte(register_pair(ra as u8, NO_REGISTER));
            }
        }
        Ok(())
    }

    /// Emits an 8-byte value that is either a literal or a label
    /// reference; label references are patched after the full pass.
    fn emit_value_or_label(&mut self, operand: &str) -> Result<(), AssembleErrorKind> {
        let body = operand.trim().trim_start_matches('$').trim();
        let is_label = body
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');

        if is_label {
            self.pending.push(PendingRef {
                address: self.image.cursor(),
                label: body.to_string(),
                line: self.line,
            });
            self.image.emit_quad(0);
            return Ok(());
        }

        self.image.emit_quad(parse_literal(operand)?);
        Ok(())
    }

    fn resolve(mut self) -> Result<Assembly, AssembleError> {
        for reference in &self.pending {
            let Some(addr) = self.labels.get(&reference.label).copied() else {
                return Err(AssembleError::new(
                    reference.line,
                    AssembleErrorKind::UndefinedLabel(reference.label.clone()),
                ));
            };
            self.image.patch_quad(reference.address, addr);
        }

        Ok(Assembly {
            bytes: self.image.into_bytes(),
            labels: self.labels,
            statements: self.statements,
        })
    }
}

const fn register_pair(high: u8, low: u8) -> u8 {
    (high << 4) | low
}

fn two_operands<'a>(mnemonic: &str, operands: &'a str) -> Result<[&'a str; 2], AssembleErrorKind> {
    let mut parts = operands.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) if !first.is_empty() && !second.is_empty() => {
            Ok([first, second])
        }
        _ => Err(AssembleErrorKind::OperandCount {
            mnemonic: mnemonic.to_string(),
            expected: 2,
        }),
    }
}

fn register(text: &str) -> Result<Register, AssembleErrorKind> {
    resolve_register(text.trim())
        .ok_or_else(|| AssembleErrorKind::InvalidRegister(text.trim().to_string()))
}

/// Parses `D(%reg)` or `(%reg)` into a displacement and base register.
fn memory_operand(text: &str) -> Result<(i64, Register), AssembleErrorKind> {
    let text = text.trim();
    let invalid = || AssembleErrorKind::InvalidMemoryOperand(text.to_string());

    let open = text.find('(').ok_or_else(invalid)?;
    if !text.ends_with(')') {
        return Err(invalid());
    }

    let displacement_text = text[..open].trim();
    let displacement = if displacement_text.is_empty() {
        0
    } else {
        parse_literal(displacement_text)?
    };

    let base = register(&text[open + 1..text.len() - 1])?;
    Ok((displacement, base))
}

/// Parses a decimal or hexadecimal literal, with an optional `$` prefix
/// and sign. Hexadecimal digits fill the full 64-bit two's-complement
/// range, so `$0x8000000000000000` is `i64::MIN`.
fn parse_literal(text: &str) -> Result<i64, AssembleErrorKind> {
    let body = text.trim().trim_start_matches('$').trim();
    let (negative, digits) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };

    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16)
    } else {
        digits.parse::<u64>()
    }
    .map_err(|_| AssembleErrorKind::InvalidLiteral(text.trim().to_string()))?;

    let value = magnitude as i64;
    Ok(if negative { value.wrapping_neg() } else { value })
}
