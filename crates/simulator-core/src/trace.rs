//! Per-step trace records and the bracketed JSON stream writer.
//!
//! The output is a single bracketed sequence: a `[` line, one record per
//! line with a leading `,` on every record after the first, and a closing
//! `]` line. All 64-bit values render as signed decimals.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::cache::CacheStats;
use crate::core::Core;
use crate::state::Register;

/// Condition codes as 0/1 integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionRecord {
    /// Overflow flag.
    #[serde(rename = "OF")]
    pub of: u8,
    /// Sign flag.
    #[serde(rename = "SF")]
    pub sf: u8,
    /// Zero flag.
    #[serde(rename = "ZF")]
    pub zf: u8,
}

/// Cache telemetry, present only in verbose mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheRecord {
    /// Byte accesses served from a resident block.
    pub hits: u64,
    /// Byte accesses that required a block fill.
    pub misses: u64,
    /// Total byte accesses.
    pub total: u64,
    /// Hit rate as a percentage.
    pub rate: f64,
}

impl From<CacheStats> for CacheRecord {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            total: stats.total(),
            rate: stats.hit_rate(),
        }
    }
}

/// The fifteen registers by architectural name, in ID order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct RegisterRecord {
    pub rax: i64,
    pub rcx: i64,
    pub rdx: i64,
    pub rbx: i64,
    pub rsp: i64,
    pub rbp: i64,
    pub rsi: i64,
    pub rdi: i64,
    pub r8: i64,
    pub r9: i64,
    pub r10: i64,
    pub r11: i64,
    pub r12: i64,
    pub r13: i64,
    pub r14: i64,
}

/// One emitted record: the full architectural state after one instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    /// PC after PC-update; unchanged when that phase was inhibited.
    #[serde(rename = "PC")]
    pub pc: i64,
    /// Architectural status code (1..=4).
    #[serde(rename = "STAT")]
    pub stat: u8,
    /// Condition codes.
    #[serde(rename = "CC")]
    pub cc: ConditionRecord,
    /// Cache telemetry, verbose mode only. Never alters the core fields.
    #[serde(rename = "CACHE", skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheRecord>,
    /// Register file by name.
    #[serde(rename = "REG")]
    pub reg: RegisterRecord,
    /// Aligned 8-byte windows with a non-zero little-endian signed value,
    /// keyed by decimal address.
    #[serde(rename = "MEM")]
    pub mem: BTreeMap<u64, i64>,
}

impl TraceRecord {
    /// Snapshots the architectural state of `core`.
    #[must_use]
    pub fn capture(core: &Core, verbose: bool) -> Self {
        let get = |reg: Register| core.regs.get(Some(reg));

        Self {
            pc: core.pc,
            stat: core.status.as_code(),
            cc: ConditionRecord {
                of: u8::from(core.cc.of),
                sf: u8::from(core.cc.sf),
                zf: u8::from(core.cc.zf),
            },
            cache: verbose.then(|| CacheRecord::from(core.memory.cache_stats())),
            reg: RegisterRecord {
                rax: get(Register::Rax),
                rcx: get(Register::Rcx),
                rdx: get(Register::Rdx),
                rbx: get(Register::Rbx),
                rsp: get(Register::Rsp),
                rbp: get(Register::Rbp),
                rsi: get(Register::Rsi),
                rdi: get(Register::Rdi),
                r8: get(Register::R8),
                r9: get(Register::R9),
                r10: get(Register::R10),
                r11: get(Register::R11),
                r12: get(Register::R12),
                r13: get(Register::R13),
                r14: get(Register::R14),
            },
            mem: core.memory.nonzero_quads().collect(),
        }
    }
}

/// Streams trace records as one bracketed JSON sequence.
pub struct TraceWriter<W: Write> {
    sink: W,
    verbose: bool,
    first: bool,
}

impl<W: Write> TraceWriter<W> {
    /// Creates a writer over `sink`.
    pub fn new(sink: W, verbose: bool) -> Self {
        Self {
            sink,
            verbose,
            first: true,
        }
    }

    /// Writes the opening bracket line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the sink.
    pub fn open(&mut self) -> io::Result<()> {
        writeln!(self.sink, "[")
    }

    /// Captures and writes one record for the current state of `core`.
    ///
    /// # Errors
    ///
    /// Returns any I/O or serialization error from the sink.
    pub fn record(&mut self, core: &Core) -> io::Result<()> {
        let record = TraceRecord::capture(core, self.verbose);
        if !self.first {
            write!(self.sink, ",")?;
        }
        serde_json::to_writer(&mut self.sink, &record)?;
        writeln!(self.sink)?;
        self.first = false;
        Ok(())
    }

    /// Writes the closing bracket line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the sink.
    pub fn close(mut self) -> io::Result<()> {
        writeln!(self.sink, "]")
    }
}
