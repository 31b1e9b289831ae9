//! Host-visible simulator state and the sequential run loop.

use std::io::{self, Write};

use crate::loader;
use crate::memory::{Memory, MEMORY_BYTES};
use crate::pipeline;
use crate::state::{ConditionCodes, RegisterFile};
use crate::status::Status;
use crate::trace::TraceWriter;

/// Run-loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Adds the `CACHE` statistics sub-object to every trace record. Must
    /// not change the five core record fields.
    pub verbose: bool,
    /// Stops the loop after this many emitted records. `None` runs to
    /// completion; the default, so conformance traces are unaffected.
    pub max_steps: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_steps: None,
        }
    }
}

/// Complete architectural state of one simulation run.
#[derive(Debug, Clone, Default)]
pub struct Core {
    /// Program counter.
    pub pc: i64,
    /// General-purpose register file.
    pub regs: RegisterFile,
    /// Condition codes.
    pub cc: ConditionCodes,
    /// Architectural status.
    pub status: Status,
    /// Flat 64 KiB memory.
    pub memory: Memory,
}

impl Core {
    /// Creates a powered-on core: PC 0, zeroed registers, ZF set, AOK.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a textual program image into memory. Runs before the loop
    /// starts and never faults.
    pub fn load_image(&mut self, text: &str) {
        loader::load_image(&mut self.memory, text);
    }

    /// Executes a single instruction and returns the resulting status.
    pub fn step(&mut self) -> Status {
        pipeline::step(self)
    }

    /// Runs until the status leaves AOK or the PC escapes memory, writing
    /// one trace record per instruction to `sink`.
    ///
    /// The record is emitted after PC-update, so on normal steps the
    /// recorded PC already addresses the next instruction; on a fault or
    /// `halt` the PC is frozen at the offending instruction.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while writing the trace stream.
    pub fn run<W: Write>(&mut self, sink: W, config: &RunConfig) -> io::Result<()> {
        let mut trace = TraceWriter::new(sink, config.verbose);
        trace.open()?;

        let mut emitted: u64 = 0;
        while self.status.is_running() {
            let status = self.step();
            trace.record(self)?;
            emitted += 1;

            if !status.is_running() {
                break;
            }
            if self.pc < 0 || self.pc >= MEMORY_BYTES as i64 {
                break;
            }
            if config.max_steps.is_some_and(|limit| emitted >= limit) {
                break;
            }
        }

        trace.close()
    }
}
