//! Sequential Y86-64 architectural core.
//!
//! The crate simulates the Y86-64 ISA one instruction at a time: a loader
//! fills the 64 KiB byte memory from a textual program image, the
//! six-phase interpreter executes until the status leaves AOK or the PC
//! escapes memory, and the trace emitter streams the full architectural
//! state after every instruction as a bracketed JSON sequence.

/// Transparent direct-mapped data cache with hit/miss telemetry.
pub mod cache;
pub use cache::{CacheStats, DirectMappedCache, BLOCK_SIZE, CACHE_SETS};

/// Host-visible simulator state and the sequential run loop.
pub mod core;
pub use crate::core::{Core, RunConfig};

/// Instruction encoding tables: icode/ifun, ALU operations, conditions.
pub mod isa;
pub use isa::{AluOp, Condition, Icode};

/// Program-image loader for the hexadecimal text format.
pub mod loader;
pub use loader::load_image;

/// Byte-addressable memory with little-endian quad-word access.
pub mod memory;
pub use memory::{Memory, MEMORY_BYTES};

/// Six-phase sequential instruction interpreter.
pub mod pipeline;
pub use pipeline::{step, Stage};

/// Architectural register file and condition codes.
pub mod state;
pub use state::{ConditionCodes, Register, RegisterFile, NO_REGISTER, REGISTER_COUNT};

/// Architectural status codes and fault taxonomy.
pub mod status;
pub use status::{Fault, Status};

/// Per-step trace records and the bracketed JSON stream writer.
pub mod trace;
pub use trace::{TraceRecord, TraceWriter};
