//! Y86-64 assembler library.
//!
//! Translates symbolic Y86-64 source (mnemonics, labels, and the `.pos`,
//! `.align`, `.quad` directives) into the hexadecimal program-image text
//! consumed by the simulator loader.

/// Assembly driver with backpatched label resolution.
pub mod assembler;
/// Address-indexed object-code buffer.
pub mod encoder;
/// Structured assembly error types.
pub mod errors;
/// Mnemonic and register-name resolution.
pub mod mnemonic;

pub use assembler::{assemble, Assembly, StatementSpan};
pub use encoder::ObjectImage;
pub use errors::{AssembleError, AssembleErrorKind};
pub use mnemonic::{resolve_mnemonic, resolve_register, MNEMONIC_TABLE};
