/// Condition-code record (ZF/SF/OF).
pub mod condition;
/// Register identifiers and the architectural register file.
pub mod registers;

pub use condition::ConditionCodes;
pub use registers::{Register, RegisterFile, NO_REGISTER, REGISTER_COUNT};
