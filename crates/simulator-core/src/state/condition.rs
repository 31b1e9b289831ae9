/// Condition codes set by the arithmetic-logic instructions.
///
/// `ZF` starts true at power-on; a fresh machine looks like one that just
/// computed zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConditionCodes {
    /// Zero flag: the last ALU result was 0.
    pub zf: bool,
    /// Sign flag: the last ALU result was negative.
    pub sf: bool,
    /// Overflow flag: the last ALU operation overflowed signed 64-bit range.
    pub of: bool,
}

impl Default for ConditionCodes {
    fn default() -> Self {
        Self {
            zf: true,
            sf: false,
            of: false,
        }
    }
}
