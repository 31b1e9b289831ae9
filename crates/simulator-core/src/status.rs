//! Architectural status codes and the fault taxonomy that feeds them.

use thiserror::Error;

/// Architectural status code held in `STAT`.
///
/// A run starts in [`Status::Aok`] and leaves it exactly once: status
/// transitions are monotonic, enforced by [`Status::latch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Status {
    /// Normal operation; the last instruction completed.
    #[default]
    Aok = 1,
    /// A `halt` instruction was executed.
    Hlt = 2,
    /// An instruction fetch or data access addressed bytes outside memory.
    Adr = 3,
    /// The fetched instruction byte carried an invalid `icode`.
    Ins = 4,
}

impl Status {
    /// Converts the status to its stable architectural code.
    #[must_use]
    pub const fn as_code(self) -> u8 {
        self as u8
    }

    /// Converts a stable architectural code back into a status.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Aok),
            2 => Some(Self::Hlt),
            3 => Some(Self::Adr),
            4 => Some(Self::Ins),
            _ => None,
        }
    }

    /// Returns true while the core may execute another instruction.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Aok)
    }

    /// Latches a non-`Aok` status. Once the status has left `Aok` it never
    /// changes again, so the earliest-detected condition wins.
    pub const fn latch(&mut self, next: Self) {
        if self.is_running() {
            *self = next;
        }
    }
}

/// Faults surfaced by fetch and memory access. These are carried through
/// `Result` seams inside the core and latched into [`Status`]; they are
/// never propagated out of the run loop as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// An 8-byte or single-byte access fell outside `[0, 0x10000)`.
    #[error("memory address out of range")]
    AddressOutOfRange,
    /// The high nibble of the instruction byte is not an assigned `icode`.
    #[error("illegal instruction encoding")]
    IllegalInstruction,
}

impl Fault {
    /// Maps the fault onto the architectural status it latches.
    #[must_use]
    pub const fn status(self) -> Status {
        match self {
            Self::AddressOutOfRange => Status::Adr,
            Self::IllegalInstruction => Status::Ins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Fault, Status};

    #[test]
    fn status_default_is_aok() {
        assert_eq!(Status::default(), Status::Aok);
        assert!(Status::Aok.is_running());
    }

    #[test]
    fn stable_code_roundtrip_is_bijective_for_defined_values() {
        for code in 1_u8..=4 {
            let status = Status::from_code(code).expect("defined status code");
            assert_eq!(status.as_code(), code);
        }
        assert!(Status::from_code(0).is_none());
        assert!(Status::from_code(5).is_none());
    }

    #[test]
    fn latch_is_monotonic_within_a_run() {
        let mut status = Status::Aok;
        status.latch(Status::Adr);
        assert_eq!(status, Status::Adr);

        status.latch(Status::Hlt);
        assert_eq!(status, Status::Adr);

        status.latch(Status::Aok);
        assert_eq!(status, Status::Adr);
    }

    #[test]
    fn faults_map_to_their_architectural_status() {
        assert_eq!(Fault::AddressOutOfRange.status(), Status::Adr);
        assert_eq!(Fault::IllegalInstruction.status(), Status::Ins);
    }
}
