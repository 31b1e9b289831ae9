//! Six-phase sequential instruction interpreter.
//!
//! Every instruction passes through the same skeleton: Fetch, Decode,
//! Execute, Memory, Write-back, PC-update. A fault in Fetch skips the later
//! phases entirely; a fault in the Memory phase lets Write-back commit its
//! register effects and inhibits only the PC update, so the final trace
//! record always identifies the faulting instruction.

use crate::core::Core;
use crate::isa::{AluOp, Condition, Icode};
use crate::state::Register;
use crate::status::{Fault, Status};

/// Per-instruction pipeline temporaries.
///
/// A fresh zeroed set exists for every step; none of this is architectural
/// state and none of it is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    /// Instruction family from the high nibble of the first byte.
    pub icode: Icode,
    /// Sub-operation from the low nibble of the first byte.
    pub ifun: u8,
    /// First register specifier, `None` when absent or 0xF.
    pub ra: Option<Register>,
    /// Second register specifier, `None` when absent or 0xF.
    pub rb: Option<Register>,
    /// Immediate/displacement/target constant.
    pub val_c: i64,
    /// Address of the next sequential instruction.
    pub val_p: i64,
    /// First operand read in Decode.
    pub val_a: i64,
    /// Second operand read in Decode.
    pub val_b: i64,
    /// ALU output computed in Execute.
    pub val_e: i64,
    /// Memory read result from the Memory phase.
    pub val_m: i64,
    /// Branch/move condition outcome.
    pub cnd: bool,
}

impl Stage {
    /// Creates the zeroed temporaries for one decoded instruction byte.
    #[must_use]
    pub const fn new(icode: Icode, ifun: u8) -> Self {
        Self {
            icode,
            ifun,
            ra: None,
            rb: None,
            val_c: 0,
            val_p: 0,
            val_a: 0,
            val_b: 0,
            val_e: 0,
            val_m: 0,
            cnd: false,
        }
    }
}

/// Runs one instruction through all six phases and returns the resulting
/// status. On a fetch fault the PC is left untouched and no later phase
/// runs.
pub fn step(core: &mut Core) -> Status {
    let mut stage = match fetch(core) {
        Ok(stage) => stage,
        Err(fault) => {
            core.status.latch(fault.status());
            return core.status;
        }
    };

    decode(core, &mut stage);
    execute(core, &mut stage);
    memory_access(core, &mut stage);
    write_back(core, &stage);
    pc_update(core, &stage);
    core.status
}

/// Fetch: reads the instruction byte at PC, splits `icode`/`ifun`, then
/// pulls the register-specifier byte and the 8-byte constant the family
/// calls for, leaving `val_p` at the next sequential instruction.
fn fetch(core: &mut Core) -> Result<Stage, Fault> {
    let byte0 = core.memory.fetch_byte(core.pc)?;
    let icode = Icode::from_nibble(byte0 >> 4).ok_or(Fault::IllegalInstruction)?;

    let mut stage = Stage::new(icode, byte0 & 0x0F);
    stage.val_p = core.pc + 1;

    if icode.has_register_byte() {
        let specifier = core.memory.fetch_byte(stage.val_p)?;
        stage.ra = Register::from_nibble(specifier >> 4);
        stage.rb = Register::from_nibble(specifier & 0x0F);
        stage.val_p += 1;
    }

    if icode.has_constant() {
        stage.val_c = core.memory.fetch_quad(stage.val_p)?;
        stage.val_p += 8;
    }

    Ok(stage)
}

/// Decode: selects the source registers for the family and reads them.
fn decode(core: &Core, stage: &mut Stage) {
    let src_a = match stage.icode {
        Icode::Rrmovq | Icode::Rmmovq | Icode::Opq | Icode::Pushq => stage.ra,
        Icode::Popq | Icode::Ret => Some(Register::Rsp),
        _ => None,
    };
    let src_b = match stage.icode {
        Icode::Opq | Icode::Rmmovq | Icode::Mrmovq => stage.rb,
        Icode::Pushq | Icode::Popq | Icode::Call | Icode::Ret => Some(Register::Rsp),
        _ => None,
    };

    stage.val_a = core.regs.get(src_a);
    stage.val_b = core.regs.get(src_b);
}

/// Execute: computes `val_e`, updates the condition codes for OPQ,
/// evaluates the branch/move condition, and latches HLT for `halt`.
fn execute(core: &mut Core, stage: &mut Stage) {
    match stage.icode {
        Icode::Opq => {
            // An unassigned ifun performs no operation and leaves the
            // condition codes alone.
            if let Some(op) = AluOp::from_nibble(stage.ifun) {
                let (a, b) = (stage.val_a, stage.val_b);
                stage.val_e = op.apply(a, b);
                core.cc.zf = stage.val_e == 0;
                core.cc.sf = stage.val_e < 0;
                core.cc.of = op.overflows(a, b, stage.val_e);
            }
        }
        Icode::Irmovq => stage.val_e = stage.val_c,
        Icode::Rrmovq => stage.val_e = stage.val_a,
        Icode::Rmmovq | Icode::Mrmovq => stage.val_e = stage.val_b.wrapping_add(stage.val_c),
        Icode::Pushq | Icode::Call => stage.val_e = stage.val_b.wrapping_sub(8),
        Icode::Popq | Icode::Ret => stage.val_e = stage.val_b.wrapping_add(8),
        Icode::Halt => core.status.latch(Status::Hlt),
        Icode::Nop | Icode::Jxx => {}
    }

    if matches!(stage.icode, Icode::Jxx | Icode::Rrmovq) {
        stage.cnd = Condition::from_nibble(stage.ifun).is_some_and(|cond| cond.holds(core.cc));
    }
}

/// Memory: performs the one read or write the family calls for. A bounds
/// fault latches ADR, leaves memory unchanged, and delivers 0 to `val_m`.
fn memory_access(core: &mut Core, stage: &mut Stage) {
    let outcome = match stage.icode {
        Icode::Rmmovq | Icode::Pushq => core.memory.write_quad(stage.val_e, stage.val_a),
        Icode::Call => core.memory.write_quad(stage.val_e, stage.val_p),
        Icode::Mrmovq => core.memory.read_quad(stage.val_e).map(|value| {
            stage.val_m = value;
        }),
        Icode::Popq | Icode::Ret => core.memory.read_quad(stage.val_a).map(|value| {
            stage.val_m = value;
        }),
        _ => Ok(()),
    };

    if let Err(fault) = outcome {
        core.status.latch(fault.status());
    }
}

/// Write-back: commits `val_e` to its destination, then `val_m` to its
/// destination. The order matters for `popq %rsp`: the popped memory value
/// lands second and wins.
fn write_back(core: &mut Core, stage: &Stage) {
    let dst_e = match stage.icode {
        Icode::Rrmovq => {
            if stage.cnd {
                stage.rb
            } else {
                None
            }
        }
        Icode::Opq | Icode::Irmovq => stage.rb,
        Icode::Pushq | Icode::Popq | Icode::Call | Icode::Ret => Some(Register::Rsp),
        _ => None,
    };
    core.regs.set(dst_e, stage.val_e);

    let dst_m = match stage.icode {
        Icode::Mrmovq | Icode::Popq => stage.ra,
        _ => None,
    };
    core.regs.set(dst_m, stage.val_m);
}

/// PC-update: advances the PC, inhibited entirely once the status has left
/// AOK so the emitted record points at the faulting (or halting)
/// instruction.
fn pc_update(core: &mut Core, stage: &Stage) {
    if !core.status.is_running() {
        return;
    }

    core.pc = match stage.icode {
        Icode::Call => stage.val_c,
        Icode::Ret => stage.val_m,
        Icode::Jxx => {
            if stage.cnd {
                stage.val_c
            } else {
                stage.val_p
            }
        }
        _ => stage.val_p,
    };
}
