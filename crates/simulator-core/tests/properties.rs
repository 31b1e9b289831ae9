//! Property coverage: memory round-trips, stack discipline, flag
//! preservation, and trace well-formedness over arbitrary images.

use proptest::prelude::*;
use serde_json::Value;
use simulator_core::{Core, Register, RunConfig, Status};

fn load(core: &mut Core, addr: i64, bytes: &[u8]) {
    for (offset, byte) in bytes.iter().enumerate() {
        core.memory.poke(addr + offset as i64, *byte);
    }
}

fn irmovq(value: i64, rb: Register) -> Vec<u8> {
    let mut bytes = vec![0x30, 0xF0 | rb as u8];
    bytes.extend_from_slice(&value.to_le_bytes());
    bytes
}

proptest! {
    /// Writing any value through `rmmovq` and reading it back through
    /// `mrmovq` recovers it exactly, aligned or not.
    #[test]
    fn rmmovq_mrmovq_round_trip(value in any::<i64>(), addr in 0x100_i64..0xFF00) {
        let mut core = Core::new();
        let mut program = irmovq(value, Register::Rax);
        program.extend(irmovq(addr, Register::Rbx));
        program.extend_from_slice(&[0x40, 0x03]); // rmmovq %rax, 0(%rbx)
        program.extend_from_slice(&0_i64.to_le_bytes());
        program.extend_from_slice(&[0x50, 0x13]); // mrmovq 0(%rbx), %rcx
        program.extend_from_slice(&0_i64.to_le_bytes());

        load(&mut core, 0, &program);
        for _ in 0..4 {
            prop_assert_eq!(core.step(), Status::Aok);
        }

        prop_assert_eq!(core.regs.get(Some(Register::Rcx)), value);
    }

    /// `pushq r; popq r'` transfers the value and restores RSP.
    #[test]
    fn push_then_pop_transfers_and_restores_rsp(value in any::<i64>()) {
        let mut core = Core::new();
        let mut program = irmovq(0x1000, Register::Rsp);
        program.extend(irmovq(value, Register::Rdi));
        program.extend_from_slice(&[0xA0, 0x7F]); // pushq %rdi
        program.extend_from_slice(&[0xB0, 0x6F]); // popq %rsi

        load(&mut core, 0, &program);
        for _ in 0..4 {
            prop_assert_eq!(core.step(), Status::Aok);
        }

        prop_assert_eq!(core.regs.get(Some(Register::Rsi)), value);
        prop_assert_eq!(core.regs.get(Some(Register::Rsp)), 0x1000);
    }

    /// Instructions outside the OPQ family never disturb ZF/SF/OF.
    #[test]
    fn non_opq_instructions_preserve_the_flags(value in any::<i64>()) {
        let mut core = Core::new();
        let mut program = irmovq(0x2000, Register::Rsp);
        program.extend(irmovq(value, Register::Rax));
        program.extend_from_slice(&[0x20, 0x03]); // rrmovq %rax, %rbx
        program.extend_from_slice(&[0xA0, 0x0F]); // pushq %rax
        program.extend_from_slice(&[0xB0, 0x2F]); // popq %rdx
        program.extend_from_slice(&[0x10]); // nop

        load(&mut core, 0, &program);
        let initial = core.cc;
        for _ in 0..6 {
            prop_assert_eq!(core.step(), Status::Aok);
            prop_assert_eq!(core.cc, initial);
        }
    }

    /// Arbitrary byte soup never breaks the trace contract: the output is
    /// a valid bracketed sequence whose records all carry 15 registers, a
    /// defined STAT, and only non-zero memory windows.
    #[test]
    fn arbitrary_images_yield_well_formed_traces(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        let mut core = Core::new();
        load(&mut core, 0, &bytes);

        let config = RunConfig { max_steps: Some(64), ..RunConfig::default() };
        let mut out = Vec::new();
        core.run(&mut out, &config).expect("trace writes to a vec");

        let text = String::from_utf8(out).expect("trace is utf-8");
        let parsed: Value = serde_json::from_str(&text).expect("trace is a JSON array");
        let records = parsed.as_array().expect("bracketed sequence");
        prop_assert!(!records.is_empty());

        for record in records {
            let stat = record["STAT"].as_i64().expect("STAT integer");
            prop_assert!((1..=4).contains(&stat));
            prop_assert_eq!(record["REG"].as_object().expect("REG object").len(), 15);
            for value in record["MEM"].as_object().expect("MEM object").values() {
                prop_assert_ne!(value.as_i64(), Some(0));
            }
        }

        // Status is monotonic: only the final record may leave AOK.
        for record in &records[..records.len() - 1] {
            prop_assert_eq!(record["STAT"].as_i64(), Some(1));
        }
    }
}
