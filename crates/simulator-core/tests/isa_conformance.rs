//! End-to-end conformance scenarios driven through the textual image
//! format, the run loop, and the emitted JSON trace.

use serde_json::Value;
use simulator_core::{Core, RunConfig};

/// Runs an image to completion and returns the parsed trace records.
fn run_trace(image: &str, config: &RunConfig) -> (Core, Vec<Value>) {
    let mut core = Core::new();
    core.load_image(image);

    let mut out = Vec::new();
    core.run(&mut out, config).expect("trace writes to a vec");

    let text = String::from_utf8(out).expect("trace is utf-8");
    let parsed: Value = serde_json::from_str(&text).expect("trace is a JSON array");
    let records = parsed.as_array().expect("bracketed sequence").clone();
    (core, records)
}

fn run(image: &str) -> (Core, Vec<Value>) {
    run_trace(image, &RunConfig::default())
}

#[test]
fn add_program_traces_through_nops_to_halt() {
    let image = "\
0x000: 30f20a00000000000000 |
0x00a: 30f00300000000000000 |
0x014: 10
0x015: 10
0x016: 10
0x017: 6020
0x019: 00
";
    let (core, records) = run(image);
    assert_eq!(records.len(), 7);

    let first = &records[0];
    assert_eq!(first["PC"], 10);
    assert_eq!(first["STAT"], 1);
    assert_eq!(first["REG"]["rdx"], 10);
    assert_eq!(first["REG"]["rax"], 0);
    assert_eq!(first["CC"]["ZF"], 1);

    // The loaded program bytes themselves show up as nonzero memory words.
    let expected_word0 = i64::from_le_bytes([0x30, 0xF2, 0x0A, 0, 0, 0, 0, 0]);
    assert_eq!(first["MEM"]["0"], expected_word0);

    let after_nops = &records[4];
    assert_eq!(after_nops["PC"], 0x17);
    assert_eq!(after_nops["REG"]["rax"], 3);
    assert_eq!(after_nops["REG"]["rdx"], 10);

    let after_addq = &records[5];
    assert_eq!(after_addq["PC"], 0x19);
    assert_eq!(after_addq["REG"]["rax"], 13);
    assert_eq!(after_addq["CC"]["ZF"], 0);
    assert_eq!(after_addq["CC"]["SF"], 0);
    assert_eq!(after_addq["CC"]["OF"], 0);

    let last = &records[6];
    assert_eq!(last["STAT"], 2);
    assert_eq!(last["PC"], 0x19);
    assert_eq!(core.pc, 0x19);
}

#[test]
fn subq_of_a_register_with_itself_sets_zf() {
    let image = "\
0x000: 30f00500000000000000
0x00a: 6100
0x00c: 00
";
    let (_, records) = run(image);
    let last = records.last().expect("at least one record");

    assert_eq!(last["STAT"], 2);
    assert_eq!(last["REG"]["rax"], 0);
    assert_eq!(last["CC"]["ZF"], 1);
    assert_eq!(last["CC"]["SF"], 0);
    assert_eq!(last["CC"]["OF"], 0);
}

#[test]
fn subtraction_at_the_signed_boundary() {
    // rax := INT64_MIN; rbx := -1; subq %rbx,%rax -> rax = INT64_MIN + 1.
    // The signed-sign-pattern predicate reports no overflow here; the
    // genuinely wrapping case is covered below.
    let image = "\
0x000: 30f00000000000000080
0x00a: 30f3ffffffffffffffff
0x014: 6130
0x016: 00
";
    let (_, records) = run(image);
    let last = records.last().expect("at least one record");

    assert_eq!(last["REG"]["rax"], i64::MIN + 1);
    assert_eq!(last["CC"]["ZF"], 0);
    assert_eq!(last["CC"]["SF"], 1);
    assert_eq!(last["CC"]["OF"], 0);
}

#[test]
fn subtraction_that_wraps_sets_of() {
    // rax := INT64_MIN; rbx := 1; subq %rbx,%rax wraps to INT64_MAX.
    let image = "\
0x000: 30f00000000000000080
0x00a: 30f30100000000000000
0x014: 6130
0x016: 00
";
    let (_, records) = run(image);
    let last = records.last().expect("at least one record");

    assert_eq!(last["REG"]["rax"], i64::MAX);
    assert_eq!(last["CC"]["ZF"], 0);
    assert_eq!(last["CC"]["SF"], 0);
    assert_eq!(last["CC"]["OF"], 1);
}

#[test]
fn conditional_move_taken_on_greater() {
    // rax := 1; rbx := 2; subq %rax,%rbx leaves 1 (g holds); cmovg moves.
    let image = "\
0x000: 30f00100000000000000
0x00a: 30f30200000000000000
0x014: 6103
0x016: 2601
0x018: 00
";
    let (_, records) = run(image);
    let last = records.last().expect("at least one record");

    assert_eq!(last["REG"]["rcx"], 1);
    assert_eq!(last["REG"]["rbx"], 1);
    assert_eq!(last["STAT"], 2);
}

#[test]
fn call_pushes_the_return_address_and_ret_consumes_it() {
    let image = "\
0x000: 30f40001000000000000 | irmovq $0x100,%rsp
0x00a: 802000000000000000   | call 0x20
0x013: 00                   | halt
0x020: 90                   | ret
";
    let (_, records) = run(image);
    assert_eq!(records.len(), 4);

    let after_call = &records[1];
    assert_eq!(after_call["PC"], 0x20);
    assert_eq!(after_call["REG"]["rsp"], 0xF8);
    assert_eq!(after_call["MEM"]["248"], 0x13);

    let after_ret = &records[2];
    assert_eq!(after_ret["PC"], 0x13);
    assert_eq!(after_ret["REG"]["rsp"], 0x100);

    let last = &records[3];
    assert_eq!(last["STAT"], 2);
    assert_eq!(last["PC"], 0x13);
}

#[test]
fn memory_fault_freezes_pc_and_suppresses_the_halt() {
    let image = "\
0x000: 30f00000010000000000 | irmovq $0x10000,%rax
0x00a: 50300000000000000000 | mrmovq 0(%rax),%rbx
0x014: 00                   | halt
";
    let (core, records) = run(image);

    assert_eq!(records.len(), 2, "the halt never executes");
    let last = records.last().expect("two records");
    assert_eq!(last["STAT"], 3);
    assert_eq!(last["PC"], 10);
    assert_eq!(last["REG"]["rbx"], 0);
    assert_eq!(core.pc, 10);
}

#[test]
fn every_record_has_fifteen_registers_and_no_zero_memory_windows() {
    let image = "\
0x000: 30f20a00000000000000
0x00a: 30f00300000000000000
0x014: 6020
0x016: 00
";
    let (_, records) = run(image);

    for record in &records {
        let reg = record["REG"].as_object().expect("REG object");
        assert_eq!(reg.len(), 15);
        for name in [
            "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11",
            "r12", "r13", "r14",
        ] {
            assert!(reg.contains_key(name));
        }

        let stat = record["STAT"].as_i64().expect("STAT integer");
        assert!((1..=4).contains(&stat));

        for value in record["MEM"].as_object().expect("MEM object").values() {
            assert_ne!(value.as_i64(), Some(0));
        }
    }
}

#[test]
fn fetching_an_illegal_icode_reports_ins_at_the_faulting_address() {
    let image = "0x000: 10\n0x001: c0\n";
    let (core, records) = run(image);

    assert_eq!(records.len(), 2);
    let last = records.last().expect("two records");
    assert_eq!(last["STAT"], 4);
    assert_eq!(last["PC"], 1);
    assert_eq!(core.pc, 1);
}

#[test]
fn verbose_mode_adds_cache_statistics_without_changing_core_fields() {
    let image = "\
0x000: 30f40001000000000000
0x00a: a04f
0x00c: b00f
0x00e: 00
";
    let (_, quiet) = run(image);
    let (_, verbose) = run_trace(
        image,
        &RunConfig {
            verbose: true,
            ..RunConfig::default()
        },
    );

    assert_eq!(quiet.len(), verbose.len());
    for (plain, extended) in quiet.iter().zip(&verbose) {
        for field in ["PC", "STAT", "CC", "REG", "MEM"] {
            assert_eq!(plain[field], extended[field], "core field {field}");
        }
        assert!(plain.get("CACHE").is_none());

        let cache = extended["CACHE"].as_object().expect("CACHE object");
        let hits = cache["hits"].as_u64().expect("hits");
        let misses = cache["misses"].as_u64().expect("misses");
        assert_eq!(cache["total"].as_u64(), Some(hits + misses));
    }

    // The push and the pop each touch 8 bytes of the same block.
    let last_cache = verbose.last().expect("records")["CACHE"]
        .as_object()
        .expect("CACHE object");
    assert_eq!(last_cache["total"].as_u64(), Some(16));
}
