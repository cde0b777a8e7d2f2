//! Cross-module interaction tests
//!
//! Checks that the assembler, disassembler, checker and simulator agree on
//! the same program.

use std::cell::RefCell;
use std::rc::Rc;

use snx_assembler::{assemble, compile, Image};
use snx_disassembler::{decode, disassemble, format, parse_hex};
use snx_runtime::{run, Simulator, SAMPLE_PROGRAM};
use snx_spec::{check_program, Code, Config, IrProgram};

const DOUBLER: &str = r#"
main:   IN  $1
        BAL $2, double
        OUT $1
        HLT
double: ADD $1, $1, $1
        BAL $0, 0($2)
"#;

// ============================================================================
// Assembler -> Disassembler
// ============================================================================

#[test]
fn test_decoded_opcodes_match_ir() {
    let result = compile(SAMPLE_PROGRAM, &Config::DEFAULT);
    let ir = result.ir.as_ref().unwrap();
    let image = assemble(SAMPLE_PROGRAM, &Config::DEFAULT).unwrap();

    assert_eq!(image.len(), ir.len());
    for (inst, word) in ir.instructions.iter().zip(&image.words) {
        assert_eq!(decode(*word).unwrap().opcode(), inst.inst.opcode());
    }
}

#[test]
fn test_sample_listing_has_no_unknown_words() {
    let image = assemble(SAMPLE_PROGRAM, &Config::DEFAULT).unwrap();
    let listing = disassemble(&image.words);
    assert!(!listing.contains(".word"));
    assert_eq!(listing.lines().count(), image.len() + 1);
}

#[test]
fn test_hex_and_binary_images_agree() {
    let image = assemble(DOUBLER, &Config::DEFAULT).unwrap();

    let from_hex = parse_hex(&image.to_hex(4)).unwrap();
    let from_bin = Image::from_bytes(&image.to_bytes()).unwrap();
    assert_eq!(from_hex, image.words);
    assert_eq!(from_bin, image);
    assert_eq!(Image::new(from_hex).digest(), image.digest());
}

#[test]
fn test_address_form_text_matches_source() {
    let result = compile(DOUBLER, &Config::DEFAULT);
    let ir = result.ir.as_ref().unwrap();
    let image = assemble(DOUBLER, &Config::DEFAULT).unwrap();

    // ADD and the address-form return print back exactly as lowered
    for pc in [0usize, 2, 3, 4, 5] {
        let text = format(&decode(image.words[pc]).unwrap());
        assert_eq!(text, ir.instructions[pc].inst.to_string());
    }
}

// ============================================================================
// Assembler -> Checker
// ============================================================================

#[test]
fn test_compile_and_check_program_agree() {
    let source = "main: LD $1, 300($0)\n OUT $1\n HLT\n HLT";
    let config = Config::new(4, 256).unwrap();
    let result = compile(source, &config);
    let ir = result.ir.as_ref().unwrap();

    let checked = check_program(ir, &config);
    let from_compile: Vec<Code> = result.diagnostics.iter().map(|d| d.code).collect();
    let from_check: Vec<Code> = checked.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(from_compile, from_check);
    assert!(from_check.contains(&Code::M001));
    assert!(from_check.contains(&Code::W001));
}

// ============================================================================
// Assembler -> Runtime
// ============================================================================

#[test]
fn test_persisted_program_runs_the_same() {
    let result = compile(DOUBLER, &Config::DEFAULT);
    let ir = result.runnable().unwrap().clone();

    let bytes = ir.to_bytes().unwrap();
    let restored = IrProgram::from_bytes(&bytes).unwrap();
    assert_eq!(restored, ir);

    let direct = run(ir, Config::DEFAULT, vec![21]).unwrap();
    let reloaded = run(restored, Config::DEFAULT, vec![21]).unwrap();
    assert_eq!(direct, vec![42]);
    assert_eq!(direct, reloaded);
}

#[test]
fn test_trace_texts_follow_ir() {
    let result = compile(DOUBLER, &Config::DEFAULT);
    let ir = result.ir.clone().unwrap();

    let steps = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&steps);
    let mut sim = Simulator::from_compile_result(&result)
        .unwrap()
        .with_inputs([5])
        .with_trace_hook(move |event| {
            seen.borrow_mut()
                .push((event.pc, event.next_pc, event.text.to_string()));
            Ok(())
        });
    sim.run().unwrap();

    let steps = steps.borrow();
    let pcs: Vec<u32> = steps.iter().map(|(pc, _, _)| *pc).collect();
    assert_eq!(pcs, vec![0, 1, 4, 5, 2, 3]);
    for (pc, next, text) in steps.iter() {
        assert_eq!(text, &ir.instructions[*pc as usize].text);
        assert!(*next < ir.len() as u32);
    }
    assert_eq!(sim.outputs(), &[10]);
}

#[test]
fn test_register_count_flows_through_every_stage() {
    let config = Config::new(8, 1024).unwrap();
    let source = "main: LDA $7, 9($0)\n OUT $7\n HLT";

    let result = compile(source, &config);
    assert!(!result.has_errors());

    let mut sim = Simulator::from_compile_result(&result).unwrap();
    sim.run().unwrap();
    assert_eq!(sim.registers().len(), 8);
    assert_eq!(sim.outputs(), &[9]);
    assert_eq!(sim.memory().size(), 1024);

    // $7 does not fit the 2-bit field and carries into the opcode
    let image = assemble(source, &config).unwrap();
    assert_eq!(image.words[0], 0xBC09);
    assert!(decode(image.words[0]).is_err());
}
