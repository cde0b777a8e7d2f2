//! Stress tests for SN/X
//!
//! Large programs, long-running loops and step budgets.

use snx_assembler::{assemble, compile};
use snx_runtime::Simulator;
use snx_spec::{Code, Config};

fn simulator(source: &str) -> Simulator {
    let result = compile(source, &Config::DEFAULT);
    Simulator::from_compile_result(&result)
        .unwrap_or_else(|e| panic!("{}\n{}", e, result.format_diagnostics("<stress>")))
}

#[test]
fn test_long_straight_line_program() {
    let mut source = String::from("main: LDA $1, 0($0)\n");
    for _ in 0..2000 {
        source.push_str(" LDA $1, 1($1)\n");
    }
    source.push_str(" OUT $1\n HLT\n");

    let image = assemble(&source, &Config::DEFAULT).unwrap();
    assert_eq!(image.len(), 2003);

    let mut sim = simulator(&source);
    let outcome = sim.run().unwrap();
    assert_eq!(outcome.steps, 2003);
    assert_eq!(sim.outputs(), &[2000]);
}

#[test]
fn test_counter_wraps_at_sixteen_bits() {
    // 0xFFFF + 1 wraps to 0 and ends the loop
    let source = r#"
main:   LDA $1, -16($0)
        LDA $2, 0($0)
loop:   BZ  $1, done
        LDA $1, 1($1)
        LDA $2, 1($2)
        BZ  $0, loop
done:   OUT $2
        HLT
    "#;
    let mut sim = simulator(source);
    sim.run().unwrap();
    assert_eq!(sim.outputs(), &[16]);
}

#[test]
fn test_nested_loops() {
    let source = r#"
main:   LDA $1, 100($0)
        LDA $3, 0($0)
outer:  BZ  $1, done
        LDA $2, 100($0)
inner:  BZ  $2, next
        LDA $3, 1($3)
        LDA $2, -1($2)
        BZ  $0, inner
next:   LDA $1, -1($1)
        BZ  $0, outer
done:   OUT $3
        HLT
    "#;
    let mut sim = simulator(source);
    let outcome = sim.run().unwrap();
    assert_eq!(sim.outputs(), &[10000]);
    assert!(outcome.steps > 40_000);
}

#[test]
fn test_step_budget_on_endless_loop() {
    let source = "main: BZ $0, main\n HLT";
    let mut sim = simulator(source);

    let outcome = sim.run_for(10_000).unwrap();
    assert!(!outcome.halted);
    assert_eq!(outcome.steps, 10_000);
    assert_eq!(sim.pc(), 0);

    // budgets are relative to where the previous call stopped
    let outcome = sim.run_for(5).unwrap();
    assert_eq!(outcome.steps, 5);
    assert_eq!(sim.steps(), 10_005);
}

#[test]
fn test_fill_and_sum_memory() {
    let source = r#"
main:   LDA $1, 100($0)     ; count and address
fill:   BZ  $1, sum
        ST  $1, 0($1)
        LDA $1, -1($1)
        BZ  $0, fill
sum:    LDA $1, 100($0)
        LDA $2, 0($0)
add:    BZ  $1, done
        LD  $3, 0($1)
        ADD $2, $2, $3
        LDA $1, -1($1)
        BZ  $0, add
done:   OUT $2
        HLT
    "#;
    let mut sim = simulator(source);
    sim.run().unwrap();
    assert_eq!(sim.outputs(), &[5050]);
    assert!((1..=100).all(|a| sim.memory().was_written(a)));
    assert!(!sim.memory().was_written(0));
}

#[test]
fn test_many_labels_past_branch_field() {
    let mut source = String::from("main: LDA $1, 0($0)\n");
    for i in 0..1100 {
        source.push_str(&format!("l{}: LDA $1, 1($1)\n", i));
    }
    source.push_str(" BZ $0, l1050\n HLT\n");

    let result = compile(&source, &Config::DEFAULT);
    assert!(!result.has_errors());
    let b001 = result.warnings().filter(|d| d.code == Code::B001).count();
    assert_eq!(b001, 1);
}
