//! Static checker for lowered programs
//!
//! Runs the post-lowering stages in report order: range checks, CFG
//! construction and its warnings, then dataflow.

use crate::cfg::{build_cfg, check_cfg, Cfg};
use crate::config::Config;
use crate::dataflow::check_dataflow;
use crate::diagnostic::Diagnostics;
use crate::program::IrProgram;
use crate::validation::check_ranges;
use tracing::debug;

/// Checker output: the CFG and everything reported after lowering
#[derive(Debug, Clone)]
pub struct CheckOutput {
    pub cfg: Cfg,
    pub diagnostics: Diagnostics,
}

/// Run every post-lowering check on `program`
///
/// # Arguments
///
/// * `program` - Lowered, label-resolved program
/// * `config` - Register and memory sizes the checks assume
pub fn check_program(program: &IrProgram, config: &Config) -> CheckOutput {
    let mut diagnostics = Diagnostics::new();

    check_ranges(program, config, &mut diagnostics);
    let after_ranges = diagnostics.len();

    let cfg = build_cfg(program);
    check_cfg(&cfg, program, &mut diagnostics);
    let after_cfg = diagnostics.len();
    debug!(
        instructions = program.len(),
        blocks = cfg.len(),
        range = after_ranges,
        cfg = after_cfg - after_ranges,
        "control-flow graph built"
    );

    let flow = check_dataflow(program, &cfg, config, &mut diagnostics);
    debug!(
        iterations = flow.iterations,
        dataflow = diagnostics.len() - after_cfg,
        "static checks finished"
    );

    CheckOutput { cfg, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Code, SourceSpan};
    use crate::instruction::{Address, IForm, Instruction};
    use crate::program::IrInstruction;
    use crate::register::Register;

    #[test]
    fn test_stage_order() {
        // 0: LD $1, 1000($0)  -> M001, I001, D003 skipped (outside memory)
        // 1: ADD $2, $3, $0   -> D001
        // 2: (no HLT)         -> W002, W003
        let mut program = IrProgram::new();
        let insts = vec![
            Instruction::I(IForm::Ld {
                dest: Register::R1,
                addr: Address::absolute(1000),
            }),
            Instruction::R {
                op: crate::instruction::AluOp::Add,
                dest: Register::R2,
                src1: Register::R3,
                src2: Register::R0,
            },
        ];
        for (pc, inst) in insts.into_iter().enumerate() {
            let text = inst.to_string();
            program.instructions.push(IrInstruction::new(
                pc as u32,
                inst,
                text,
                SourceSpan::new(pc as u32 + 1, 1, 2),
            ));
        }

        let config = Config::new(4, 128).unwrap();
        let out = check_program(&program, &config);
        let codes: Vec<Code> = out.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![Code::M001, Code::I001, Code::W002, Code::W003, Code::D001]
        );
        let stages: Vec<_> = codes.iter().map(|c| c.stage()).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);
        assert_eq!(out.cfg.len(), 1);
    }

    #[test]
    fn test_clean_program() {
        let mut program = IrProgram::new();
        program.instructions.push(IrInstruction::new(
            0,
            Instruction::I(IForm::Lda {
                dest: Register::R1,
                addr: Address::absolute(5),
            }),
            "LDA $1, 5($0)",
            SourceSpan::new(1, 7, 20),
        ));
        program.instructions.push(IrInstruction::new(
            1,
            Instruction::R0,
            "HLT",
            SourceSpan::new(2, 7, 10),
        ));
        let out = check_program(&program, &Config::DEFAULT);
        assert!(out.diagnostics.is_empty());
    }
}
