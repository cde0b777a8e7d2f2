//! Range checks over a lowered program
//!
//! Runs before the CFG and dataflow stages:
//! - M001: LD/ST with base `$0` outside memory (literal or effective address)
//! - I001: address immediate that does not survive 8-bit truncation
//! - B001: label branch to a PC the 10-bit target field cannot hold

use crate::config::Config;
use crate::diagnostic::{Code, Diagnostics};
use crate::encoding::BRANCH_TARGET_LIMIT;
use crate::instruction::{IForm, Instruction};
use crate::program::{IrInstruction, IrProgram};
use crate::word::{effective_address, fits_imm8, sign_extend_8};

/// Check every instruction, appending diagnostics in PC order
pub fn check_ranges(program: &IrProgram, config: &Config, diagnostics: &mut Diagnostics) {
    for ir in &program.instructions {
        check_memory_bounds(ir, config, diagnostics);
        check_immediate(ir, diagnostics);
        check_branch_target(ir, diagnostics);
    }
}

fn check_memory_bounds(ir: &IrInstruction, config: &Config, diagnostics: &mut Diagnostics) {
    let addr = match &ir.inst {
        Instruction::I(IForm::Ld { addr, .. } | IForm::St { addr, .. }) => addr,
        _ => return,
    };
    if !addr.is_absolute() {
        return;
    }

    let ea = effective_address(0, addr.imm) as u32;
    let literal_outside = addr.imm >= 0 && !config.in_memory(addr.imm as u32);
    if literal_outside || !config.in_memory(ea) {
        diagnostics.report(
            Code::M001,
            format!(
                "{} address {} (effective {:#06x}) is outside memory of {} words",
                ir.inst.mnemonic(),
                addr.imm,
                ea,
                config.mem_size
            ),
            ir.span,
            ir.pc,
        );
    }
}

fn check_immediate(ir: &IrInstruction, diagnostics: &mut Diagnostics) {
    let Some(addr) = ir.inst.address() else {
        return;
    };
    if !fits_imm8(addr.imm) {
        diagnostics.report(
            Code::I001,
            format!(
                "immediate {} does not fit in 8 bits and will be encoded as {}",
                addr.imm,
                sign_extend_8(addr.imm)
            ),
            ir.span,
            ir.pc,
        );
    }
}

fn check_branch_target(ir: &IrInstruction, diagnostics: &mut Diagnostics) {
    let Some(target) = ir.inst.label_target() else {
        return;
    };
    if target.pc >= BRANCH_TARGET_LIMIT {
        diagnostics.report(
            Code::B001,
            format!(
                "branch target '{}' at pc {} exceeds the 10-bit field; the encoded word will be corrupted",
                target.name, target.pc
            ),
            ir.span,
            ir.pc,
        );
    }
}
