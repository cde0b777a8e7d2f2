//! Lowering: syntax tree to resolved IR
//!
//! Two passes. The first assigns each label the PC of the next instruction
//! (S006 on duplicates). The second checks each instruction against its
//! operand schema and resolves label references:
//! - S001 unknown mnemonic
//! - S002 wrong operand count
//! - S003 wrong operand kind
//! - S004 undefined label
//! - S005 register index outside the configured register file
//!
//! Errors never stop lowering of later lines. No IR is produced when any
//! error was reported here.

use crate::ast::{InstructionNode, Operand, OperandKind, SourceProgram};
use snx_spec::{
    Address, AluOp, BalTarget, Code, Config, Diagnostics, IForm, Instruction, IrInstruction,
    IrProgram, LabelRef, Opcode, Register, SourceSpan, UnaryOp,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Operand shape a mnemonic accepts in one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Register,
    Address,
    Label,
    LabelOrAddress,
}

impl Slot {
    fn accepts(self, kind: &OperandKind) -> bool {
        matches!(
            (self, kind),
            (Slot::Register, OperandKind::Register(_))
                | (Slot::Address, OperandKind::Address { .. })
                | (Slot::Label, OperandKind::Label(_))
                | (Slot::LabelOrAddress, OperandKind::Label(_))
                | (Slot::LabelOrAddress, OperandKind::Address { .. })
        )
    }

    fn describe(self) -> &'static str {
        match self {
            Slot::Register => "a register",
            Slot::Address => "an address",
            Slot::Label => "a label",
            Slot::LabelOrAddress => "a label or an address",
        }
    }
}

fn schema(op: Opcode) -> &'static [Slot] {
    use Slot::*;
    match op {
        Opcode::Add | Opcode::And | Opcode::Sub | Opcode::Slt => &[Register, Register, Register],
        Opcode::Not | Opcode::Sr => &[Register, Register],
        Opcode::Hlt => &[],
        Opcode::Ld | Opcode::St | Opcode::Lda => &[Register, Address],
        Opcode::In | Opcode::Out => &[Register],
        Opcode::Bz => &[Register, Label],
        Opcode::Bal => &[Register, LabelOrAddress],
    }
}

struct Lowerer<'a> {
    config: &'a Config,
    labels: BTreeMap<String, u32>,
    diagnostics: &'a mut Diagnostics,
}

/// Lower a parsed program, or `None` if lowering reported an error
pub fn lower(
    source: &SourceProgram,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Option<IrProgram> {
    let errors_before = diagnostics.error_count();
    let labels = collect_labels(source, diagnostics);

    let mut lowerer = Lowerer {
        config,
        labels,
        diagnostics,
    };
    let mut instructions = Vec::new();
    for (pc, (_, node)) in source.instructions().enumerate() {
        if let Some(inst) = lowerer.lower_instruction(node) {
            instructions.push(IrInstruction::new(pc as u32, inst, node.text.clone(), node.span));
        }
    }

    let Lowerer {
        labels,
        diagnostics,
        ..
    } = lowerer;
    let failed = diagnostics.error_count() > errors_before;
    debug!(
        instructions = instructions.len(),
        labels = labels.len(),
        failed,
        "lowering finished"
    );
    if failed {
        return None;
    }

    Some(IrProgram {
        instructions,
        labels,
    })
}

fn collect_labels(source: &SourceProgram, diagnostics: &mut Diagnostics) -> BTreeMap<String, u32> {
    let mut labels = BTreeMap::new();
    let mut defined_on: BTreeMap<String, u32> = BTreeMap::new();
    let mut pc = 0u32;

    for line in &source.lines {
        if let Some(label) = &line.label {
            let key = IrProgram::label_key(&label.name);
            if let Some(first) = defined_on.get(&key) {
                diagnostics.report_at(
                    Code::S006,
                    format!(
                        "duplicate label '{}' (first defined on line {})",
                        label.name, first
                    ),
                    label.span,
                );
            } else {
                labels.insert(key.clone(), pc);
                defined_on.insert(key, line.number);
            }
        }
        if line.instruction.is_some() {
            pc += 1;
        }
    }
    labels
}

impl Lowerer<'_> {
    fn error(&mut self, code: Code, message: String, span: SourceSpan) {
        self.diagnostics.report_at(code, message, span);
    }

    fn lower_instruction(&mut self, node: &InstructionNode) -> Option<Instruction> {
        if node.malformed {
            return None;
        }

        let Some(op) = Opcode::from_mnemonic(&node.mnemonic) else {
            self.error(
                Code::S001,
                format!("unknown instruction '{}'", node.mnemonic),
                node.span,
            );
            return None;
        };

        let slots = schema(op);
        if node.operands.len() != slots.len() {
            self.error(
                Code::S002,
                format!(
                    "'{}' takes {} operand(s), {} given",
                    op,
                    slots.len(),
                    node.operands.len()
                ),
                node.span,
            );
            return None;
        }

        let mut ok = true;
        for (i, (operand, slot)) in node.operands.iter().zip(slots).enumerate() {
            if !slot.accepts(&operand.kind) {
                self.error(
                    Code::S003,
                    format!(
                        "operand {} of '{}' must be {}, found {} '{}'",
                        i + 1,
                        op,
                        slot.describe(),
                        operand.kind.describe(),
                        operand.text
                    ),
                    operand.span,
                );
                ok = false;
            }
        }
        for operand in &node.operands {
            ok &= self.check_registers(operand);
            ok &= self.check_label(operand);
        }
        if !ok {
            return None;
        }

        self.build(op, &node.operands)
    }

    fn check_registers(&mut self, operand: &Operand) -> bool {
        let index = match operand.kind {
            OperandKind::Register(index) => index,
            OperandKind::Address { base, .. } => base,
            OperandKind::Label(_) => return true,
        };
        if Register::from_index(index, self.config.reg_count).is_some() {
            return true;
        }
        self.error(
            Code::S005,
            format!(
                "register ${} out of range (valid: $0-${})",
                index,
                self.config.reg_count - 1
            ),
            operand.span,
        );
        false
    }

    fn check_label(&mut self, operand: &Operand) -> bool {
        let OperandKind::Label(name) = &operand.kind else {
            return true;
        };
        if self.labels.contains_key(&IrProgram::label_key(name)) {
            return true;
        }
        self.error(
            Code::S004,
            format!("undefined label '{}'", name),
            operand.span,
        );
        false
    }

    fn register(&self, operand: &Operand) -> Option<Register> {
        match operand.kind {
            OperandKind::Register(index) => Register::from_index(index, self.config.reg_count),
            _ => None,
        }
    }

    fn address(&self, operand: &Operand) -> Option<Address> {
        match operand.kind {
            OperandKind::Address { offset, base } => {
                Register::from_index(base, self.config.reg_count).map(|b| Address::new(offset, b))
            }
            _ => None,
        }
    }

    fn label(&self, operand: &Operand) -> Option<LabelRef> {
        match &operand.kind {
            OperandKind::Label(name) => self
                .labels
                .get(&IrProgram::label_key(name))
                .map(|&pc| LabelRef::new(name.clone(), pc)),
            _ => None,
        }
    }

    /// Assemble the IR node once every operand has been checked
    fn build(&self, op: Opcode, operands: &[Operand]) -> Option<Instruction> {
        let reg = |i: usize| operands.get(i).and_then(|o| self.register(o));
        let addr = |i: usize| operands.get(i).and_then(|o| self.address(o));
        let label = |i: usize| operands.get(i).and_then(|o| self.label(o));

        let inst = match op {
            Opcode::Add | Opcode::And | Opcode::Sub | Opcode::Slt => Instruction::R {
                op: AluOp::from_opcode(op)?,
                dest: reg(0)?,
                src1: reg(1)?,
                src2: reg(2)?,
            },
            Opcode::Not | Opcode::Sr => Instruction::R1 {
                op: UnaryOp::from_opcode(op)?,
                dest: reg(0)?,
                src: reg(1)?,
            },
            Opcode::Hlt => Instruction::R0,
            Opcode::Ld => Instruction::I(IForm::Ld {
                dest: reg(0)?,
                addr: addr(1)?,
            }),
            Opcode::St => Instruction::I(IForm::St {
                src: reg(0)?,
                addr: addr(1)?,
            }),
            Opcode::Lda => Instruction::I(IForm::Lda {
                dest: reg(0)?,
                addr: addr(1)?,
            }),
            Opcode::In => Instruction::I(IForm::In { dest: reg(0)? }),
            Opcode::Out => Instruction::I(IForm::Out { src: reg(0)? }),
            Opcode::Bz => Instruction::I(IForm::Bz {
                cond: reg(0)?,
                target: label(1)?,
            }),
            Opcode::Bal => {
                let target = match label(1) {
                    Some(l) => BalTarget::Label(l),
                    None => BalTarget::Address(addr(1)?),
                };
                Instruction::I(IForm::Bal {
                    link: reg(0)?,
                    target,
                })
            }
        };
        Some(inst)
    }
}
