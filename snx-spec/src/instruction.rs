//! SN/X Instruction Set
//!
//! One case per word format; the I format splits into one case per
//! instruction shape so that operand roles are present exactly where the
//! format has them.
//!
//! ## Instruction Formats
//! - R:  [opcode:4][src1:2][src2:2][dest:2][unused:6]
//! - R1: [opcode:4][src:2][unused:2][dest:2][unused:6]
//! - R0: [opcode:4][unused:12]
//! - I:  [opcode:4][reg:2][base:2][imm:8]

use crate::opcode::{Format, Opcode};
use crate::register::Register;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-source ALU operation (R format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    And,
    Sub,
    Slt,
}

/// One-source ALU operation (R1 format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Sr,
}

impl AluOp {
    pub const fn opcode(self) -> Opcode {
        match self {
            AluOp::Add => Opcode::Add,
            AluOp::And => Opcode::And,
            AluOp::Sub => Opcode::Sub,
            AluOp::Slt => Opcode::Slt,
        }
    }

    pub const fn from_opcode(op: Opcode) -> Option<Self> {
        match op {
            Opcode::Add => Some(AluOp::Add),
            Opcode::And => Some(AluOp::And),
            Opcode::Sub => Some(AluOp::Sub),
            Opcode::Slt => Some(AluOp::Slt),
            _ => None,
        }
    }
}

impl UnaryOp {
    pub const fn opcode(self) -> Opcode {
        match self {
            UnaryOp::Not => Opcode::Not,
            UnaryOp::Sr => Opcode::Sr,
        }
    }

    pub const fn from_opcode(op: Opcode) -> Option<Self> {
        match op {
            Opcode::Not => Some(UnaryOp::Not),
            Opcode::Sr => Some(UnaryOp::Sr),
            _ => None,
        }
    }
}

/// `imm(base)` address operand
///
/// `imm` keeps the literal as written; the encoder and the simulator only
/// ever see its low 8 bits, sign-extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub imm: i32,
    pub base: Register,
}

impl Address {
    pub const fn new(imm: i32, base: Register) -> Self {
        Self { imm, base }
    }

    /// Address with base `$0`
    pub const fn absolute(imm: i32) -> Self {
        Self {
            imm,
            base: Register::R0,
        }
    }

    #[inline]
    pub const fn is_absolute(&self) -> bool {
        self.base.is_zero()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.imm, self.base)
    }
}

/// Resolved label reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelRef {
    /// Label as written in the source
    pub name: String,
    /// PC of the labelled instruction
    pub pc: u32,
}

impl LabelRef {
    pub fn new(name: impl Into<String>, pc: u32) -> Self {
        Self {
            name: name.into(),
            pc,
        }
    }
}

/// BAL jumps either to a label (call) or through an address (return form)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalTarget {
    Label(LabelRef),
    Address(Address),
}

/// I-format instruction shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IForm {
    /// LD: dest = MEM[ea]
    Ld { dest: Register, addr: Address },
    /// ST: MEM[ea] = src
    St { src: Register, addr: Address },
    /// LDA: dest = ea
    Lda { dest: Register, addr: Address },
    /// IN: dest = input
    In { dest: Register },
    /// OUT: output src
    Out { src: Register },
    /// BZ: branch to target when cond == 0
    Bz { cond: Register, target: LabelRef },
    /// BAL: link = PC + 1; jump
    Bal { link: Register, target: BalTarget },
}

/// SN/X IR instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// ADD/AND/SUB/SLT
    R {
        op: AluOp,
        dest: Register,
        src1: Register,
        src2: Register,
    },
    /// NOT/SR
    R1 {
        op: UnaryOp,
        dest: Register,
        src: Register,
    },
    /// HLT
    R0,
    I(IForm),
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::R { op, .. } => op.opcode(),
            Instruction::R1 { op, .. } => op.opcode(),
            Instruction::R0 => Opcode::Hlt,
            Instruction::I(form) => match form {
                IForm::Ld { .. } => Opcode::Ld,
                IForm::St { .. } => Opcode::St,
                IForm::Lda { .. } => Opcode::Lda,
                IForm::In { .. } => Opcode::In,
                IForm::Out { .. } => Opcode::Out,
                IForm::Bz { .. } => Opcode::Bz,
                IForm::Bal { .. } => Opcode::Bal,
            },
        }
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.opcode().format()
    }

    #[inline]
    pub fn mnemonic(&self) -> &'static str {
        self.opcode().mnemonic()
    }

    /// Register written by this instruction, if any
    pub fn writes(&self) -> Option<Register> {
        match self {
            Instruction::R { dest, .. } | Instruction::R1 { dest, .. } => Some(*dest),
            Instruction::R0 => None,
            Instruction::I(form) => match form {
                IForm::Ld { dest, .. } | IForm::Lda { dest, .. } | IForm::In { dest } => {
                    Some(*dest)
                }
                IForm::Bal { link, .. } => Some(*link),
                IForm::St { .. } | IForm::Out { .. } | IForm::Bz { .. } => None,
            },
        }
    }

    /// Registers read as values, in operand order
    ///
    /// A `$0` base is a constant zero and is not a read.
    pub fn reads(&self) -> Vec<Register> {
        let base_read = |addr: &Address| (!addr.base.is_zero()).then_some(addr.base);
        match self {
            Instruction::R { src1, src2, .. } => vec![*src1, *src2],
            Instruction::R1 { src, .. } => vec![*src],
            Instruction::R0 => Vec::new(),
            Instruction::I(form) => match form {
                IForm::Ld { addr, .. } | IForm::Lda { addr, .. } => {
                    base_read(addr).into_iter().collect()
                }
                IForm::St { src, addr } => std::iter::once(*src).chain(base_read(addr)).collect(),
                IForm::In { .. } => Vec::new(),
                IForm::Out { src } => vec![*src],
                IForm::Bz { cond, .. } => vec![*cond],
                IForm::Bal { target, .. } => match target {
                    BalTarget::Label(_) => Vec::new(),
                    BalTarget::Address(addr) => base_read(addr).into_iter().collect(),
                },
            },
        }
    }

    /// Address operand of LD/ST/LDA/BAL-address
    pub fn address(&self) -> Option<&Address> {
        match self {
            Instruction::I(
                IForm::Ld { addr, .. }
                | IForm::St { addr, .. }
                | IForm::Lda { addr, .. }
                | IForm::Bal {
                    target: BalTarget::Address(addr),
                    ..
                },
            ) => Some(addr),
            _ => None,
        }
    }

    /// Label operand of BZ/BAL-label
    pub fn label_target(&self) -> Option<&LabelRef> {
        match self {
            Instruction::I(
                IForm::Bz { target, .. }
                | IForm::Bal {
                    target: BalTarget::Label(target),
                    ..
                },
            ) => Some(target),
            _ => None,
        }
    }

    /// BAL through a register (`BAL $r, imm($b)`)
    pub fn is_indirect_jump(&self) -> bool {
        matches!(
            self,
            Instruction::I(IForm::Bal {
                target: BalTarget::Address(_),
                ..
            })
        )
    }

    /// Ends a basic block
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::R0 | Instruction::I(IForm::Bz { .. } | IForm::Bal { .. })
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self {
            Instruction::R {
                dest, src1, src2, ..
            } => write!(f, "{} {}, {}, {}", m, dest, src1, src2),
            Instruction::R1 { dest, src, .. } => write!(f, "{} {}, {}", m, dest, src),
            Instruction::R0 => f.write_str(m),
            Instruction::I(form) => match form {
                IForm::Ld { dest, addr } | IForm::Lda { dest, addr } => {
                    write!(f, "{} {}, {}", m, dest, addr)
                }
                IForm::St { src, addr } => write!(f, "{} {}, {}", m, src, addr),
                IForm::In { dest } => write!(f, "{} {}", m, dest),
                IForm::Out { src } => write!(f, "{} {}", m, src),
                IForm::Bz { cond, target } => write!(f, "{} {}, {}", m, cond, target.name),
                IForm::Bal { link, target } => match target {
                    BalTarget::Label(label) => write!(f, "{} {}, {}", m, link, label.name),
                    BalTarget::Address(addr) => write!(f, "{} {}, {}", m, link, addr),
                },
            },
        }
    }
}
