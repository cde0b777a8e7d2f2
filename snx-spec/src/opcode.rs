//! # SN/X Opcode Definitions
//!
//! Opcodes occupy the top 4 bits of every instruction word. The numbering is
//! fixed by the reference assembler; 0x5 and 0xB are unassigned.
//!
//! ## Formats
//! - R:  ADD, AND, SUB, SLT (three registers)
//! - R1: NOT, SR (two registers)
//! - R0: HLT (no operands)
//! - I:  LD, ST, LDA, IN, OUT, BZ, BAL (register plus address, label or nothing)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode (4 bits)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// ADD: dest = src1 + src2
    Add = 0x0,
    /// AND: dest = src1 & src2
    And = 0x1,
    /// SUB: dest = src1 - src2
    Sub = 0x2,
    /// SLT: dest = (src1 < src2) ? 1 : 0 (signed)
    Slt = 0x3,
    /// NOT: dest = !src
    Not = 0x4,
    /// SR: dest = src >> 1 (logical)
    Sr = 0x6,
    /// HLT: stop the machine
    Hlt = 0x7,
    /// LD: dest = MEM[ea]
    Ld = 0x8,
    /// ST: MEM[ea] = src
    St = 0x9,
    /// LDA: dest = ea
    Lda = 0xA,
    /// IN: dest = input port
    In = 0xC,
    /// OUT: output port = src
    Out = 0xD,
    /// BZ: if src == 0 jump to label
    Bz = 0xE,
    /// BAL: dest = PC + 1; jump to label or ea
    Bal = 0xF,
}

/// Instruction word format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    R,
    R1,
    R0,
    I,
}

impl Opcode {
    /// Every assigned opcode, in numeric order
    pub const ALL: [Opcode; 14] = [
        Opcode::Add,
        Opcode::And,
        Opcode::Sub,
        Opcode::Slt,
        Opcode::Not,
        Opcode::Sr,
        Opcode::Hlt,
        Opcode::Ld,
        Opcode::St,
        Opcode::Lda,
        Opcode::In,
        Opcode::Out,
        Opcode::Bz,
        Opcode::Bal,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Opcode::Add),
            0x1 => Some(Opcode::And),
            0x2 => Some(Opcode::Sub),
            0x3 => Some(Opcode::Slt),
            0x4 => Some(Opcode::Not),
            0x6 => Some(Opcode::Sr),
            0x7 => Some(Opcode::Hlt),
            0x8 => Some(Opcode::Ld),
            0x9 => Some(Opcode::St),
            0xA => Some(Opcode::Lda),
            0xC => Some(Opcode::In),
            0xD => Some(Opcode::Out),
            0xE => Some(Opcode::Bz),
            0xF => Some(Opcode::Bal),
            _ => None,
        }
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Look up a mnemonic, ignoring case
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        let upper = text.to_ascii_uppercase();
        Self::ALL.into_iter().find(|op| op.mnemonic() == upper)
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::And => "AND",
            Opcode::Sub => "SUB",
            Opcode::Slt => "SLT",
            Opcode::Not => "NOT",
            Opcode::Sr => "SR",
            Opcode::Hlt => "HLT",
            Opcode::Ld => "LD",
            Opcode::St => "ST",
            Opcode::Lda => "LDA",
            Opcode::In => "IN",
            Opcode::Out => "OUT",
            Opcode::Bz => "BZ",
            Opcode::Bal => "BAL",
        }
    }

    pub const fn format(self) -> Format {
        match self {
            Opcode::Add | Opcode::And | Opcode::Sub | Opcode::Slt => Format::R,
            Opcode::Not | Opcode::Sr => Format::R1,
            Opcode::Hlt => Format::R0,
            Opcode::Ld
            | Opcode::St
            | Opcode::Lda
            | Opcode::In
            | Opcode::Out
            | Opcode::Bz
            | Opcode::Bal => Format::I,
        }
    }

    /// Number of source-level operands the mnemonic takes
    pub const fn operand_count(self) -> usize {
        match self {
            Opcode::Add | Opcode::And | Opcode::Sub | Opcode::Slt => 3,
            Opcode::Not | Opcode::Sr => 2,
            Opcode::Hlt => 0,
            Opcode::In | Opcode::Out => 1,
            Opcode::Ld | Opcode::St | Opcode::Lda | Opcode::Bz | Opcode::Bal => 2,
        }
    }

    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(self, Opcode::Bz | Opcode::Bal)
    }

    #[inline]
    pub const fn is_memory(self) -> bool {
        matches!(self, Opcode::Ld | Opcode::St)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
