//! Instruction decoder

use crate::error::{DisassemblerError, Result};
use snx_spec::encoding::{
    extract_base, extract_branch_target, extract_dest, extract_imm, extract_opcode, extract_reg,
    extract_src1, extract_src2,
};
use snx_spec::{Opcode, Word};

/// Fields of one decoded word
///
/// Register fields are the raw 2-bit values. A label-form BAL and an
/// address-form BAL share one layout, so `Bal` carries both readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    R {
        op: Opcode,
        dest: u8,
        src1: u8,
        src2: u8,
    },
    R1 {
        op: Opcode,
        dest: u8,
        src: u8,
    },
    Halt,
    /// LD, ST, LDA
    Memory {
        op: Opcode,
        reg: u8,
        base: u8,
        imm: i8,
    },
    /// IN, OUT
    Io {
        op: Opcode,
        reg: u8,
    },
    Bz {
        cond: u8,
        target: u16,
    },
    Bal {
        link: u8,
        base: u8,
        imm: i8,
        target: u16,
    },
}

impl Decoded {
    pub fn opcode(&self) -> Opcode {
        match *self {
            Decoded::R { op, .. }
            | Decoded::R1 { op, .. }
            | Decoded::Memory { op, .. }
            | Decoded::Io { op, .. } => op,
            Decoded::Halt => Opcode::Hlt,
            Decoded::Bz { .. } => Opcode::Bz,
            Decoded::Bal { .. } => Opcode::Bal,
        }
    }
}

/// Decode one 16-bit word
pub fn decode(word: Word) -> Result<Decoded> {
    let raw = extract_opcode(word);
    let op = Opcode::from_u8(raw).ok_or(DisassemblerError::UnknownOpcode(raw))?;

    let decoded = match op {
        Opcode::Add | Opcode::And | Opcode::Sub | Opcode::Slt => Decoded::R {
            op,
            dest: extract_dest(word),
            src1: extract_src1(word),
            src2: extract_src2(word),
        },
        Opcode::Not | Opcode::Sr => Decoded::R1 {
            op,
            dest: extract_dest(word),
            src: extract_src1(word),
        },
        Opcode::Hlt => Decoded::Halt,
        Opcode::Ld | Opcode::St | Opcode::Lda => Decoded::Memory {
            op,
            reg: extract_reg(word),
            base: extract_base(word),
            imm: extract_imm(word) as i8,
        },
        Opcode::In | Opcode::Out => Decoded::Io {
            op,
            reg: extract_reg(word),
        },
        Opcode::Bz => Decoded::Bz {
            cond: extract_reg(word),
            target: extract_branch_target(word),
        },
        Opcode::Bal => Decoded::Bal {
            link: extract_reg(word),
            base: extract_base(word),
            imm: extract_imm(word) as i8,
            target: extract_branch_target(word),
        },
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_r() {
        assert_eq!(
            decode(0x0B40).unwrap(),
            Decoded::R {
                op: Opcode::Add,
                dest: 1,
                src1: 2,
                src2: 3
            }
        );
    }

    #[test]
    fn test_decode_r1_and_halt() {
        assert_eq!(
            decode(0x4480).unwrap(),
            Decoded::R1 {
                op: Opcode::Not,
                dest: 2,
                src: 1
            }
        );
        assert_eq!(decode(0x7000).unwrap(), Decoded::Halt);
        // padding bits are ignored
        assert_eq!(decode(0x7ABC).unwrap(), Decoded::Halt);
    }

    #[test]
    fn test_decode_memory_sign() {
        assert_eq!(
            decode(0x87FE).unwrap(),
            Decoded::Memory {
                op: Opcode::Ld,
                reg: 1,
                base: 3,
                imm: -2
            }
        );
    }

    #[test]
    fn test_decode_branches() {
        assert_eq!(decode(0xE403).unwrap(), Decoded::Bz { cond: 1, target: 3 });
        assert_eq!(
            decode(0xF804).unwrap(),
            Decoded::Bal {
                link: 2,
                base: 0,
                imm: 4,
                target: 4
            }
        );
    }

    #[test]
    fn test_decode_unknown_opcode() {
        assert!(matches!(
            decode(0x5000),
            Err(DisassemblerError::UnknownOpcode(5))
        ));
        assert!(matches!(
            decode(0xB123),
            Err(DisassemblerError::UnknownOpcode(0xB))
        ));
    }
}
