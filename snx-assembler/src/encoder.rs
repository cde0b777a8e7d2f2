//! Instruction encoding to 16-bit words
//!
//! Word layouts live in `snx_spec::encoding`. Label branches (BZ and the
//! label form of BAL) are encoded with the additive rule, so a target PC of
//! 1024 or more spills into the register and opcode bits exactly as the
//! reference assembler does.

use crate::error::{AssemblerError, Result};
use sha2::{Digest, Sha256};
use snx_spec::encoding::{
    encode_i, encode_i_reg, encode_label_branch, encode_r, encode_r0, encode_r1,
};
use snx_spec::{BalTarget, IForm, Instruction, IrProgram, Word};
use std::fmt::Write as _;

/// Encode one instruction
pub fn encode(inst: &Instruction) -> Word {
    let op = inst.opcode().to_u8();
    match inst {
        Instruction::R {
            dest, src1, src2, ..
        } => encode_r(op, dest.bits(), src1.bits(), src2.bits()),
        Instruction::R1 { dest, src, .. } => encode_r1(op, dest.bits(), src.bits()),
        Instruction::R0 => encode_r0(op),
        Instruction::I(form) => match form {
            IForm::Ld { dest: reg, addr }
            | IForm::St { src: reg, addr }
            | IForm::Lda { dest: reg, addr } => encode_i(op, reg.bits(), addr.base.bits(), addr.imm),
            IForm::In { dest: reg } | IForm::Out { src: reg } => encode_i_reg(op, reg.bits()),
            IForm::Bz { cond, target } => encode_label_branch(op, cond.bits(), target.pc),
            IForm::Bal { link, target } => match target {
                BalTarget::Label(label) => encode_label_branch(op, link.bits(), label.pc),
                BalTarget::Address(addr) => encode_i(op, link.bits(), addr.base.bits(), addr.imm),
            },
        },
    }
}

/// Encode every instruction of a program in PC order
pub fn encode_program(program: &IrProgram) -> Image {
    Image::new(program.instructions.iter().map(|ir| encode(&ir.inst)).collect())
}

/// Encoded program, one word per PC
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub words: Vec<Word>,
}

impl Image {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Big-endian bytes, two per word
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(AssemblerError::OddImageLength(bytes.len()));
        }
        let words = bytes
            .chunks_exact(2)
            .map(|pair| Word::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { words })
    }

    /// Uppercase `%04X` words separated by spaces, `words_per_line` per line
    pub fn to_hex(&self, words_per_line: usize) -> String {
        let per_line = words_per_line.max(1);
        let mut out = String::new();
        for chunk in self.words.chunks(per_line) {
            let line: Vec<String> = chunk.iter().map(|w| format!("{:04X}", w)).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Intel HEX: one data record per word at its word address
    pub fn to_intel_hex(&self) -> String {
        let mut out = String::new();
        for (addr, w) in self.words.iter().enumerate() {
            let addr = addr as u16;
            let [hi, lo] = w.to_be_bytes();
            let sum = 2u8
                .wrapping_add((addr >> 8) as u8)
                .wrapping_add(addr as u8)
                .wrapping_add(hi)
                .wrapping_add(lo);
            let checksum = sum.wrapping_neg();
            let _ = writeln!(out, ":02{:04X}00{:04X}{:02X}", addr, w, checksum);
        }
        out.push_str(":00000001FF\n");
        out
    }

    /// SHA-256 of the big-endian bytes, lowercase hex
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.to_bytes());
        hash.iter().fold(String::with_capacity(64), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snx_spec::{Address, AluOp, LabelRef, Register, UnaryOp};

    #[test]
    fn test_encode_r_formats() {
        let add = Instruction::R {
            op: AluOp::Add,
            dest: Register::R1,
            src1: Register::R2,
            src2: Register::R3,
        };
        assert_eq!(encode(&add), 0x0B40);

        let not = Instruction::R1 {
            op: UnaryOp::Not,
            dest: Register::R2,
            src: Register::R1,
        };
        assert_eq!(encode(&not), 0x4480);

        assert_eq!(encode(&Instruction::R0), 0x7000);
    }

    #[test]
    fn test_encode_i_formats() {
        let ld = Instruction::I(IForm::Ld {
            dest: Register::R1,
            addr: Address::new(-2, Register::R3),
        });
        assert_eq!(encode(&ld), 0x87FE);

        let lda = Instruction::I(IForm::Lda {
            dest: Register::R1,
            addr: Address::absolute(5),
        });
        assert_eq!(encode(&lda), 0xA405);

        let out = Instruction::I(IForm::Out { src: Register::R2 });
        assert_eq!(encode(&out), 0xD800);
    }

    #[test]
    fn test_encode_label_branch_overflow() {
        let bz = Instruction::I(IForm::Bz {
            cond: Register::R1,
            target: LabelRef::new("x", 3),
        });
        assert_eq!(encode(&bz), 0xE403);

        let bal = Instruction::I(IForm::Bal {
            link: Register::R2,
            target: BalTarget::Label(LabelRef::new("far", 1024)),
        });
        assert_eq!(encode(&bal), 0xFC00);
    }

    #[test]
    fn test_image_bytes() {
        let image = Image::new(vec![0x0B40, 0x7000]);
        assert_eq!(image.to_bytes(), vec![0x0B, 0x40, 0x70, 0x00]);
        assert_eq!(Image::from_bytes(&image.to_bytes()).unwrap(), image);
        assert!(matches!(
            Image::from_bytes(&[1, 2, 3]),
            Err(AssemblerError::OddImageLength(3))
        ));
    }

    #[test]
    fn test_image_hex() {
        let image = Image::new(vec![0x0B40, 0x7000, 0xA405]);
        assert_eq!(image.to_hex(2), "0B40 7000\nA405\n");
        assert_eq!(Image::default().to_hex(8), "");
    }

    #[test]
    fn test_image_intel_hex() {
        let image = Image::new(vec![0x7000, 0xA405]);
        assert_eq!(
            image.to_intel_hex(),
            ":020000007000 8E\n:02000100A40554\n:00000001FF\n".replace(' ', "")
        );
    }

    #[test]
    fn test_image_digest() {
        let digest = Image::default().digest();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(Image::new(vec![1]).digest(), digest);
    }
}
