//! # Instruction Encoding Constants and Helpers
//!
//! Bit layout shared by the encoder and the decoder. Every word is 16 bits,
//! most significant bit first:
//!
//! ```text
//! R:  [opcode:4][src1:2][src2:2][dest:2][unused:6]
//! R1: [opcode:4][src:2][unused:2][dest:2][unused:6]
//! R0: [opcode:4][unused:12]
//! I:  [opcode:4][reg:2][base:2][imm:8]
//! ```
//!
//! Register fields are inserted unmasked and the result truncated to 16
//! bits, which is how the reference assembler builds words. Label branches
//! go through [`encode_label_branch`], the one place that reproduces the
//! reference tool's additive target encoding.

use crate::word::{imm8, word};
use crate::Word;

// ============================================================================
// Bit Position Constants
// ============================================================================

/// Opcode field: bits 15-12
pub const OPCODE_SHIFT: u32 = 12;

/// R-format first source: bits 11-10
pub const SRC1_SHIFT: u32 = 10;

/// R-format second source: bits 9-8
pub const SRC2_SHIFT: u32 = 8;

/// R/R1-format destination: bits 7-6
pub const DEST_SHIFT: u32 = 6;

/// I-format register (also the R1 source): bits 11-10
pub const REG_SHIFT: u32 = 10;

/// I-format base register: bits 9-8
pub const BASE_SHIFT: u32 = 8;

// ============================================================================
// Field Masks
// ============================================================================

/// Opcode mask (4 bits)
pub const OPCODE_MASK: u16 = 0xF;

/// Register field mask (2 bits)
pub const REGISTER_MASK: u16 = 0x3;

/// Immediate field mask (8 bits)
pub const IMM_MASK: u16 = 0xFF;

/// Label branch target field as the hardware reads it (10 bits)
pub const BRANCH_TARGET_MASK: u16 = 0x3FF;

/// First PC that no longer fits the 10-bit branch target field
pub const BRANCH_TARGET_LIMIT: u32 = 1 << 10;

// ============================================================================
// Encoding Functions
// ============================================================================

/// R format: ADD/AND/SUB/SLT
#[inline]
pub const fn encode_r(opcode: u8, dest: u16, src1: u16, src2: u16) -> Word {
    word(
        ((opcode as i64) << OPCODE_SHIFT)
            | ((src1 as i64) << SRC1_SHIFT)
            | ((src2 as i64) << SRC2_SHIFT)
            | ((dest as i64) << DEST_SHIFT),
    )
}

/// R1 format: NOT/SR
#[inline]
pub const fn encode_r1(opcode: u8, dest: u16, src: u16) -> Word {
    word(((opcode as i64) << OPCODE_SHIFT) | ((src as i64) << REG_SHIFT) | ((dest as i64) << DEST_SHIFT))
}

/// R0 format: HLT
#[inline]
pub const fn encode_r0(opcode: u8) -> Word {
    word((opcode as i64) << OPCODE_SHIFT)
}

/// I format with an address operand: LD/ST/LDA/BAL-address
///
/// Only the low 8 bits of `imm` are kept; range checking happens elsewhere.
#[inline]
pub const fn encode_i(opcode: u8, reg: u16, base: u16, imm: i32) -> Word {
    word(
        ((opcode as i64) << OPCODE_SHIFT)
            | ((reg as i64) << REG_SHIFT)
            | ((base as i64) << BASE_SHIFT)
            | imm8(imm) as i64,
    )
}

/// I format with a single register: IN/OUT
#[inline]
pub const fn encode_i_reg(opcode: u8, reg: u16) -> Word {
    word(((opcode as i64) << OPCODE_SHIFT) | ((reg as i64) << REG_SHIFT))
}

/// Label branch: BZ and BAL-with-label
///
/// The reference assembler adds the full target PC instead of inserting a
/// masked 10-bit field. For targets at or above 1024 the high PC bits carry
/// into the register and opcode fields. That behavior is kept bit for bit.
#[inline]
pub const fn encode_label_branch(opcode: u8, reg: u16, target_pc: u32) -> Word {
    word(((opcode as i64) << OPCODE_SHIFT) + ((reg as i64) << REG_SHIFT) + target_pc as i64)
}

/// Label branch as a well-formed 10-bit field would encode it
///
/// Agrees with [`encode_label_branch`] for every target below 1024.
#[inline]
pub const fn naive_label_branch(opcode: u8, reg: u16, target_pc: u32) -> Word {
    word(
        ((opcode as i64) << OPCODE_SHIFT)
            | ((reg as i64) << REG_SHIFT)
            | (target_pc as i64 & BRANCH_TARGET_MASK as i64),
    )
}

// ============================================================================
// Field Extraction Functions
// ============================================================================

/// Extract opcode (bits 15-12)
#[inline]
pub const fn extract_opcode(inst: Word) -> u8 {
    ((inst >> OPCODE_SHIFT) & OPCODE_MASK) as u8
}

/// Extract R-format first source (bits 11-10)
#[inline]
pub const fn extract_src1(inst: Word) -> u8 {
    ((inst >> SRC1_SHIFT) & REGISTER_MASK) as u8
}

/// Extract R-format second source (bits 9-8)
#[inline]
pub const fn extract_src2(inst: Word) -> u8 {
    ((inst >> SRC2_SHIFT) & REGISTER_MASK) as u8
}

/// Extract destination (bits 7-6)
#[inline]
pub const fn extract_dest(inst: Word) -> u8 {
    ((inst >> DEST_SHIFT) & REGISTER_MASK) as u8
}

/// Extract I-format register (bits 11-10)
#[inline]
pub const fn extract_reg(inst: Word) -> u8 {
    ((inst >> REG_SHIFT) & REGISTER_MASK) as u8
}

/// Extract I-format base (bits 9-8)
#[inline]
pub const fn extract_base(inst: Word) -> u8 {
    ((inst >> BASE_SHIFT) & REGISTER_MASK) as u8
}

/// Extract raw 8-bit immediate (bits 7-0)
#[inline]
pub const fn extract_imm(inst: Word) -> u8 {
    (inst & IMM_MASK) as u8
}

/// Extract 10-bit label branch target (bits 9-0)
#[inline]
pub const fn extract_branch_target(inst: Word) -> u16 {
    inst & BRANCH_TARGET_MASK
}
