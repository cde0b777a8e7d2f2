//! 16-bit word and 8-bit immediate arithmetic helpers

use crate::{Word, SWord};

/// Word width in bits
pub const WORD_BITS: u32 = 16;

/// Word mask (16 bits)
pub const WORD_MASK: u32 = 0xFFFF;

/// Immediate width in bits
pub const IMM8_BITS: u32 = 8;

/// Immediate mask (8 bits)
pub const IMM8_MASK: i32 = 0xFF;

/// Smallest immediate that survives 8-bit truncation
pub const IMM8_MIN: i32 = -0x80;

/// Largest immediate that survives 8-bit truncation
pub const IMM8_MAX: i32 = 0x7F;

/// Truncate an arbitrary value to a 16-bit word
#[inline]
pub const fn word(value: i64) -> Word {
    (value & WORD_MASK as i64) as Word
}

/// Two's complement view of a word
#[inline]
pub const fn signed16(value: Word) -> SWord {
    value as SWord
}

/// Low 8 bits of an immediate, as stored in an I-format word
#[inline]
pub const fn imm8(value: i32) -> u8 {
    (value & IMM8_MASK) as u8
}

/// Sign-extend the low 8 bits of `value`
#[inline]
pub const fn sign_extend_8(value: i32) -> i32 {
    imm8(value) as i8 as i32
}

/// True when `value` is unchanged by 8-bit truncation and sign extension
#[inline]
pub const fn fits_imm8(value: i32) -> bool {
    sign_extend_8(value) == value
}

/// Effective address: `(base + sign_extend_8(imm)) mod 2^16`
///
/// `base` is the value already read from the base register (0 for `$0`).
#[inline]
pub const fn effective_address(base: Word, imm: i32) -> Word {
    word(base as i64 + sign_extend_8(imm) as i64)
}
