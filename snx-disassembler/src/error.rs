//! Disassembler errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisassemblerError {
    #[error("Unknown opcode: 0x{0:X}")]
    UnknownOpcode(u8),

    #[error("Invalid hex word '{token}' on line {line}")]
    InvalidHex { line: usize, token: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
