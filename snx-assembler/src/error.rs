//! Assembler errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    /// Compilation reported errors; `report` is the formatted diagnostic listing
    #[error("compilation failed with {count} error(s)\n{report}")]
    CompileFailed { count: usize, report: String },

    #[error("Image length {0} is not a whole number of 16-bit words")]
    OddImageLength(usize),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AssemblerError {
    /// Diagnostic errors, as opposed to I/O or format trouble
    pub fn is_compile_error(&self) -> bool {
        matches!(self, AssemblerError::CompileFailed { .. })
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
