//! Runtime error types for the SN/X simulator

use crate::hooks::HookError;
use snx_spec::{ConfigError, Register};
use thiserror::Error;

/// Fatal simulator faults
///
/// Out-of-bounds memory access is not a fault; it is handled by the OOB
/// policy and only surfaces here when an OOB hook fails.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("PC {pc} is outside the program ({len} instruction(s))")]
    PcOutOfBounds { pc: u32, len: usize },

    #[error("{hook} hook failed at PC {pc}: {source}")]
    Hook {
        hook: &'static str,
        pc: u32,
        #[source]
        source: HookError,
    },

    #[error("Program has {count} error(s) and cannot be run")]
    ProgramHasErrors { count: usize },

    #[error("PC {pc} names register {register}, outside a file of {reg_count}")]
    RegisterOutOfRange {
        pc: u32,
        register: Register,
        reg_count: u8,
    },

    #[error("Compile result carries no program")]
    NoProgram,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
