//! # SN/X Specification
//!
//! 16-bit fixed-width educational processor: IR model, bit layout and the
//! static checks every program passes before it is encoded or executed.
//!
//! ## Key Features
//! - 16-bit words, 16-bit instructions, word-addressed memory
//! - Configurable register file (default 4) and memory size (default 64K words)
//! - Four formats (R, R1, R0, I) over 14 opcodes
//! - CFG and dataflow checks with stable diagnostic codes
//! - Label branch encoding compatible with the reference assembler, overflow included

pub mod analyzer;
pub mod cfg;
pub mod config;
pub mod dataflow;
pub mod diagnostic;
pub mod encoding;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod register;
pub mod result;
pub mod validation;
pub mod word;

pub use analyzer::{check_program, CheckOutput};
pub use cfg::{build_cfg, BasicBlock, BlockId, Cfg, Edge, EdgeKind, EdgeTarget};
pub use config::{Config, ConfigError, MAX_MEM_SIZE};
pub use dataflow::{DataflowResult, Fact, InitState, Slot, STACK_POINTER};
pub use diagnostic::{format_report, Code, Diagnostic, Diagnostics, Severity, SourceSpan, Stage};
pub use error::SnxError;
pub use instruction::{Address, AluOp, BalTarget, IForm, Instruction, LabelRef, UnaryOp};
pub use opcode::{Format, Opcode};
pub use program::{IrInstruction, IrProgram};
pub use register::{Register, DEFAULT_REG_COUNT, MAX_REG_COUNT};
pub use result::CompileResult;

/// Machine word (16-bit)
pub type Word = u16;

/// Signed view of a word, used by SLT
pub type SWord = i16;

/// Result alias for fallible operations in this crate
pub type Result<T> = std::result::Result<T, SnxError>;
