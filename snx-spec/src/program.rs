//! # IR Program
//!
//! Lowered, label-resolved program: instructions indexed by PC plus the
//! label map. A checked program can be persisted with bincode.

use crate::diagnostic::SourceSpan;
use crate::error::SnxError;
use crate::instruction::Instruction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Instruction at a fixed PC, with the source it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrInstruction {
    pub pc: u32,
    pub inst: Instruction,
    /// Original source text of the instruction (without label or comment)
    pub text: String,
    pub span: SourceSpan,
}

impl IrInstruction {
    pub fn new(pc: u32, inst: Instruction, text: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            pc,
            inst,
            text: text.into(),
            span,
        }
    }
}

/// Resolved program
///
/// Label names are stored uppercased; lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrProgram {
    pub instructions: Vec<IrInstruction>,
    pub labels: BTreeMap<String, u32>,
}

impl IrProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized form of a label name
    pub fn label_key(name: &str) -> String {
        name.to_ascii_uppercase()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `pc`
    pub fn get(&self, pc: u32) -> Option<&IrInstruction> {
        self.instructions.get(pc as usize)
    }

    /// Instruction at `pc`, or an error naming the program length
    pub fn fetch(&self, pc: u32) -> Result<&IrInstruction, SnxError> {
        self.get(pc).ok_or(SnxError::PcOutOfRange {
            pc,
            len: self.len(),
        })
    }

    pub fn label_pc(&self, name: &str) -> Option<u32> {
        self.labels.get(&Self::label_key(name)).copied()
    }

    /// Labels naming `pc`, in sorted order
    pub fn labels_at(&self, pc: u32) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|(_, &target)| target == pc)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Serialize to bincode bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnxError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from bincode bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnxError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ir in &self.instructions {
            for label in self.labels_at(ir.pc) {
                writeln!(f, "{}:", label)?;
            }
            writeln!(f, "{:5}  {}", ir.pc, ir.inst)?;
        }
        Ok(())
    }
}
