//! Syntax tree produced by the parser and consumed by lowering

use snx_spec::SourceSpan;

/// Parsed source buffer, one entry per line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceProgram {
    pub lines: Vec<Line>,
}

impl SourceProgram {
    /// Lines that carry an instruction, in PC order
    pub fn instructions(&self) -> impl Iterator<Item = (&Line, &InstructionNode)> {
        self.lines
            .iter()
            .filter_map(|line| line.instruction.as_ref().map(|inst| (line, inst)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: u32,
    pub label: Option<LabelDef>,
    pub instruction: Option<InstructionNode>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDef {
    /// Name as written
    pub name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstructionNode {
    /// Mnemonic as written
    pub mnemonic: String,
    pub operands: Vec<Operand>,
    /// Normalized text: mnemonic and operands joined with ", "
    pub text: String,
    pub span: SourceSpan,
    /// The line had a lexical or syntax error; operands may be incomplete
    pub malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandKind {
    /// `$n`
    Register(u32),
    /// `imm($n)` or bare `imm` (base 0)
    Address { offset: i32, base: u32 },
    /// Identifier naming a label
    Label(String),
}

impl OperandKind {
    pub fn describe(&self) -> &'static str {
        match self {
            OperandKind::Register(_) => "register",
            OperandKind::Address { .. } => "address",
            OperandKind::Label(_) => "label",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    pub kind: OperandKind,
    pub text: String,
    pub span: SourceSpan,
}
