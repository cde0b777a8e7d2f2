//! # Diagnostics
//!
//! Every stage (parse, lowering, range checks, CFG, dataflow) reports
//! problems as [`Diagnostic`] values appended to one ordered list. Codes are
//! stable; messages are free text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage that owns a diagnostic code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Parse,
    Lower,
    Range,
    Cfg,
    Dataflow,
}

/// Stable diagnostic code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Code {
    /// Invalid character
    L001,
    /// `$` without a register number
    L002,
    /// Unexpected token
    P001,
    /// Malformed address operand
    P002,
    /// Number out of range
    P003,
    /// Unknown mnemonic
    S001,
    /// Wrong operand count
    S002,
    /// Wrong operand kind
    S003,
    /// Undefined label
    S004,
    /// Register index out of range
    S005,
    /// Duplicate label
    S006,
    /// Absolute address outside memory
    M001,
    /// Immediate truncated to 8 bits
    I001,
    /// Label branch target that overflows the 10-bit field
    B001,
    /// Unreachable code
    W001,
    /// No path to an exit
    W002,
    /// Control may leave the program
    W003,
    /// Read of an uninitialized register
    D001,
    /// Read of a maybe-uninitialized register
    D002,
    /// Read of an uninitialized memory cell
    D003,
    /// Read of a maybe-uninitialized memory cell
    D004,
    /// Return through a register without a valid return address
    C002,
}

impl Code {
    pub const fn as_str(self) -> &'static str {
        match self {
            Code::L001 => "L001",
            Code::L002 => "L002",
            Code::P001 => "P001",
            Code::P002 => "P002",
            Code::P003 => "P003",
            Code::S001 => "S001",
            Code::S002 => "S002",
            Code::S003 => "S003",
            Code::S004 => "S004",
            Code::S005 => "S005",
            Code::S006 => "S006",
            Code::M001 => "M001",
            Code::I001 => "I001",
            Code::B001 => "B001",
            Code::W001 => "W001",
            Code::W002 => "W002",
            Code::W003 => "W003",
            Code::D001 => "D001",
            Code::D002 => "D002",
            Code::D003 => "D003",
            Code::D004 => "D004",
            Code::C002 => "C002",
        }
    }

    /// Severity every diagnostic with this code carries
    pub const fn severity(self) -> Severity {
        match self {
            Code::I001
            | Code::B001
            | Code::W001
            | Code::W002
            | Code::W003
            | Code::D002
            | Code::D004 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub const fn stage(self) -> Stage {
        match self {
            Code::L001 | Code::L002 | Code::P001 | Code::P002 | Code::P003 => Stage::Parse,
            Code::S001 | Code::S002 | Code::S003 | Code::S004 | Code::S005 | Code::S006 => {
                Stage::Lower
            }
            Code::M001 | Code::I001 | Code::B001 => Stage::Range,
            Code::W001 | Code::W002 | Code::W003 => Stage::Cfg,
            Code::D001 | Code::D002 | Code::D003 | Code::D004 | Code::C002 => Stage::Dataflow,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location: 1-based line, 1-based column range (end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl SourceSpan {
    pub const fn new(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            line,
            start_col,
            end_col,
        }
    }

    /// Smallest span covering both `self` and `other` on the same line
    pub fn to(self, other: SourceSpan) -> Self {
        Self {
            line: self.line,
            start_col: self.start_col.min(other.start_col),
            end_col: self.end_col.max(other.end_col),
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.line, self.start_col, self.end_col)
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Code,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub pc: Option<u32>,
}

impl Diagnostic {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            span: None,
            pc: None,
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_pc(mut self, pc: u32) -> Self {
        self.pc = Some(pc);
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    #[inline]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.message)?;
        match (self.span, self.pc) {
            (Some(span), Some(pc)) => write!(f, " at {} (pc {})", span, pc),
            (Some(span), None) => write!(f, " at {}", span),
            (None, Some(pc)) => write!(f, " at pc {}", pc),
            (None, None) => Ok(()),
        }
    }
}

/// Ordered diagnostic collector shared by the pipeline stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Record a diagnostic located at an instruction
    pub fn report(&mut self, code: Code, message: impl Into<String>, span: SourceSpan, pc: u32) {
        self.push(Diagnostic::new(code, message).with_span(span).with_pc(pc));
    }

    /// Record a diagnostic located in source text only
    pub fn report_at(&mut self, code: Code, message: impl Into<String>, span: SourceSpan) {
        self.push(Diagnostic::new(code, message).with_span(span));
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Render a report grouped by severity, errors first
///
/// `label` names the program (usually a file name) in the heading.
pub fn format_report(diagnostics: &[Diagnostic], label: &str) -> String {
    if diagnostics.is_empty() {
        return format!("{}: no issues found", label);
    }

    let errors: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.is_error()).collect();
    let warnings: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.is_warning()).collect();

    let mut lines = Vec::new();
    if !errors.is_empty() {
        lines.push(format!("=== {}: {} error(s) ===", label, errors.len()));
        lines.extend(errors.iter().map(|d| d.to_string()));
    }
    if !warnings.is_empty() {
        lines.push(format!("=== {}: {} warning(s) ===", label, warnings.len()));
        lines.extend(warnings.iter().map(|d| d.to_string()));
    }
    lines.join("\n")
}
