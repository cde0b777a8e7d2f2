//! Outcome of compiling one source buffer

use crate::cfg::Cfg;
use crate::config::Config;
use crate::diagnostic::{format_report, Diagnostic};
use crate::program::IrProgram;

/// IR, CFG and the merged diagnostic report of one compilation
///
/// `ir` is `None` when lowering failed; `cfg` is `None` whenever `ir` is.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub ir: Option<IrProgram>,
    pub cfg: Option<Cfg>,
    pub diagnostics: Vec<Diagnostic>,
    pub config: Config,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Program ready to execute: present and free of errors
    pub fn runnable(&self) -> Option<&IrProgram> {
        if self.has_errors() {
            None
        } else {
            self.ir.as_ref()
        }
    }

    pub fn format_diagnostics(&self, label: &str) -> String {
        format_report(&self.diagnostics, label)
    }
}
