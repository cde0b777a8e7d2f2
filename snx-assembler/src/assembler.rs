//! Main assembler logic

use crate::encoder::{encode_program, Image};
use crate::error::{AssemblerError, Result};
use crate::lower::lower;
use crate::parser::parse;
use snx_spec::{check_program, CompileResult, Config, Diagnostics};
use std::path::Path;
use tracing::debug;

/// Run the whole front end on one source buffer
///
/// Parsing and lowering always run to the end of the buffer so every
/// syntax and semantic error is reported. The CFG and dataflow checks only
/// run when both were clean.
pub fn compile(source: &str, config: &Config) -> CompileResult {
    let mut diagnostics = Diagnostics::new();

    let ast = parse(source, &mut diagnostics);
    let parse_failed = diagnostics.has_errors();
    let lowered = lower(&ast, config, &mut diagnostics);
    let ir = if parse_failed { None } else { lowered };

    let cfg = ir.as_ref().map(|program| {
        let checked = check_program(program, config);
        diagnostics.extend(checked.diagnostics);
        checked.cfg
    });

    debug!(
        lines = ast.lines.len(),
        lowered = ir.is_some(),
        diagnostics = diagnostics.len(),
        errors = diagnostics.error_count(),
        "compiled"
    );

    CompileResult {
        ir,
        cfg,
        diagnostics: diagnostics.into_vec(),
        config: *config,
    }
}

/// Compile and encode, failing on any error diagnostic
pub fn assemble(source: &str, config: &Config) -> Result<Image> {
    let result = compile(source, config);
    match result.runnable() {
        Some(program) => Ok(encode_program(program)),
        None => Err(AssemblerError::CompileFailed {
            count: result.errors().count(),
            report: result.format_diagnostics("<source>"),
        }),
    }
}

/// Read and compile a source file
pub fn compile_file(path: impl AsRef<Path>, config: &Config) -> Result<CompileResult> {
    let source = std::fs::read_to_string(path)?;
    Ok(compile(&source, config))
}
