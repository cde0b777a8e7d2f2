//! `snx` command-line driver.

mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ImageFormat, RunArgs};
use snx_assembler::{compile, encode_program};
use snx_disassembler::disassemble_file;
use snx_runtime::trace::{format_header, format_row, format_separator};
use snx_runtime::{Simulator, SAMPLE_PROGRAM};
use snx_spec::{CompileResult, Config};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Run the selected subcommand; `Ok(false)` means it completed but failed
fn dispatch(cli: &Cli) -> Result<bool> {
    let config = cli.machine.config().context("invalid machine configuration")?;
    debug!(reg_count = config.reg_count, mem_size = config.mem_size, "config");

    match &cli.command {
        Command::Check { file } => {
            let (label, result) = compile_path(file, &config)?;
            print!("{}", result.format_diagnostics(&label));
            Ok(!result.has_errors())
        }
        Command::Run { file, run } => {
            let (label, result) = compile_path(file, &config)?;
            simulate(&label, &result, run)
        }
        Command::Encode {
            file,
            format,
            output,
        } => {
            let (label, result) = compile_path(file, &config)?;
            let Some(ir) = result.runnable() else {
                eprint!("{}", result.format_diagnostics(&label));
                return Ok(false);
            };
            report_warnings(&label, &result);

            let image = encode_program(ir);
            let bytes = match format {
                ImageFormat::Hex => image.to_hex(8).into_bytes(),
                ImageFormat::IntelHex => image.to_intel_hex().into_bytes(),
                ImageFormat::Bin => image.to_bytes(),
            };
            match output {
                Some(path) => fs::write(path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => io::stdout().write_all(&bytes)?,
            }
            debug!(words = image.len(), digest = %image.digest(), "encoded");
            Ok(true)
        }
        Command::Disasm { file } => {
            let listing = disassemble_file(file)
                .with_context(|| format!("failed to disassemble {}", file.display()))?;
            print!("{listing}");
            Ok(true)
        }
        Command::Sample { run } => {
            let result = compile(SAMPLE_PROGRAM, &config);
            print!("{}", result.format_diagnostics("<sample>"));
            simulate("<sample>", &result, run)
        }
    }
}

fn compile_path(path: &Path, config: &Config) -> Result<(String, CompileResult)> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok((path.display().to_string(), compile(&source, config)))
}

fn report_warnings(label: &str, result: &CompileResult) {
    if result.has_warnings() {
        eprint!("{}", result.format_diagnostics(label));
    }
}

fn simulate(label: &str, result: &CompileResult, args: &RunArgs) -> Result<bool> {
    if result.has_errors() {
        eprint!("{}", result.format_diagnostics(label));
        return Ok(false);
    }

    let mut sim = Simulator::from_compile_result(result)?
        .with_inputs(args.inputs.iter().copied())
        .with_output_fn(|value| {
            println!("OUT: {value}");
            Ok(())
        });
    let reg_count = sim.config().reg_count as usize;

    if args.trace {
        println!("{}", format_header(reg_count));
        println!("{}", format_separator(reg_count));
    }

    let limit = args.max_steps.unwrap_or(u64::MAX);
    while !sim.is_halted() && sim.steps() < limit {
        let pc = sim.pc();
        let text = match sim.program().get(pc) {
            Some(ir) => ir.text.clone(),
            None => String::new(),
        };
        sim.step()
            .with_context(|| format!("simulation stopped at PC {pc}"))?;
        if args.trace {
            println!(
                "{}",
                format_row(pc, &text, sim.registers(), sim.registers_written())
            );
        }
    }

    if sim.pending_inputs() > 0 {
        debug!(unread = sim.pending_inputs(), "inputs left over");
    }

    let regs: Vec<String> = sim
        .registers()
        .iter()
        .enumerate()
        .map(|(i, v)| format!("${i}={v}"))
        .collect();
    println!("{}", regs.join(" "));

    if sim.is_halted() {
        println!("halted at PC {} after {} step(s)", sim.pc(), sim.steps());
        Ok(true)
    } else {
        bail!("step limit reached at PC {} after {} step(s)", sim.pc(), sim.steps())
    }
}
