//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use snx_spec::{Config, ConfigError, Word, DEFAULT_REG_COUNT};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Assembler, static checker, disassembler and simulator for the SN/X
16-bit teaching processor.

Source files are checked before anything is encoded or run. Warnings are
printed but never block; any error stops the command with exit status 1.";

#[derive(Parser, Debug)]
#[command(
    name = "snx",
    version = VERSION,
    about = "SN/X toolchain: check, encode, disassemble and run SN/X programs",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[command(flatten)]
    pub machine: MachineArgs,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        long_help = "Raise log verbosity. -v logs compiler stages, -vv logs every simulator step. RUST_LOG overrides this."
    )]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct MachineArgs {
    #[arg(
        long = "reg-count",
        value_name = "N",
        default_value_t = DEFAULT_REG_COUNT,
        global = true,
        help = "Number of general registers"
    )]
    pub reg_count: u8,
    #[arg(
        long = "mem-size",
        value_name = "WORDS",
        default_value_t = Config::DEFAULT.mem_size,
        global = true,
        help = "Data memory size in words"
    )]
    pub mem_size: u32,
}

impl MachineArgs {
    pub fn config(&self) -> Result<Config, ConfigError> {
        Config::new(self.reg_count, self.mem_size)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the static checks and print every diagnostic
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Assemble and simulate a program
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Assemble a program into a memory image
    Encode {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(
            short = 'f',
            long = "format",
            value_enum,
            default_value_t = ImageFormat::Hex
        )]
        format: ImageFormat,
        #[arg(
            short = 'o',
            long = "outfile",
            value_name = "OUT",
            help = "Write the image to OUT instead of stdout"
        )]
        output: Option<PathBuf>,
    },
    /// Disassemble a hex word listing
    Disasm {
        #[arg(value_name = "HEXFILE")]
        file: PathBuf,
    },
    /// Check and trace the bundled recursive sample program
    Sample {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long = "trace", action = ArgAction::SetTrue, help = "Print a register table row per step")]
    pub trace: bool,
    #[arg(
        long = "max-steps",
        value_name = "N",
        help = "Stop after N steps even if the program has not halted"
    )]
    pub max_steps: Option<u64>,
    #[arg(
        long = "input",
        value_name = "WORDS",
        value_delimiter = ',',
        help = "Comma-separated values queued for IN"
    )]
    pub inputs: Vec<Word>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ImageFormat {
    /// `%04X` words, eight per line
    #[default]
    Hex,
    /// Intel HEX records
    IntelHex,
    /// Raw big-endian bytes
    Bin,
}
