//! # SN/X Runtime
//!
//! Instruction-level simulator for lowered SN/X programs.
//!
//! ## Features
//!
//! - 16-bit registers and word-addressed memory sized by `Config`
//! - Out-of-bounds loads read 0 and stores are dropped, after an optional OOB hook
//! - Input, output, OOB and trace hooks; a failing hook stops the run
//! - Per-register "written" flags for the trace table
//!
//! ## Example
//!
//! ```rust,ignore
//! use snx_runtime::Simulator;
//!
//! let result = snx_assembler::compile("main: LDA $1, 5($0)\n HLT", &Default::default());
//! let mut sim = Simulator::from_compile_result(&result).unwrap();
//! sim.run().unwrap();
//! assert_eq!(sim.registers()[1], 5);
//! ```

pub mod error;
pub mod execute;
pub mod hooks;
pub mod io;
pub mod memory;
pub mod sample;
pub mod state;
pub mod trace;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use hooks::{AccessKind, HookError, HookResult, Hooks, OobEvent, TraceEvent};
pub use io::IoHandler;
pub use memory::Memory;
pub use sample::SAMPLE_PROGRAM;
pub use state::MachineState;
pub use vm::{RunOutcome, Simulator};

use snx_spec::{Config, IrProgram, Word};

/// Run a program to HLT with queued inputs and return its outputs
pub fn run(program: IrProgram, config: Config, inputs: Vec<Word>) -> Result<Vec<Word>> {
    let mut sim = Simulator::new(program, config)?.with_inputs(inputs);
    sim.run()?;
    Ok(sim.take_outputs())
}
