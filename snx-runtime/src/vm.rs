//! SN/X simulator

use crate::error::{Result, RuntimeError};
use crate::execute::{execute, Machine};
use crate::hooks::{HookResult, Hooks, OobEvent, TraceEvent};
use crate::io::IoHandler;
use crate::memory::Memory;
use crate::state::MachineState;
use serde::{Deserialize, Serialize};
use snx_spec::{CompileResult, Config, IrProgram, Word};
use tracing::{debug, trace};

/// How a bounded run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Steps executed during this call
    pub steps: u64,
    pub halted: bool,
}

/// Fetch-decode-execute loop over a lowered program
///
/// Starts at PC 0 with every register and memory cell zero. Runs until HLT;
/// fetching outside the program or a failing hook is fatal.
pub struct Simulator {
    program: IrProgram,
    config: Config,
    state: MachineState,
    memory: Memory,
    io: IoHandler,
    hooks: Hooks,
}

impl Simulator {
    /// Simulator over `program`, which must only name registers below
    /// `config.reg_count`
    pub fn new(program: IrProgram, config: Config) -> Result<Self> {
        config.validate()?;
        check_registers(&program, config.reg_count)?;
        Ok(Self {
            program,
            config,
            state: MachineState::new(config.reg_count),
            memory: Memory::new(config.mem_size),
            io: IoHandler::default(),
            hooks: Hooks::default(),
        })
    }

    /// Build from a compile result, refusing any result with errors
    pub fn from_compile_result(result: &CompileResult) -> Result<Self> {
        if result.has_errors() {
            return Err(RuntimeError::ProgramHasErrors {
                count: result.errors().count(),
            });
        }
        let program = result.ir.clone().ok_or(RuntimeError::NoProgram)?;
        Self::new(program, result.config)
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = Word>) -> Self {
        self.io.push_inputs(inputs);
        self
    }

    pub fn with_input_fn(mut self, f: impl FnMut() -> HookResult<Word> + 'static) -> Self {
        self.hooks.input = Some(Box::new(f));
        self
    }

    pub fn with_output_fn(mut self, f: impl FnMut(Word) -> HookResult + 'static) -> Self {
        self.hooks.output = Some(Box::new(f));
        self
    }

    pub fn with_oob_hook(mut self, f: impl FnMut(&OobEvent<'_>) -> HookResult + 'static) -> Self {
        self.hooks.oob = Some(Box::new(f));
        self
    }

    pub fn with_trace_hook(
        mut self,
        f: impl FnMut(&TraceEvent<'_>) -> HookResult + 'static,
    ) -> Self {
        self.hooks.trace = Some(Box::new(f));
        self
    }

    /// Execute one instruction; `Ok(false)` once halted
    pub fn step(&mut self) -> Result<bool> {
        if self.state.halted {
            return Ok(false);
        }

        let pc = self.state.pc;
        let ir = self.program.get(pc).ok_or(RuntimeError::PcOutOfBounds {
            pc,
            len: self.program.len(),
        })?;

        let mut machine = Machine {
            state: &mut self.state,
            memory: &mut self.memory,
            io: &mut self.io,
            hooks: &mut self.hooks,
        };
        execute(ir, &mut machine)?;
        self.state.steps += 1;

        trace!(pc, next_pc = self.state.pc, inst = %ir.text, "step");

        if let Some(hook) = self.hooks.trace.as_mut() {
            let event = TraceEvent {
                pc,
                next_pc: self.state.pc,
                text: &ir.text,
                registers: self.state.registers(),
            };
            hook(&event).map_err(|source| RuntimeError::Hook {
                hook: "trace",
                pc,
                source,
            })?;
        }

        if self.state.halted {
            debug!(pc, steps = self.state.steps, "halted");
        }
        Ok(!self.state.halted)
    }

    /// Run until HLT
    pub fn run(&mut self) -> Result<RunOutcome> {
        let start = self.state.steps;
        while self.step()? {}
        Ok(RunOutcome {
            steps: self.state.steps - start,
            halted: true,
        })
    }

    /// Run at most `max_steps` instructions
    pub fn run_for(&mut self, max_steps: u64) -> Result<RunOutcome> {
        let start = self.state.steps;
        while !self.state.halted && self.state.steps - start < max_steps {
            self.step()?;
        }
        Ok(RunOutcome {
            steps: self.state.steps - start,
            halted: self.state.halted,
        })
    }

    /// Registers, PC and step count as one snapshot
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn pc(&self) -> u32 {
        self.state.pc
    }

    pub fn registers(&self) -> &[Word] {
        self.state.registers()
    }

    pub fn registers_written(&self) -> &[bool] {
        self.state.written()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn outputs(&self) -> &[Word] {
        self.io.outputs()
    }

    pub fn pending_inputs(&self) -> usize {
        self.io.pending_inputs()
    }

    pub fn take_outputs(&mut self) -> Vec<Word> {
        self.io.take_outputs()
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    pub fn steps(&self) -> u64 {
        self.state.steps
    }

    pub fn program(&self) -> &IrProgram {
        &self.program
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Reject a program naming a register outside the configured file
fn check_registers(program: &IrProgram, reg_count: u8) -> Result<()> {
    for ir in &program.instructions {
        let used = ir.inst.reads().into_iter().chain(ir.inst.writes());
        for register in used {
            if register.index() >= reg_count as usize {
                return Err(RuntimeError::RegisterOutOfRange {
                    pc: ir.pc,
                    register,
                    reg_count,
                });
            }
        }
    }
    Ok(())
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
