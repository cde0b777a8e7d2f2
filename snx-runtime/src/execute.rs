//! Instruction execution
//!
//! All arithmetic is on 16-bit words with wraparound. The effective address
//! of an I-format operand is `base + sign_extend_8(imm)`, masked to 16 bits,
//! where a `$0` base contributes 0.

use crate::error::{Result, RuntimeError};
use crate::hooks::{AccessKind, Hooks, OobEvent};
use crate::io::IoHandler;
use crate::memory::Memory;
use crate::state::MachineState;
use snx_spec::word::{effective_address, signed16, word};
use snx_spec::{Address, AluOp, BalTarget, IForm, Instruction, IrInstruction, UnaryOp, Word};
use tracing::warn;

/// Everything an instruction may touch
pub struct Machine<'a> {
    pub state: &'a mut MachineState,
    pub memory: &'a mut Memory,
    pub io: &'a mut IoHandler,
    pub hooks: &'a mut Hooks,
}

impl Machine<'_> {
    fn ea(&self, addr: &Address) -> Word {
        effective_address(self.state.base_value(addr.base), addr.imm)
    }

    fn hook_failed(hook: &'static str, pc: u32, source: crate::hooks::HookError) -> RuntimeError {
        warn!(hook, pc, error = %source, "hook failed");
        RuntimeError::Hook { hook, pc, source }
    }

    /// Report an out-of-range access to the OOB hook
    fn out_of_bounds(&mut self, ir: &IrInstruction, kind: AccessKind, address: Word) -> Result<()> {
        warn!(pc = ir.pc, %kind, address, "memory access out of bounds");
        if let Some(hook) = self.hooks.oob.as_mut() {
            let event = OobEvent {
                kind,
                address,
                pc: ir.pc,
                text: &ir.text,
                mem_size: self.memory.size(),
            };
            hook(&event).map_err(|e| Self::hook_failed("oob", ir.pc, e))?;
        }
        Ok(())
    }

    fn input(&mut self, pc: u32) -> Result<Word> {
        if let Some(hook) = self.hooks.input.as_mut() {
            return hook().map_err(|e| Self::hook_failed("input", pc, e));
        }
        Ok(self.io.read().unwrap_or(0))
    }

    fn output(&mut self, pc: u32, value: Word) -> Result<()> {
        self.io.write(value);
        if let Some(hook) = self.hooks.output.as_mut() {
            hook(value).map_err(|e| Self::hook_failed("output", pc, e))?;
        }
        Ok(())
    }
}

/// Execute one instruction and advance the PC
pub fn execute(ir: &IrInstruction, m: &mut Machine<'_>) -> Result<()> {
    let pc = ir.pc;
    let mut next_pc = pc + 1;

    match &ir.inst {
        Instruction::R {
            op,
            dest,
            src1,
            src2,
        } => {
            let a = m.state.read_reg(*src1);
            let b = m.state.read_reg(*src2);
            let value = match op {
                AluOp::Add => a.wrapping_add(b),
                AluOp::And => a & b,
                AluOp::Sub => a.wrapping_sub(b),
                AluOp::Slt => (signed16(a) < signed16(b)) as Word,
            };
            m.state.write_reg(*dest, value);
        }

        Instruction::R1 { op, dest, src } => {
            let a = m.state.read_reg(*src);
            let value = match op {
                UnaryOp::Not => !a,
                UnaryOp::Sr => a >> 1,
            };
            m.state.write_reg(*dest, value);
        }

        Instruction::R0 => {
            m.state.halt();
            next_pc = pc;
        }

        Instruction::I(form) => match form {
            IForm::Ld { dest, addr } => {
                let address = m.ea(addr);
                let value = match m.memory.load(address) {
                    Some(value) => value,
                    None => {
                        m.out_of_bounds(ir, AccessKind::Load, address)?;
                        0
                    }
                };
                m.state.write_reg(*dest, value);
            }
            IForm::St { src, addr } => {
                let address = m.ea(addr);
                let value = m.state.read_reg(*src);
                if !m.memory.store(address, value) {
                    m.out_of_bounds(ir, AccessKind::Store, address)?;
                }
            }
            IForm::Lda { dest, addr } => {
                let address = m.ea(addr);
                m.state.write_reg(*dest, address);
            }
            IForm::In { dest } => {
                let value = m.input(pc)?;
                m.state.write_reg(*dest, value);
            }
            IForm::Out { src } => {
                let value = m.state.read_reg(*src);
                m.output(pc, value)?;
            }
            IForm::Bz { cond, target } => {
                if m.state.read_reg(*cond) == 0 {
                    next_pc = target.pc;
                }
            }
            IForm::Bal { link, target } => {
                // target first: the link may be the base register
                next_pc = match target {
                    BalTarget::Label(label) => label.pc,
                    BalTarget::Address(addr) => m.ea(addr) as u32,
                };
                m.state.write_reg(*link, word(pc as i64 + 1));
            }
        },
    }

    m.state.pc = next_pc;
    Ok(())
}
