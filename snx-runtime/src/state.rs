//! Register file and control state

use serde::{Deserialize, Serialize};
use snx_spec::{Register, Word};

/// Machine state outside of memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    registers: Vec<Word>,
    /// Register has been written at least once
    written: Vec<bool>,

    pub pc: u32,
    pub halted: bool,

    /// Instructions executed so far, HLT included
    pub steps: u64,
}

impl MachineState {
    pub fn new(reg_count: u8) -> Self {
        Self {
            registers: vec![0; reg_count as usize],
            written: vec![false; reg_count as usize],
            pc: 0,
            halted: false,
            steps: 0,
        }
    }

    #[inline]
    pub fn read_reg(&self, reg: Register) -> Word {
        self.registers.get(reg.index()).copied().unwrap_or(0)
    }

    /// Value a register contributes as an address base (`$0` means 0)
    #[inline]
    pub fn base_value(&self, reg: Register) -> Word {
        if reg.is_zero() {
            0
        } else {
            self.read_reg(reg)
        }
    }

    #[inline]
    pub fn write_reg(&mut self, reg: Register, value: Word) {
        if let Some(slot) = self.registers.get_mut(reg.index()) {
            *slot = value;
            self.written[reg.index()] = true;
        }
    }

    pub fn registers(&self) -> &[Word] {
        &self.registers
    }

    pub fn written(&self) -> &[bool] {
        &self.written
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }
}
