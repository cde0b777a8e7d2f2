//! Register identifiers for SN/X
//!
//! The register file size is a [`Config`](crate::Config) parameter, so a
//! register is a plain index checked against the configured count during
//! lowering rather than a closed enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Architectural default register count
pub const DEFAULT_REG_COUNT: u8 = 4;

/// Upper bound accepted for a configured register file
pub const MAX_REG_COUNT: u8 = 16;

/// Register ($0..$n)
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Register(u8);

impl Register {
    /// `$0`: storage as an operand, constant zero as an address base
    pub const R0: Self = Self(0);
    pub const R1: Self = Self(1);
    pub const R2: Self = Self(2);
    pub const R3: Self = Self(3);

    #[inline]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Build a register if `index` is inside a file of `reg_count` registers
    #[inline]
    pub fn from_index(index: u32, reg_count: u8) -> Option<Self> {
        if index < reg_count as u32 {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0 as u16
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}
