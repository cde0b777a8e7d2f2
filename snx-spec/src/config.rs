//! # Machine Configuration
//!
//! Register file size and memory size are passed explicitly to every stage
//! (lowering, checks, simulator). There is no global default state.

use crate::register::{DEFAULT_REG_COUNT, MAX_REG_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest memory the 16-bit address space can cover, in words
pub const MAX_MEM_SIZE: u32 = 1 << 16;

/// Machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config {
    /// Number of registers (1-16)
    pub reg_count: u8,
    /// Memory size in words (power of two, at most 65536)
    pub mem_size: u32,
}

impl Config {
    /// Default configuration: 4 registers, 64K words of memory
    pub const DEFAULT: Self = Self {
        reg_count: DEFAULT_REG_COUNT,
        mem_size: MAX_MEM_SIZE,
    };

    /// Create a new configuration with validation
    pub const fn new(reg_count: u8, mem_size: u32) -> Result<Self, ConfigError> {
        let config = Self {
            reg_count,
            mem_size,
        };

        if reg_count < 1 || reg_count > MAX_REG_COUNT {
            return Err(ConfigError::InvalidRegCount(reg_count));
        }
        if mem_size == 0 || mem_size > MAX_MEM_SIZE {
            return Err(ConfigError::InvalidMemSize(mem_size));
        }
        if !mem_size.is_power_of_two() {
            return Err(ConfigError::MemSizeNotPowerOfTwo(mem_size));
        }

        Ok(config)
    }

    /// Validate a configuration built by hand
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.reg_count, self.mem_size).map(|_| ())
    }

    /// True when `address` names a memory cell
    #[inline]
    pub const fn in_memory(&self, address: u32) -> bool {
        address < self.mem_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ registers: {}, memory: {} words }}",
            self.reg_count, self.mem_size
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Register count must be in range [1, 16]
    InvalidRegCount(u8),
    /// Memory size must be in range [1, 65536]
    InvalidMemSize(u32),
    /// Memory size must be a power of two
    MemSizeNotPowerOfTwo(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRegCount(n) => {
                write!(f, "reg_count must be in range [1, {}], got {}", MAX_REG_COUNT, n)
            }
            ConfigError::InvalidMemSize(n) => {
                write!(f, "mem_size must be in range [1, {}], got {}", MAX_MEM_SIZE, n)
            }
            ConfigError::MemSizeNotPowerOfTwo(n) => {
                write!(f, "mem_size must be a power of two, got {}", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::DEFAULT;
        assert_eq!(config.reg_count, 4);
        assert_eq!(config.mem_size, 65536);
        assert_eq!(Config::default(), config);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(Config::new(4, 128).is_ok());
        assert!(Config::new(16, 1).is_ok());
        assert!(Config::new(1, 65536).is_ok());

        assert_eq!(Config::new(0, 128).unwrap_err(), ConfigError::InvalidRegCount(0));
        assert_eq!(Config::new(17, 128).unwrap_err(), ConfigError::InvalidRegCount(17));
        assert_eq!(Config::new(4, 0).unwrap_err(), ConfigError::InvalidMemSize(0));
        assert_eq!(
            Config::new(4, 1 << 17).unwrap_err(),
            ConfigError::InvalidMemSize(1 << 17)
        );
        assert_eq!(
            Config::new(4, 100).unwrap_err(),
            ConfigError::MemSizeNotPowerOfTwo(100)
        );
    }

    #[test]
    fn test_in_memory() {
        let config = Config::new(4, 128).unwrap();
        assert!(config.in_memory(127));
        assert!(!config.in_memory(128));
    }

    #[test]
    fn test_display() {
        let s = Config::new(8, 256).unwrap().to_string();
        assert!(s.contains("registers: 8"));
        assert!(s.contains("256 words"));
    }
}
