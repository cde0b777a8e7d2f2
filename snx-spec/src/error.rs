//! # Error Types for SN/X

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnxError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Program errors
    #[error("Program counter {pc} outside program of {len} instructions")]
    PcOutOfRange { pc: u32, len: usize },

    // Serialization errors
    #[error("IR serialization failed: {0}")]
    Serialization(#[from] bincode::Error),
}

impl SnxError {
    /// Check if this error comes from malformed input data rather than a bad setting
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            SnxError::PcOutOfRange { .. } | SnxError::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnxError::PcOutOfRange { pc: 7, len: 3 };
        assert_eq!(err.to_string(), "Program counter 7 outside program of 3 instructions");
        assert!(err.is_data_error());
    }

    #[test]
    fn test_from_config_error() {
        let err: SnxError = ConfigError::InvalidRegCount(0).into();
        assert!(matches!(err, SnxError::InvalidConfig(_)));
        assert!(!err.is_data_error());
    }
}
