//! Errors reported by the mining engine.

/// Errors raised by [`crate::miner`] and [`crate::rules`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MiningError {
    #[error("{name} must be in (0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("{name} must be at least 1, got {value}")]
    InvalidLength { name: &'static str, value: usize },

    #[error("occurrence table row {row} has {found} cells, expected {expected}")]
    MalformedInput {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("itemset {0:?} is missing from the frequent itemset collection")]
    MissingSubset(Vec<String>),

    #[error("Mining cancelled")]
    Cancelled,
}

/// Checks that `value` lies in (0, 1]. NaN is rejected.
pub(crate) fn validate_fraction(name: &'static str, value: f64) -> Result<f64, MiningError> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(MiningError::InvalidThreshold { name, value })
    }
}

pub(crate) fn validate_length(name: &'static str, value: usize) -> Result<usize, MiningError> {
    if value == 0 {
        Err(MiningError::InvalidLength { name, value })
    } else {
        Ok(value)
    }
}
