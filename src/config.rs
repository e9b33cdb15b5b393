use crate::mutation::Decree;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of in-flight window entries, matching the replica's
/// prepare-list sizing.
pub const DEFAULT_WINDOW_CAPACITY: usize = 200;

/// Error raised while validating batch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("window capacity must be at least 1")]
    ZeroCapacity,
}

/// Configures one duplication stream's mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationBatchConfig {
    /// Decree the committed frontier starts at; everything at or below it is
    /// treated as already duplicated.
    pub start_decree: Decree,
    /// Maximum number of admitted, uncommitted decrees held at once.
    pub window_capacity: usize,
}

impl Default for MutationBatchConfig {
    fn default() -> Self {
        Self {
            start_decree: 0,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

impl MutationBatchConfig {
    /// Creates a config with an explicit frontier start and window capacity.
    pub fn new(start_decree: Decree, window_capacity: usize) -> Self {
        Self {
            start_decree,
            window_capacity,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}
