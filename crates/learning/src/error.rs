use std::error::Error as StdError;

use cartpole_core::ConfigError;
use cartpole_solvers::batch;

/// Errors that can occur while discretizing, sampling, or looking ahead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("batch size must be between 1 and {space_size}, got {requested}")]
    InvalidBatchSize { requested: usize, space_size: usize },

    #[error("batch integration failed: {0}")]
    Batch(#[from] batch::Error),

    #[error("optimizer returned {got} inputs for a batch of {expected}")]
    InputCount { expected: usize, got: usize },

    #[error("optimizer failed: {0}")]
    Optimizer(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn optimizer<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Optimizer(Box::new(err))
    }
}
