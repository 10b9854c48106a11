use cartpole_core::{ConfigError, HistoryError};

/// Errors that can occur while building or advancing a [`CartPoleSystem`].
///
/// [`CartPoleSystem`]: super::CartPoleSystem
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("target time {target} s is before the current simulation time {current} s")]
    InvalidTimeOrder { target: f64, current: f64 },

    #[error("target time must be finite, got {target}")]
    NonFiniteTime { target: f64 },

    #[error("history error: {0}")]
    History(#[from] HistoryError),
}
