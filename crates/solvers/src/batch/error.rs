use cartpole_core::ConfigError;

/// Errors that can occur when building or running a [`BatchIntegrator`].
///
/// [`BatchIntegrator`]: super::BatchIntegrator
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("expected a 4×N state batch with N inputs, got {rows}×{columns} states and {inputs} inputs")]
    ShapeMismatch {
        rows: usize,
        columns: usize,
        inputs: usize,
    },
}
