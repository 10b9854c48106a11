//! Batched Heun integrator over many independent cart-pole states.
//!
//! A batch is a `4×N` array whose columns are states in
//! `(position, angle, velocity, angular_velocity)` row order, paired with an
//! `N`-vector of inputs. Every column evolves under its own input with the
//! same scheme and equations as [`CartPoleSystem`], and no column ever reads
//! another, so results do not depend on how the batch is split across
//! threads.
//!
//! The sub-step length is derived from the input rate:
//! `dt = 1 / (dynamics_steps_per_input · input_rate_hz)`, which equals
//! `input_timestep / dynamics_steps_per_input`.
//!
//! By default the angle row of the result is wrapped into `[0, 2π)` to match
//! the single-system path. [`BatchIntegrator::normalize_angles`] turns that
//! off for callers that want the raw integrated angles.
//!
//! [`CartPoleSystem`]: crate::system::CartPoleSystem

mod error;
mod kernel;

pub use error::Error;

use cartpole_core::{CartPole, SystemConfiguration, normalize_angle};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use tracing::trace;

use kernel::{Kernel, Scratch};

/// Number of state components per batch column.
pub const STATE_ROWS: usize = 4;

/// How a batch is split across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// Integrate the whole batch on the calling thread, reusing scratch
    /// buffers between calls.
    #[default]
    Sequential,

    /// Split columns into chunks integrated on the `rayon` thread pool.
    ///
    /// Chunks hold at least `min_chunk` columns.
    Rayon { min_chunk: usize },
}

/// Advances batches of states by one control period.
#[derive(Debug, Clone)]
pub struct BatchIntegrator {
    kernel: Kernel,
    normalize_angles: bool,
    parallelism: Parallelism,
    scratch: Scratch,
}

impl BatchIntegrator {
    /// Creates an integrator for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(config: &SystemConfiguration) -> Result<Self, Error> {
        config.validate()?;
        let steps = config.dynamics_steps_per_input;
        Ok(Self {
            kernel: Kernel {
                model: CartPole::new(&config.parameters),
                dt: 1.0 / (steps as f64 * config.input_rate_hz()),
                steps,
            },
            normalize_angles: true,
            parallelism: Parallelism::Sequential,
            scratch: Scratch::default(),
        })
    }

    /// Sets whether result angles are wrapped into `[0, 2π)`.
    #[must_use]
    pub fn normalize_angles(mut self, normalize: bool) -> Self {
        self.normalize_angles = normalize;
        self
    }

    /// Sets how batches are split across threads.
    #[must_use]
    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Length of one numerical sub-step in seconds.
    #[must_use]
    pub fn dynamics_timestep(&self) -> f64 {
        self.kernel.dt
    }

    /// Returns the successor of every column of `states` under the matching
    /// entry of `inputs`.
    ///
    /// `states` is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `states` does not have
    /// [`STATE_ROWS`] rows or `inputs` does not have one entry per column.
    pub fn advance(
        &mut self,
        states: ArrayView2<'_, f64>,
        inputs: ArrayView1<'_, f64>,
    ) -> Result<Array2<f64>, Error> {
        if states.nrows() != STATE_ROWS || inputs.len() != states.ncols() {
            return Err(Error::ShapeMismatch {
                rows: states.nrows(),
                columns: states.ncols(),
                inputs: inputs.len(),
            });
        }

        trace!(
            batch = states.ncols(),
            steps = self.kernel.steps,
            parallelism = ?self.parallelism,
            "Advancing batch"
        );

        let mut next = states.to_owned();
        match self.parallelism {
            Parallelism::Sequential => {
                self.kernel
                    .advance_block(next.view_mut(), inputs, &mut self.scratch);
            }
            Parallelism::Rayon { min_chunk } => {
                let kernel = self.kernel;
                let chunk = chunk_size(states.ncols(), min_chunk);
                next.axis_chunks_iter_mut(Axis(1), chunk)
                    .into_par_iter()
                    .zip(inputs.axis_chunks_iter(Axis(0), chunk).into_par_iter())
                    .for_each(|(block, block_inputs)| {
                        let mut scratch = Scratch::default();
                        kernel.advance_block(block, block_inputs, &mut scratch);
                    });
            }
        }

        if self.normalize_angles {
            next.row_mut(1).mapv_inplace(normalize_angle);
        }
        Ok(next)
    }

    /// Advances every column of `states` under the same `input`.
    ///
    /// # Errors
    ///
    /// See [`BatchIntegrator::advance`].
    pub fn advance_uniform(
        &mut self,
        states: ArrayView2<'_, f64>,
        input: f64,
    ) -> Result<Array2<f64>, Error> {
        let inputs = Array1::from_elem(states.ncols(), input);
        self.advance(states, inputs.view())
    }
}

/// Advances a batch of states by one control period.
///
/// Builds a fresh sequential [`BatchIntegrator`] for the call; keep an
/// integrator around instead when advancing many batches.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] for an invalid `config` and
/// [`Error::ShapeMismatch`] for mismatched `states` and `inputs`.
pub fn advance_batch(
    states: ArrayView2<'_, f64>,
    inputs: ArrayView1<'_, f64>,
    config: &SystemConfiguration,
) -> Result<Array2<f64>, Error> {
    BatchIntegrator::new(config)?.advance(states, inputs)
}

fn chunk_size(columns: usize, min_chunk: usize) -> usize {
    let per_thread = columns.div_ceil(rayon::current_num_threads().max(1));
    per_thread.max(min_chunk).max(1)
}
