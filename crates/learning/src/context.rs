use cartpole_core::SystemConfiguration;
use cartpole_solvers::batch::{BatchIntegrator, STATE_ROWS};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{CostFunctions, Discretizer, Error, InputOptimizer, LookaheadRequest};

/// Discretized state space plus a random batch drawn from it.
///
/// The batch starts empty (`4×0`) and is replaced wholesale by each call to
/// [`LearningContext::update_batch`]. Sampling is uniform with replacement,
/// so a batch may hold the same lattice state more than once.
#[derive(Debug)]
pub struct LearningContext<R = StdRng> {
    config: SystemConfiguration,
    discretizer: Discretizer,
    batch: Array2<f64>,
    batch_indices: Vec<usize>,
    costs: CostFunctions,
    integrator: BatchIntegrator,
    rng: R,
}

impl LearningContext<StdRng> {
    /// Creates a context sampling from an entropy-seeded generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn new(config: SystemConfiguration, costs: CostFunctions) -> Result<Self, Error> {
        Self::with_rng(config, costs, StdRng::from_entropy())
    }
}

impl<R: Rng> LearningContext<R> {
    /// Creates a context sampling from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn with_rng(
        config: SystemConfiguration,
        costs: CostFunctions,
        rng: R,
    ) -> Result<Self, Error> {
        let discretizer = Discretizer::new(&config)?;
        let integrator = BatchIntegrator::new(&config)?;
        Ok(Self {
            config,
            discretizer,
            batch: Array2::zeros((STATE_ROWS, 0)),
            batch_indices: Vec::new(),
            costs,
            integrator,
            rng,
        })
    }

    /// Replaces the batch with `batch_size` lattice states drawn uniformly at
    /// random, with replacement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBatchSize`] if `batch_size` is zero or exceeds
    /// the size of the state space. The current batch is kept in that case.
    pub fn update_batch(&mut self, batch_size: usize) -> Result<(), Error> {
        let space_size = self.discretizer.space_size();
        if batch_size == 0 || batch_size > space_size {
            return Err(Error::InvalidBatchSize {
                requested: batch_size,
                space_size,
            });
        }

        let rng = &mut self.rng;
        let indices: Vec<usize> = (0..batch_size)
            .map(|_| sample_index(rng, space_size))
            .collect();

        self.batch = self.discretizer.all_states().select(Axis(1), &indices);
        self.batch_indices = indices;

        debug!(batch_size, space_size, "Sampled new batch");
        Ok(())
    }

    /// The current `4×N` batch.
    #[must_use]
    pub fn batch(&self) -> ArrayView2<'_, f64> {
        self.batch.view()
    }

    /// Lattice column of each batch column.
    #[must_use]
    pub fn batch_indices(&self) -> &[usize] {
        &self.batch_indices
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch.ncols()
    }

    #[must_use]
    pub fn discretizer(&self) -> &Discretizer {
        &self.discretizer
    }

    #[must_use]
    pub fn config(&self) -> &SystemConfiguration {
        &self.config
    }

    #[must_use]
    pub fn costs(&self) -> &CostFunctions {
        &self.costs
    }

    /// State cost of every column of the current batch.
    #[must_use]
    pub fn state_costs(&self) -> Array1<f64> {
        self.costs.state_costs(self.batch.view())
    }

    /// Input cost of every entry of `inputs`.
    #[must_use]
    pub fn input_costs(&self, inputs: ArrayView1<'_, f64>) -> Array1<f64> {
        self.costs.input_costs(inputs)
    }

    /// Predicts the batch one control period ahead under `inputs`.
    ///
    /// The batch itself is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Batch`] if `inputs` does not hold one entry per
    /// batch column.
    pub fn advance_batch(&mut self, inputs: ArrayView1<'_, f64>) -> Result<Array2<f64>, Error> {
        Ok(self.integrator.advance(self.batch.view(), inputs)?)
    }

    /// Asks `optimizer` for the best cart acceleration of every batch state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Optimizer`] if the optimizer fails and
    /// [`Error::InputCount`] if it answers with the wrong number of inputs.
    pub fn best_accelerations<O: InputOptimizer>(
        &mut self,
        optimizer: &mut O,
    ) -> Result<Array1<f64>, Error> {
        let request = LookaheadRequest {
            states: self.batch.view(),
            candidates: self.discretizer.cart_accelerations(),
            costs: &self.costs,
            integrator: &mut self.integrator,
        };
        let inputs = optimizer.best_inputs(request).map_err(Error::optimizer)?;

        let expected = self.batch.ncols();
        if inputs.len() != expected {
            return Err(Error::InputCount {
                expected,
                got: inputs.len(),
            });
        }
        Ok(inputs)
    }
}

/// Maps a uniform draw from `[0, 1)` onto `0..space_size`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn sample_index<R: Rng>(rng: &mut R, space_size: usize) -> usize {
    let draw: f64 = rng.r#gen();
    ((draw * space_size as f64) as usize).min(space_size - 1)
}
