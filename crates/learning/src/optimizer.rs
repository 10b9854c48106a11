//! The seam between batch sampling and policy search.
//!
//! A [`LearningContext`] owns everything a search needs to score candidate
//! inputs: the sampled batch, the admissible acceleration grid, the cost
//! functions, and a [`BatchIntegrator`] that predicts where each state goes
//! under a given input. An [`InputOptimizer`] receives all of it as a
//! [`LookaheadRequest`] and answers with one input per batch column.
//!
//! No search is implemented here.
//!
//! [`LearningContext`]: crate::LearningContext

use ndarray::{Array1, ArrayView1, ArrayView2};

use cartpole_solvers::batch::BatchIntegrator;

/// Scores each column of a `4×N` state batch.
pub type StateCostFn = Box<dyn Fn(ArrayView2<'_, f64>) -> Array1<f64> + Send + Sync>;

/// Scores each entry of an input vector.
pub type InputCostFn = Box<dyn Fn(ArrayView1<'_, f64>) -> Array1<f64> + Send + Sync>;

/// State and input cost functions used by a search.
pub struct CostFunctions {
    states: StateCostFn,
    inputs: InputCostFn,
}

impl CostFunctions {
    pub fn new<S, I>(states: S, inputs: I) -> Self
    where
        S: Fn(ArrayView2<'_, f64>) -> Array1<f64> + Send + Sync + 'static,
        I: Fn(ArrayView1<'_, f64>) -> Array1<f64> + Send + Sync + 'static,
    {
        Self {
            states: Box::new(states),
            inputs: Box::new(inputs),
        }
    }

    /// Cost of every column of `states`.
    #[must_use]
    pub fn state_costs(&self, states: ArrayView2<'_, f64>) -> Array1<f64> {
        (self.states)(states)
    }

    /// Cost of every entry of `inputs`.
    #[must_use]
    pub fn input_costs(&self, inputs: ArrayView1<'_, f64>) -> Array1<f64> {
        (self.inputs)(inputs)
    }
}

impl std::fmt::Debug for CostFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostFunctions").finish_non_exhaustive()
    }
}

/// Everything an optimizer may consult for one batch.
#[derive(Debug)]
pub struct LookaheadRequest<'a> {
    /// The current `4×N` batch.
    pub states: ArrayView2<'a, f64>,

    /// The admissible cart accelerations.
    pub candidates: ArrayView1<'a, f64>,

    pub costs: &'a CostFunctions,

    /// Predicts successor batches one control period ahead.
    pub integrator: &'a mut BatchIntegrator,
}

/// Chooses a cart acceleration for every state in a batch.
pub trait InputOptimizer {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns one input per column of `request.states`.
    ///
    /// # Errors
    ///
    /// Returns an error if the search cannot produce inputs.
    fn best_inputs(&mut self, request: LookaheadRequest<'_>) -> Result<Array1<f64>, Self::Error>;
}
