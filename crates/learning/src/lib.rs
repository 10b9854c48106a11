//! State-space discretization and batch sampling for cart-pole policy search.
//!
//! [`Discretizer`] lays a regular lattice over the bounded state space and
//! the admissible accelerations. [`LearningContext`] draws random batches
//! from that lattice and hands them, together with cost functions and a
//! one-period lookahead, to an [`InputOptimizer`].

mod context;
mod discretizer;
mod error;
mod optimizer;

pub use context::LearningContext;
pub use discretizer::Discretizer;
pub use error::Error;
pub use optimizer::{CostFunctions, InputCostFn, InputOptimizer, LookaheadRequest, StateCostFn};
