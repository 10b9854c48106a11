//! Core types for simulating an inverted pendulum on a cart.
//!
//! This crate defines the shared vocabulary the integrators and samplers
//! build on:
//!
//! - [`State`]: a point in the four-dimensional phase space
//! - [`SystemConfiguration`]: physical parameters, limits, timing and
//!   discretization settings
//! - [`CartPole`]: the continuous-time model, a [`Dynamics`] implementation
//! - [`StepIntegrable`]: how a state is advanced along its derivative
//! - [`History`]: an append-only record of a simulated trajectory
//! - [`Observer`]: receives simulation events and optionally returns actions

mod config;
mod history;
mod model;
mod observer;
mod state;
mod step;

pub use config::{ConfigError, Discretization, SystemConfiguration, SystemLimits, SystemParameters};
pub use history::{History, HistoryEntry, HistoryError, HistoryField, mechanical_energy};
pub use model::CartPole;
pub use observer::Observer;
pub use state::{State, StateDerivative, StateError, normalize_angle};
pub use step::{DerivativeOf, Dynamics, StepIntegrable};
