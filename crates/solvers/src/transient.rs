//! Fixed-step integration schemes for [`Dynamics`] models.
//!
//! # Schemes
//!
//! - [`heun`]: explicit second-order (trapezoidal RK2) stepping
//!
//! [`Dynamics`]: cartpole_core::Dynamics

pub mod heun;
