//! Integrators for the inverted pendulum on a cart.
//!
//! # Modules
//!
//! - [`transient`]: generic fixed-step schemes ([`heun`])
//! - [`system`]: one system advanced tick by tick, with history
//! - [`batch`]: many independent systems advanced together
//!
//! [`heun`]: transient::heun

pub mod batch;
pub mod system;
pub mod transient;
