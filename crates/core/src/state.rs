use std::{
    f64::consts::{PI, TAU},
    ops::{Add, Mul},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StepIntegrable;

/// A point in the phase space of the cart-pole system.
///
/// The pole angle is measured from the downward (hanging) position and is
/// always kept in `[0, 2π)`. A `State` is immutable once constructed;
/// integration produces a new value instead of mutating an existing one.
///
/// Components are ordered `(position, angle, velocity, angular_velocity)`
/// wherever a state is flattened into a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct State {
    position: f64,
    angle: f64,
    velocity: f64,
    angular_velocity: f64,
}

/// Errors that can occur when building a [`State`] from a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("a state has exactly 4 components, got {len}")]
    InvalidLength { len: usize },
}

/// Time derivative of a [`State`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateDerivative {
    /// Rate of change of position (m/s).
    pub velocity: f64,
    /// Rate of change of angle (rad/s).
    pub angular_velocity: f64,
    /// Rate of change of velocity (m/s²).
    pub acceleration: f64,
    /// Rate of change of angular velocity (rad/s²).
    pub angular_acceleration: f64,
}

/// Wraps an angle into `[0, 2π)`.
///
/// Negative angles wrap to the positive range.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // `rem_euclid` rounds tiny negative inputs up to exactly 2π.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

impl State {
    /// Creates a state, wrapping `angle` into `[0, 2π)`.
    #[must_use]
    pub fn new(position: f64, angle: f64, velocity: f64, angular_velocity: f64) -> Self {
        Self {
            position,
            angle: normalize_angle(angle),
            velocity,
            angular_velocity,
        }
    }

    /// The resting state: cart at the origin, pole hanging down, no motion.
    #[must_use]
    pub fn home() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// The upright configuration the controller aims for.
    #[must_use]
    pub fn target() -> Self {
        Self::new(0.0, PI, 0.0, 0.0)
    }

    /// Wraps an angle into `[0, 2π)`.
    ///
    /// Same as [`normalize_angle`].
    #[must_use]
    pub fn normalize(angle: f64) -> f64 {
        normalize_angle(angle)
    }

    /// Builds a state from `(position, angle, velocity, angular_velocity)`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidLength`] if `components` does not hold
    /// exactly four values.
    pub fn from_components(components: &[f64]) -> Result<Self, StateError> {
        match *components {
            [position, angle, velocity, angular_velocity] => {
                Ok(Self::new(position, angle, velocity, angular_velocity))
            }
            _ => Err(StateError::InvalidLength {
                len: components.len(),
            }),
        }
    }

    /// Returns `(position, angle, velocity, angular_velocity)`.
    #[must_use]
    pub fn to_components(&self) -> [f64; 4] {
        [
            self.position,
            self.angle,
            self.velocity,
            self.angular_velocity,
        ]
    }

    /// Cart position along the track (m).
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Pole angle in `[0, 2π)`, zero when hanging down (rad).
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Cart velocity (m/s).
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Pole angular velocity, counter-clockwise positive (rad/s).
    #[must_use]
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }
}

impl StepIntegrable<f64> for State {
    type Derivative = StateDerivative;

    fn step(&self, derivative: StateDerivative, delta: f64) -> Self {
        Self::new(
            self.position + derivative.velocity * delta,
            self.angle + derivative.angular_velocity * delta,
            self.velocity + derivative.acceleration * delta,
            self.angular_velocity + derivative.angular_acceleration * delta,
        )
    }
}

impl TryFrom<&[f64]> for State {
    type Error = StateError;

    fn try_from(components: &[f64]) -> Result<Self, Self::Error> {
        Self::from_components(components)
    }
}

impl TryFrom<Vec<f64>> for State {
    type Error = StateError;

    fn try_from(components: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_components(&components)
    }
}

impl From<State> for [f64; 4] {
    fn from(state: State) -> Self {
        state.to_components()
    }
}

impl Add for StateDerivative {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            velocity: self.velocity + rhs.velocity,
            angular_velocity: self.angular_velocity + rhs.angular_velocity,
            acceleration: self.acceleration + rhs.acceleration,
            angular_acceleration: self.angular_acceleration + rhs.angular_acceleration,
        }
    }
}

impl Mul<f64> for StateDerivative {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            velocity: self.velocity * rhs,
            angular_velocity: self.angular_velocity * rhs,
            acceleration: self.acceleration * rhs,
            angular_acceleration: self.angular_acceleration * rhs,
        }
    }
}
