//! Physical parameters, operating limits and discretization settings.
//!
//! All types here are plain data. They carry `uom` quantities so units are
//! explicit at the boundary; numeric code converts them to SI `f64` once,
//! after [`SystemConfiguration::validate`] has accepted them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    acceleration::meter_per_second_squared,
    angular_velocity::radian_per_second,
    f64::{Acceleration, AngularVelocity, Length, Mass, Time, Velocity},
    length::meter,
    mass::kilogram,
    time::second,
    velocity::meter_per_second,
};

/// Physical constants of the cart and pole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemParameters {
    pub pole_length: Length,
    pub pole_mass: Mass,
    pub cart_mass: Mass,
    pub gravity: Acceleration,
}

/// Symmetric bounds `(-limit, +limit)` of the operating envelope.
///
/// `max_abs_acceleration` doubles as the bound on the control input, which
/// is a commanded cart acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemLimits {
    pub max_abs_position: Length,
    pub max_abs_velocity: Velocity,
    pub max_abs_acceleration: Acceleration,
    pub max_abs_angular_velocity: AngularVelocity,
}

/// Number of grid points per discretized dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Discretization {
    pub cart_position: usize,
    pub pole_angle: usize,
    pub cart_velocity: usize,
    pub pole_angular_velocity: usize,
    pub cart_acceleration: usize,
}

/// Everything the integrators and the discretizer need to know.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfiguration {
    pub parameters: SystemParameters,
    pub limits: SystemLimits,

    /// Control update period.
    pub input_timestep: Time,

    /// Numerical sub-steps taken per control period.
    pub dynamics_steps_per_input: usize,

    pub discretization: Discretization,
}

/// Reasons a [`SystemConfiguration`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} needs at least one grid point")]
    NoPoints { field: &'static str },

    #[error("dynamics_steps_per_input must be at least 1")]
    NoDynamicsSteps,

    #[error("discretization has more lattice points than can be stored")]
    SpaceTooLarge,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            pole_length: Length::new::<meter>(0.2),
            pole_mass: Mass::new::<kilogram>(0.118),
            cart_mass: Mass::new::<kilogram>(0.5),
            gravity: Acceleration::new::<meter_per_second_squared>(9.807),
        }
    }
}

impl SystemParameters {
    /// Sets the pole length in meters.
    #[must_use]
    pub fn pole_length_si(mut self, pole_length: f64) -> Self {
        self.pole_length = Length::new::<meter>(pole_length);
        self
    }

    /// Sets the pole mass in kilograms.
    #[must_use]
    pub fn pole_mass_si(mut self, pole_mass: f64) -> Self {
        self.pole_mass = Mass::new::<kilogram>(pole_mass);
        self
    }

    /// Sets the cart mass in kilograms.
    #[must_use]
    pub fn cart_mass_si(mut self, cart_mass: f64) -> Self {
        self.cart_mass = Mass::new::<kilogram>(cart_mass);
        self
    }

    /// Sets gravitational acceleration in m/s².
    #[must_use]
    pub fn gravity_si(mut self, gravity: f64) -> Self {
        self.gravity = Acceleration::new::<meter_per_second_squared>(gravity);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("pole_length", self.pole_length.get::<meter>())?;
        positive("pole_mass", self.pole_mass.get::<kilogram>())?;
        positive("cart_mass", self.cart_mass.get::<kilogram>())?;
        positive("gravity", self.gravity.get::<meter_per_second_squared>())
    }
}

impl Default for SystemLimits {
    fn default() -> Self {
        Self {
            max_abs_position: Length::new::<meter>(0.25),
            max_abs_velocity: Velocity::new::<meter_per_second>(25.0),
            max_abs_acceleration: Acceleration::new::<meter_per_second_squared>(7.0),
            max_abs_angular_velocity: AngularVelocity::new::<radian_per_second>(20.0),
        }
    }
}

impl SystemLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("max_abs_position", self.max_abs_position.get::<meter>())?;
        positive(
            "max_abs_velocity",
            self.max_abs_velocity.get::<meter_per_second>(),
        )?;
        positive(
            "max_abs_acceleration",
            self.max_abs_acceleration.get::<meter_per_second_squared>(),
        )?;
        positive(
            "max_abs_angular_velocity",
            self.max_abs_angular_velocity.get::<radian_per_second>(),
        )
    }
}

impl Default for Discretization {
    fn default() -> Self {
        Self {
            cart_position: 10,
            pole_angle: 16,
            cart_velocity: 10,
            pole_angular_velocity: 10,
            cart_acceleration: 15,
        }
    }
}

impl Discretization {
    /// Number of points in the full state lattice.
    ///
    /// Saturates at `usize::MAX`; [`SystemConfiguration::validate`] rejects
    /// any discretization for which that happens.
    #[must_use]
    pub fn space_size(&self) -> usize {
        self.checked_space_size().unwrap_or(usize::MAX)
    }

    /// Lattice size, if the `4×M` lattice of `f64` fits in memory addressing.
    fn checked_space_size(&self) -> Option<usize> {
        let max_bytes = usize::try_from(isize::MAX).unwrap_or(usize::MAX);
        [
            self.cart_position,
            self.pole_angle,
            self.cart_velocity,
            self.pole_angular_velocity,
        ]
        .into_iter()
        .try_fold(1_usize, usize::checked_mul)
        .filter(|&points| {
            points
                .checked_mul(4 * size_of::<f64>())
                .is_some_and(|bytes| bytes <= max_bytes)
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("cart_position", self.cart_position),
            ("pole_angle", self.pole_angle),
            ("cart_velocity", self.cart_velocity),
            ("pole_angular_velocity", self.pole_angular_velocity),
            ("cart_acceleration", self.cart_acceleration),
        ];
        if let Some(&(field, _)) = counts.iter().find(|(_, count)| *count == 0) {
            return Err(ConfigError::NoPoints { field });
        }
        self.checked_space_size()
            .map(|_| ())
            .ok_or(ConfigError::SpaceTooLarge)
    }
}

impl Default for SystemConfiguration {
    fn default() -> Self {
        Self {
            parameters: SystemParameters::default(),
            limits: SystemLimits::default(),
            input_timestep: Time::new::<second>(0.01),
            dynamics_steps_per_input: 10,
            discretization: Discretization::default(),
        }
    }
}

impl SystemConfiguration {
    /// Sets the control update period in seconds.
    #[must_use]
    pub fn input_timestep_si(mut self, input_timestep: f64) -> Self {
        self.input_timestep = Time::new::<second>(input_timestep);
        self
    }

    /// Sets the number of sub-steps per control period.
    #[must_use]
    pub fn dynamics_steps(mut self, steps: usize) -> Self {
        self.dynamics_steps_per_input = steps;
        self
    }

    /// Checks every invariant the integrators and discretizer rely on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters.validate()?;
        self.limits.validate()?;
        positive("input_timestep", self.input_timestep.get::<second>())?;
        if self.dynamics_steps_per_input == 0 {
            return Err(ConfigError::NoDynamicsSteps);
        }
        positive("dynamics_timestep", self.dynamics_timestep())?;
        self.discretization.validate()
    }

    /// Control update period in seconds.
    #[must_use]
    pub fn input_timestep_seconds(&self) -> f64 {
        self.input_timestep.get::<second>()
    }

    /// Control update rate in Hz, the reciprocal of the input timestep.
    #[must_use]
    pub fn input_rate_hz(&self) -> f64 {
        1.0 / self.input_timestep_seconds()
    }

    /// Length of one numerical sub-step in seconds.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn dynamics_timestep(&self) -> f64 {
        self.input_timestep_seconds() / self.dynamics_steps_per_input as f64
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
