use uom::si::{acceleration::meter_per_second_squared, length::meter};

use crate::{Dynamics, State, StateDerivative, SystemParameters};

/// Continuous cart-pole dynamics under a commanded cart acceleration.
///
/// The input `u` is the cart acceleration itself, so cart mass never enters
/// the equations. The pole is a uniform rod pivoting on the cart:
///
/// ```text
/// ẍ = u
/// θ̈ = -(3 / (2ℓ)) · (u·cos θ + g·sin θ)
/// ```
///
/// Pole mass cancels out of the angular equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartPole {
    angular_gain: f64,
    gravity: f64,
}

impl CartPole {
    /// Builds the model from physical parameters.
    ///
    /// The parameters are assumed to have passed validation.
    #[must_use]
    pub fn new(parameters: &SystemParameters) -> Self {
        let pole_length = parameters.pole_length.get::<meter>();
        Self {
            angular_gain: 3.0 / (2.0 * pole_length),
            gravity: parameters.gravity.get::<meter_per_second_squared>(),
        }
    }

    /// Pole angular acceleration for cart acceleration `input` at `angle`.
    #[inline]
    #[must_use]
    pub fn angular_acceleration(&self, input: f64, angle: f64) -> f64 {
        -self.angular_gain * (input * angle.cos() + self.gravity * angle.sin())
    }
}

impl Dynamics for CartPole {
    type State = State;
    type Input = f64;

    fn derivative(&self, state: &State, input: &f64) -> StateDerivative {
        StateDerivative {
            velocity: state.velocity(),
            angular_velocity: state.angular_velocity(),
            acceleration: *input,
            angular_acceleration: self.angular_acceleration(*input, state.angle()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f64::consts::PI;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn model() -> CartPole {
        CartPole::new(&SystemParameters::default().pole_length_si(0.2).gravity_si(9.807))
    }

    #[test]
    fn equilibria_have_no_angular_acceleration() {
        let model = model();
        assert_abs_diff_eq!(model.angular_acceleration(0.0, 0.0), 0.0);
        assert_abs_diff_eq!(model.angular_acceleration(0.0, PI), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn gravity_restores_toward_hanging() {
        let model = model();
        assert!(model.angular_acceleration(0.0, 0.1) < 0.0);
        assert!(model.angular_acceleration(0.0, -0.1 + 2.0 * PI) > 0.0);
    }

    #[test]
    fn derivative_of_moving_state() {
        let state = State::new(0.1, PI / 2.0, 1.5, -2.0);
        let derivative = model().derivative(&state, &3.0);

        assert_relative_eq!(derivative.velocity, 1.5);
        assert_relative_eq!(derivative.angular_velocity, -2.0);
        assert_relative_eq!(derivative.acceleration, 3.0);
        // cos(π/2) ≈ 0, so only gravity acts: -(3 / 0.4) · 9.807.
        assert_relative_eq!(
            derivative.angular_acceleration,
            -7.5 * 9.807,
            max_relative = 1e-12
        );
    }

    #[test]
    fn pole_mass_does_not_matter() {
        let light = CartPole::new(&SystemParameters::default().pole_mass_si(0.01));
        let heavy = CartPole::new(&SystemParameters::default().pole_mass_si(10.0));
        assert_eq!(light, heavy);
    }
}
