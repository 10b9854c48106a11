//! Heun's method (explicit trapezoidal RK2) for fixed-step integration.
//!
//! Each step evaluates the derivative at the start of the step and at an
//! Euler probe, then follows their average:
//!
//! ```text
//! k1 = f(state_n)
//! k2 = f(state_n + k1 * dt)
//! state_{n+1} = state_n + (k1 + k2) / 2 * dt
//! ```
//!
//! The input is held constant across the step.

use std::ops::{Add, Mul};

use cartpole_core::{DerivativeOf, Dynamics, StepIntegrable};

/// Advances `state` by a single Heun step of length `dt`.
pub fn step<D>(dynamics: &D, state: &D::State, input: &D::Input, dt: f64) -> D::State
where
    D: Dynamics,
    DerivativeOf<D::State, f64>: Clone
        + Add<Output = DerivativeOf<D::State, f64>>
        + Mul<f64, Output = DerivativeOf<D::State, f64>>,
{
    let k1 = dynamics.derivative(state, input);
    let probe = state.step(k1.clone(), dt);
    let k2 = dynamics.derivative(&probe, input);

    state.step((k1 + k2) * 0.5, dt)
}

/// Advances `state` by `steps` Heun steps of length `dt` under one input.
///
/// Zero steps returns the state unchanged.
pub fn integrate<D>(
    dynamics: &D,
    state: D::State,
    input: &D::Input,
    dt: f64,
    steps: usize,
) -> D::State
where
    D: Dynamics,
    DerivativeOf<D::State, f64>: Clone
        + Add<Output = DerivativeOf<D::State, f64>>
        + Mul<f64, Output = DerivativeOf<D::State, f64>>,
{
    (0..steps).fold(state, |current, _| step(dynamics, &current, input, dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    // --- Test fixtures ---

    /// State: position and velocity of a point on a line.
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Point {
        position: f64,
        velocity: f64,
    }

    /// Derivative: velocity and acceleration.
    #[derive(Debug, Clone, Copy)]
    struct Rate {
        velocity: f64,
        acceleration: f64,
    }

    impl StepIntegrable<f64> for Point {
        type Derivative = Rate;

        fn step(&self, derivative: Rate, dt: f64) -> Self {
            Point {
                position: self.position + derivative.velocity * dt,
                velocity: self.velocity + derivative.acceleration * dt,
            }
        }
    }

    impl Add for Rate {
        type Output = Rate;

        fn add(self, rhs: Rate) -> Rate {
            Rate {
                velocity: self.velocity + rhs.velocity,
                acceleration: self.acceleration + rhs.acceleration,
            }
        }
    }

    impl Mul<f64> for Rate {
        type Output = Rate;

        fn mul(self, rhs: f64) -> Rate {
            Rate {
                velocity: self.velocity * rhs,
                acceleration: self.acceleration * rhs,
            }
        }
    }

    /// Point driven by a commanded acceleration.
    struct Driven;

    impl Dynamics for Driven {
        type State = Point;
        type Input = f64;

        fn derivative(&self, state: &Point, input: &f64) -> Rate {
            Rate {
                velocity: state.velocity,
                acceleration: *input,
            }
        }
    }

    /// Unit mass on a unit spring.
    struct Spring;

    impl Dynamics for Spring {
        type State = Point;
        type Input = ();

        fn derivative(&self, state: &Point, _input: &()) -> Rate {
            Rate {
                velocity: state.velocity,
                acceleration: -state.position,
            }
        }
    }

    // --- Tests ---

    #[test]
    fn constant_acceleration_is_exact() {
        let start = Point {
            position: 1.0,
            velocity: -2.0,
        };

        let end = integrate(&Driven, start, &3.0, 0.1, 10);

        // x(1) = 1 - 2 + 3/2, v(1) = -2 + 3
        assert_relative_eq!(end.position, 0.5, epsilon = 1e-12);
        assert_relative_eq!(end.velocity, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_steps_returns_initial() {
        let start = Point {
            position: 5.0,
            velocity: 1.0,
        };
        assert_eq!(integrate(&Driven, start, &1.0, 0.1, 0), start);
    }

    #[test]
    fn single_step_matches_hand_calculation() {
        let start = Point {
            position: 1.0,
            velocity: 0.0,
        };

        let next = step(&Spring, &start, &(), 0.1);

        // k1 = (0, -1), probe = (1, -0.1), k2 = (-0.1, -1)
        assert_relative_eq!(next.position, 1.0 - 0.005, epsilon = 1e-15);
        assert_relative_eq!(next.velocity, -0.1, epsilon = 1e-15);
    }

    #[test]
    fn error_is_second_order() {
        let start = Point {
            position: 1.0,
            velocity: 0.0,
        };
        let error_with = |steps: usize| {
            let dt = 1.0 / steps as f64;
            let end = integrate(&Spring, start, &(), dt, steps);
            (end.position - 1.0_f64.cos()).abs()
        };

        let ratio = error_with(100) / error_with(200);

        assert!((3.5..4.5).contains(&ratio), "ratio was {ratio}");
    }
}
