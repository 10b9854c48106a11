use std::f64::consts::TAU;

use cartpole_core::{State, SystemConfiguration};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::info;
use uom::si::{
    acceleration::meter_per_second_squared, angular_velocity::radian_per_second, length::meter,
    velocity::meter_per_second,
};

use crate::Error;

/// The full lattice of discretized states and the grid of admissible inputs.
///
/// Each state dimension gets its own one-dimensional grid:
///
/// | row | dimension | range |
/// |---|---|---|
/// | 0 | position | `[-max_abs_position, +max_abs_position]` |
/// | 1 | angle | `[0, 2π)`, evenly spaced, excluding `2π` |
/// | 2 | velocity | `[-max_abs_velocity, +max_abs_velocity]` |
/// | 3 | angular velocity | `[-max_abs_angular_velocity, +max_abs_angular_velocity]` |
///
/// A grid with a single point holds only its lower bound.
///
/// The lattice is the Cartesian product of these grids, stored as a `4×M`
/// array. Columns are ordered with position varying slowest and angular
/// velocity fastest, so the column of grid indices `[i, j, k, l]` is
/// `((i·n_θ + j)·n_ẋ + k)·n_θ̇ + l` (see [`Discretizer::flat_index`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Discretizer {
    states: Array2<f64>,
    cart_accelerations: Array1<f64>,
    counts: [usize; 4],
}

impl Discretizer {
    /// Builds the lattice for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn new(config: &SystemConfiguration) -> Result<Self, Error> {
        config.validate()?;
        let limits = &config.limits;
        let points = &config.discretization;

        let max_position = limits.max_abs_position.get::<meter>();
        let max_velocity = limits.max_abs_velocity.get::<meter_per_second>();
        let max_angular_velocity = limits.max_abs_angular_velocity.get::<radian_per_second>();
        let max_acceleration = limits
            .max_abs_acceleration
            .get::<meter_per_second_squared>();

        let grids = [
            symmetric_grid(max_position, points.cart_position),
            angle_grid(points.pole_angle),
            symmetric_grid(max_velocity, points.cart_velocity),
            symmetric_grid(max_angular_velocity, points.pole_angular_velocity),
        ];
        let counts = grids.each_ref().map(|grid| grid.len());
        let space_size = points.space_size();

        let states = Array2::from_shape_fn((4, space_size), |(row, column)| {
            grids[row][grid_index(column, row, &counts)]
        });
        let cart_accelerations = symmetric_grid(max_acceleration, points.cart_acceleration);

        info!(
            states = space_size,
            inputs = cart_accelerations.len(),
            "Built discretized state space"
        );

        Ok(Self {
            states,
            cart_accelerations,
            counts,
        })
    }

    /// Number of states in the lattice.
    #[must_use]
    pub fn space_size(&self) -> usize {
        self.states.ncols()
    }

    /// The whole `4×M` lattice.
    #[must_use]
    pub fn all_states(&self) -> ArrayView2<'_, f64> {
        self.states.view()
    }

    #[must_use]
    pub fn cart_positions(&self) -> ArrayView1<'_, f64> {
        self.states.row(0)
    }

    #[must_use]
    pub fn pole_angles(&self) -> ArrayView1<'_, f64> {
        self.states.row(1)
    }

    #[must_use]
    pub fn cart_velocities(&self) -> ArrayView1<'_, f64> {
        self.states.row(2)
    }

    #[must_use]
    pub fn pole_angular_velocities(&self) -> ArrayView1<'_, f64> {
        self.states.row(3)
    }

    /// The admissible cart accelerations, from `-max` to `+max`.
    #[must_use]
    pub fn cart_accelerations(&self) -> ArrayView1<'_, f64> {
        self.cart_accelerations.view()
    }

    /// Grid point counts per state dimension, in row order.
    #[must_use]
    pub fn counts(&self) -> [usize; 4] {
        self.counts
    }

    /// The lattice column at `index`, if it exists.
    #[must_use]
    pub fn state(&self, index: usize) -> Option<State> {
        if index >= self.space_size() {
            return None;
        }
        let column = self.states.column(index);
        Some(State::new(column[0], column[1], column[2], column[3]))
    }

    /// Flat column index of per-dimension grid indices, if all are in range.
    #[must_use]
    pub fn flat_index(&self, indices: [usize; 4]) -> Option<usize> {
        indices
            .iter()
            .zip(self.counts)
            .try_fold(0, |flat, (&index, count)| {
                (index < count).then_some(flat * count + index)
            })
    }
}

/// Evenly spaced points over `[-limit, +limit]`.
fn symmetric_grid(limit: f64, count: usize) -> Array1<f64> {
    if count == 1 {
        Array1::from_elem(1, -limit)
    } else {
        Array1::linspace(-limit, limit, count)
    }
}

/// Evenly spaced angles over `[0, 2π)`.
#[allow(clippy::cast_precision_loss)]
fn angle_grid(count: usize) -> Array1<f64> {
    Array1::from_shape_fn(count, |i| TAU * i as f64 / count as f64)
}

/// Index into grid `dimension` of lattice column `column`.
fn grid_index(column: usize, dimension: usize, counts: &[usize; 4]) -> usize {
    let stride: usize = counts[dimension + 1..].iter().product();
    (column / stride) % counts[dimension]
}
