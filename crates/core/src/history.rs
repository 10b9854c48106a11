use ndarray::{Array1, Array2};
use thiserror::Error;
use uom::si::{acceleration::meter_per_second_squared, length::meter, mass::kilogram};

use crate::{State, SystemParameters};

/// A state reached by the system, with the time and input that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    /// Time since the start of the simulation (s).
    pub timestamp: f64,

    /// Cart acceleration applied during the step (m/s²).
    pub input: f64,

    /// State at the end of the step.
    pub state: State,
}

/// Columns of [`History::as_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryField {
    Timestamp,
    Input,
    CartPosition,
    PoleAngle,
    CartVelocity,
    PoleAngularVelocity,
}

/// Append-only, time-ordered record of a trajectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HistoryError {
    #[error("history timestamps must not decrease: last {last} s, got {got} s")]
    OutOfOrder { last: f64, got: f64 },
}

impl HistoryEntry {
    /// Flattens the entry in [`HistoryField`] column order.
    #[must_use]
    pub fn as_row(&self) -> [f64; 6] {
        let [position, angle, velocity, angular_velocity] = self.state.to_components();
        [
            self.timestamp,
            self.input,
            position,
            angle,
            velocity,
            angular_velocity,
        ]
    }
}

impl HistoryField {
    pub const ALL: [HistoryField; 6] = [
        HistoryField::Timestamp,
        HistoryField::Input,
        HistoryField::CartPosition,
        HistoryField::PoleAngle,
        HistoryField::CartVelocity,
        HistoryField::PoleAngularVelocity,
    ];

    /// Column index of the field in a history table.
    #[must_use]
    pub fn column(self) -> usize {
        self as usize
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::OutOfOrder`] if `timestamp` is earlier than the
    /// last recorded timestamp. The history is left unchanged.
    pub fn add_entry(
        &mut self,
        timestamp: f64,
        input: f64,
        state: State,
    ) -> Result<(), HistoryError> {
        if let Some(last) = self.entries.last() {
            if timestamp < last.timestamp {
                return Err(HistoryError::OutOfOrder {
                    last: last.timestamp,
                    got: timestamp,
                });
            }
        }
        self.entries.push(HistoryEntry {
            timestamp,
            input,
            state,
        });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Returns the history as an `N×6` table in [`HistoryField`] order.
    #[must_use]
    pub fn as_table(&self) -> Array2<f64> {
        let mut table = Array2::zeros((self.entries.len(), HistoryField::ALL.len()));
        for (mut row, entry) in table.rows_mut().into_iter().zip(&self.entries) {
            row.assign(&Array1::from(entry.as_row().to_vec()));
        }
        table
    }

    /// Returns one column of the history.
    #[must_use]
    pub fn field(&self, field: HistoryField) -> Array1<f64> {
        let column = field.column();
        self.entries.iter().map(|entry| entry.as_row()[column]).collect()
    }

    #[must_use]
    pub fn timestamps(&self) -> Array1<f64> {
        self.field(HistoryField::Timestamp)
    }

    #[must_use]
    pub fn inputs(&self) -> Array1<f64> {
        self.field(HistoryField::Input)
    }

    #[must_use]
    pub fn cart_positions(&self) -> Array1<f64> {
        self.field(HistoryField::CartPosition)
    }

    #[must_use]
    pub fn pole_angles(&self) -> Array1<f64> {
        self.field(HistoryField::PoleAngle)
    }

    #[must_use]
    pub fn cart_velocities(&self) -> Array1<f64> {
        self.field(HistoryField::CartVelocity)
    }

    #[must_use]
    pub fn pole_angular_velocities(&self) -> Array1<f64> {
        self.field(HistoryField::PoleAngularVelocity)
    }

    /// Total mechanical energy at every recorded step.
    ///
    /// See [`mechanical_energy`].
    #[must_use]
    pub fn total_energies(&self, parameters: &SystemParameters) -> Array1<f64> {
        self.entries
            .iter()
            .map(|entry| mechanical_energy(parameters, &entry.state))
            .collect()
    }
}

/// Kinetic plus potential energy of cart and pole (J).
///
/// The cart moves horizontally only, so it has no potential energy. The pole
/// is a uniform rod whose potential energy is zero when hanging down.
#[must_use]
pub fn mechanical_energy(parameters: &SystemParameters, state: &State) -> f64 {
    let cart_mass = parameters.cart_mass.get::<kilogram>();
    let pole_mass = parameters.pole_mass.get::<kilogram>();
    let length = parameters.pole_length.get::<meter>();
    let gravity = parameters.gravity.get::<meter_per_second_squared>();

    let velocity = state.velocity();
    let angular_velocity = state.angular_velocity();
    let cos_angle = state.angle().cos();

    let kinetic_cart = cart_mass * velocity.powi(2) / 2.0;
    let kinetic_pole = pole_mass / 2.0
        * (velocity.powi(2)
            + length.powi(2) * angular_velocity.powi(2) / 3.0
            + length * velocity * angular_velocity * cos_angle);
    let potential_pole = pole_mass * gravity * length / 2.0 * (1.0 - cos_angle);

    kinetic_cart + kinetic_pole + potential_pole
}
