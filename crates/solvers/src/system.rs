//! Single-system integrator for trajectory playback.
//!
//! A [`CartPoleSystem`] holds one current [`State`] and a simulation clock
//! that only moves forward. Each call to [`CartPoleSystem::advance_one_step`]
//! integrates one control period with [`heun`] sub-steps and records the
//! result in the system's [`History`].
//!
//! # Example
//!
//! ```
//! use cartpole_core::{State, SystemConfiguration};
//! use cartpole_solvers::system::CartPoleSystem;
//!
//! let mut system = CartPoleSystem::new(SystemConfiguration::default())?;
//! system.advance_to(0.5, 0.0)?;
//!
//! assert_eq!(system.current_state(), &State::home());
//! assert_eq!(system.history().len(), 50);
//! # Ok::<(), cartpole_solvers::system::Error>(())
//! ```
//!
//! [`heun`]: crate::transient::heun

mod action;
mod error;
mod event;
mod strategy;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use strategy::{HoldInput, InputStrategy};

use cartpole_core::{CartPole, History, Observer, State, SystemConfiguration};
use tracing::debug;

use crate::transient::heun;

/// Fraction of one tick by which the clock may fall short of a target time
/// and still count as having reached it.
const TICK_TOLERANCE: f64 = 1e-9;

/// Indicates how an observed advance terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the target time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// One cart-pole system evolving under a control input.
#[derive(Debug, Clone)]
pub struct CartPoleSystem {
    config: SystemConfiguration,
    model: CartPole,
    current_state: State,
    target_state: State,
    ticks: u64,
    history: History,
}

impl CartPoleSystem {
    /// Creates a system at rest in [`State::home`] at time zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn new(config: SystemConfiguration) -> Result<Self, Error> {
        Self::with_initial_state(config, State::home())
    }

    /// Creates a system starting from `initial` at time zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn with_initial_state(config: SystemConfiguration, initial: State) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            model: CartPole::new(&config.parameters),
            config,
            current_state: initial,
            target_state: State::target(),
            ticks: 0,
            history: History::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SystemConfiguration {
        &self.config
    }

    #[must_use]
    pub fn current_state(&self) -> &State {
        &self.current_state
    }

    /// The state the controller aims for, [`State::target`].
    #[must_use]
    pub fn target_state(&self) -> &State {
        &self.target_state
    }

    /// Seconds elapsed since the start of the simulation.
    #[must_use]
    pub fn simulation_time(&self) -> f64 {
        self.time_at(self.ticks)
    }

    /// Number of control periods simulated so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Advances the system by one control period under `input`.
    ///
    /// Runs `dynamics_steps_per_input` Heun sub-steps with the input held
    /// constant, then records `(time after the step, input, new state)` in
    /// the history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::History`] if the history rejects the entry. The
    /// system is left unchanged in that case.
    pub fn advance_one_step(&mut self, input: f64) -> Result<State, Error> {
        let next = heun::integrate(
            &self.model,
            self.current_state,
            &input,
            self.config.dynamics_timestep(),
            self.config.dynamics_steps_per_input,
        );
        let time = self.time_at(self.ticks + 1);

        self.history.add_entry(time, input, next)?;
        self.ticks += 1;
        self.current_state = next;

        Ok(next)
    }

    /// Advances until the simulation time reaches `target_time`, holding
    /// `input` constant for every tick.
    ///
    /// Runs whole ticks only. A target that lies past a tick boundary by less
    /// than `1e-9` of one input timestep counts as reached at that boundary,
    /// so the clock may stop that far short of `target_time`. Any larger
    /// remainder takes one more tick.
    ///
    /// Returns the number of ticks taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimeOrder`] if `target_time` is earlier than
    /// the current simulation time, and [`Error::NonFiniteTime`] if it is not
    /// finite. Nothing is simulated in either case.
    pub fn advance_to(&mut self, target_time: f64, input: f64) -> Result<u64, Error> {
        self.advance_to_with(target_time, &mut HoldInput(input))
    }

    /// Advances until the simulation time reaches `target_time`, asking
    /// `strategy` for a fresh input at the start of every tick.
    ///
    /// Tick boundaries are matched with the same tolerance as
    /// [`CartPoleSystem::advance_to`].
    ///
    /// Returns the number of ticks taken.
    ///
    /// # Errors
    ///
    /// See [`CartPoleSystem::advance_to`].
    pub fn advance_to_with<S>(&mut self, target_time: f64, strategy: &mut S) -> Result<u64, Error>
    where
        S: InputStrategy + ?Sized,
    {
        let start = self.ticks;
        self.advance_to_observed(target_time, strategy, ())?;
        Ok(self.ticks - start)
    }

    /// Advances like [`CartPoleSystem::advance_to_with`], emitting an
    /// [`Event`] after every tick.
    ///
    /// The observer may return [`Action::StopEarly`] to stop before
    /// `target_time`; the tick that produced the event is kept.
    ///
    /// # Errors
    ///
    /// See [`CartPoleSystem::advance_to`].
    pub fn advance_to_observed<S, Obs>(
        &mut self,
        target_time: f64,
        strategy: &mut S,
        mut observer: Obs,
    ) -> Result<Status, Error>
    where
        S: InputStrategy + ?Sized,
        Obs: Observer<Event, Action>,
    {
        let remaining = self.ticks_until(target_time)?;
        debug!(
            from = self.simulation_time(),
            to = target_time,
            ticks = remaining,
            "Advancing cart-pole system"
        );

        for _ in 0..remaining {
            let input = strategy.next_input(self.simulation_time(), &self.current_state);
            let state = self.advance_one_step(input)?;

            let event = Event {
                tick: self.ticks,
                time: self.simulation_time(),
                input,
                state,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                debug!(tick = self.ticks, "Stopped by observer");
                return Ok(Status::StoppedByObserver);
            }
        }

        Ok(Status::Complete)
    }

    #[allow(clippy::cast_precision_loss)]
    fn time_at(&self, ticks: u64) -> f64 {
        ticks as f64 * self.config.input_timestep_seconds()
    }

    /// Number of ticks needed for the clock to reach `target_time`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn ticks_until(&self, target_time: f64) -> Result<u64, Error> {
        if !target_time.is_finite() {
            return Err(Error::NonFiniteTime {
                target: target_time,
            });
        }
        let current = self.simulation_time();
        if target_time < current {
            return Err(Error::InvalidTimeOrder {
                target: target_time,
                current,
            });
        }

        let periods = (target_time - current) / self.config.input_timestep_seconds();
        Ok((periods - TICK_TOLERANCE).ceil().max(0.0) as u64)
    }
}
