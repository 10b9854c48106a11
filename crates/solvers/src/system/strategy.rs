use cartpole_core::State;

/// Chooses the input applied during the next tick.
///
/// A strategy is consulted once per tick, at the start of the tick, with
/// the current simulation time and state. Any
/// `FnMut(f64, &State) -> f64` closure is a strategy.
pub trait InputStrategy {
    /// Returns the cart acceleration to hold for the coming tick (m/s²).
    fn next_input(&mut self, time: f64, state: &State) -> f64;
}

/// Holds one input for every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldInput(pub f64);

impl InputStrategy for HoldInput {
    fn next_input(&mut self, _time: f64, _state: &State) -> f64 {
        self.0
    }
}

impl<F> InputStrategy for F
where
    F: FnMut(f64, &State) -> f64,
{
    fn next_input(&mut self, time: f64, state: &State) -> f64 {
        self(time, state)
    }
}
