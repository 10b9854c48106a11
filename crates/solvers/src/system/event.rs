use cartpole_core::State;

/// Event emitted after every tick of an observed advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Ticks simulated so far, counting this one.
    pub tick: u64,

    /// Simulation time after the tick (s).
    pub time: f64,

    /// Input held during the tick (m/s²).
    pub input: f64,

    /// State reached at the end of the tick.
    pub state: State,
}
