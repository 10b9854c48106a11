/// Receives events from a running simulation and may steer it.
///
/// An observer sees every event a driver emits and can answer with an
/// action (for example, stopping early). Returning `None` lets the driver
/// continue unchanged.
///
/// Closures of the form `FnMut(&E) -> Option<A>` are observers, and `()` is
/// an observer that never acts.
pub trait Observer<E, A> {
    /// Handles one event, optionally returning an action for the driver.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
