/// A state that can be advanced by a derivative over an increment.
///
/// Integrators only ever move a state forward through this trait, as
/// `state + derivative * delta`. For the cart-pole system `Delta` is time in
/// seconds, but nothing here requires it.
pub trait StepIntegrable<Delta> {
    /// The derivative of the state with respect to `Delta`.
    type Derivative;

    /// Returns the state reached by following `derivative` for `delta`.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

/// Continuous-time dynamics driven by an external input.
///
/// Implementors map the current state and a held input to the state's time
/// derivative. Implementations must be pure: the same arguments always give
/// the same derivative.
pub trait Dynamics {
    type State: StepIntegrable<f64>;
    type Input;

    /// Evaluates the time derivative at `state` under `input`.
    fn derivative(
        &self,
        state: &Self::State,
        input: &Self::Input,
    ) -> DerivativeOf<Self::State, f64>;
}
