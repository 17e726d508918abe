//! TransientModel trait for systems advanced by the integrators.

use crate::error::SimResult;

/// A dynamic system `x_dot = f(t, x)` over some state type.
///
/// The integrators only need to evaluate `f` and form linear combinations of
/// states, so the state type is opaque to them.
pub trait TransientModel {
    type State: Clone;

    /// State at t = 0.
    fn initial_state(&self) -> Self::State;

    /// State derivative at `(t, x)`.
    ///
    /// Takes `&mut self` so models can keep the last evaluation around (for
    /// example to expose derivatives through a state store).
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// Element-wise `a + b`.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale * a`.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}
