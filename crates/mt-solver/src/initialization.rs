//! Starting point for the equilibrium fiber-length search.
//!
//! The solver is safeguarded and brackets its root, so the guess only
//! affects how many iterations are spent, never which root is found.
//! A good guess matters for repeated solves along a trajectory, where the
//! previous fiber length is usually within a Newton step or two.

use mt_core::units::{Length, m};
use mt_muscle::MuscleParams;

/// How to pick the first fiber length tried by the equilibrium solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialGuess {
    /// Reuse the fiber length currently held in the state, when it is
    /// geometrically valid. Falls back to [`InitialGuess::TendonSlack`].
    #[default]
    CurrentState,

    /// Assume the tendon sits exactly at slack length:
    /// `L_f = sqrt((L_mt - L_s)^2 + h^2)`.
    TendonSlack,
}

impl InitialGuess {
    /// Starting fiber length inside `bounds`.
    pub fn fiber_length(
        &self,
        params: &MuscleParams,
        musculotendon_length: Length,
        current: Option<Length>,
        bounds: (Length, Length),
    ) -> Length {
        let (lo, hi) = bounds;
        let usable = |l: Length| l.value.is_finite() && l > lo && l <= hi;

        if let (InitialGuess::CurrentState, Some(l)) = (self, current) {
            if usable(l) {
                return l;
            }
            tracing::debug!(
                fiber_length = l.value,
                "current fiber length outside valid range, using tendon-slack guess"
            );
        }

        let h = params.fiber_height().value;
        let along = musculotendon_length.value - params.tendon_slack_length().value;
        let guess = if along > 0.0 {
            m((along * along + h * h).sqrt())
        } else {
            params.optimal_fiber_length()
        };
        if usable(guess) { guess } else { m(0.5 * (lo.value + hi.value)) }
    }
}
