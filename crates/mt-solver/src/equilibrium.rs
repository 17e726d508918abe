//! Static equilibrium between fiber and tendon.
//!
//! Given a musculotendon length and activation, find the fiber length at
//! which `F_T(L_t) = F_fiber(L_f) cos(phi)`. The residual is positive for
//! short fibers (tendon stretched) and negative for fibers long enough to
//! slacken the tendon, so whenever `L_mt` exceeds the tendon slack length
//! the valid interval brackets a root.

use crate::error::{SolverError, SolverResult};
use crate::initialization::InitialGuess;
use crate::newton::{NewtonConfig, newton_solve};
use mt_core::Real;
use mt_core::units::{Force, Length, m};
use mt_muscle::{BalanceTerms, ForceBalance, MuscleError, MuscleParams, fiber_length_bounds};

/// Fraction of the valid interval kept clear of the perpendicular-fiber end.
const LOWER_BOUND_MARGIN: Real = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumConfig {
    /// Iteration cap and slope step. `abs_tol` is overwritten from
    /// `force_tolerance`.
    pub newton: NewtonConfig,
    /// Converged when `|residual| < force_tolerance * F_max`.
    pub force_tolerance: Real,
    pub initial_guess: InitialGuess,
}

impl Default for EquilibriumConfig {
    fn default() -> Self {
        Self {
            newton: NewtonConfig::default(),
            force_tolerance: 1e-4,
            initial_guess: InitialGuess::default(),
        }
    }
}

/// Result of an equilibrium solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumSolution {
    pub fiber_length: Length,
    /// Force-balance terms at the solution.
    pub terms: BalanceTerms,
    pub iterations: usize,
    pub bisections: usize,
}

impl EquilibriumSolution {
    pub fn residual(&self) -> Force {
        self.terms.residual
    }

    /// Tendon force at the solution.
    pub fn tendon_force(&self, params: &MuscleParams) -> Force {
        self.terms.tendon_force.to_force(params.max_isometric_force())
    }
}

/// Solve for the equilibrium fiber length.
///
/// `current` is the fiber length held in the state, used as the starting
/// point under [`InitialGuess::CurrentState`].
pub fn solve_equilibrium(
    params: &MuscleParams,
    musculotendon_length: Length,
    activation: Real,
    current: Option<Length>,
    config: &EquilibriumConfig,
) -> SolverResult<EquilibriumSolution> {
    let (h, hi) = fiber_length_bounds(params, musculotendon_length)?;
    if musculotendon_length <= params.tendon_slack_length() {
        // Tendon force is zero for every admissible fiber, so no fiber
        // length with a taut tendon can balance.
        return Err(MuscleError::DegenerateGeometry {
            what: "musculotendon length does not exceed tendon slack length",
            fiber_length: current.map_or(f64::NAN, |l| l.value),
            musculotendon_length: musculotendon_length.value,
        }
        .into());
    }
    let lo = m(h.value + LOWER_BOUND_MARGIN * (hi.value - h.value));

    let start = config
        .initial_guess
        .fiber_length(params, musculotendon_length, current, (lo, hi));

    let newton = NewtonConfig {
        abs_tol: config.force_tolerance * params.max_isometric_force().value,
        ..config.newton.clone()
    };
    let balance = ForceBalance::new(params);
    let residual_fn = |lf: Real| -> SolverResult<Real> {
        Ok(balance.residual(musculotendon_length, m(lf), activation)?.value)
    };

    let result = newton_solve(start.value, (lo.value, hi.value), residual_fn, &newton)
        .inspect_err(|e| {
            tracing::warn!(
                musculotendon_length = musculotendon_length.value,
                activation,
                error = %e,
                "equilibrium solve failed"
            );
        })?;

    let fiber_length = m(result.x);
    let terms = balance.evaluate(musculotendon_length, fiber_length, activation)?;
    tracing::debug!(
        musculotendon_length = musculotendon_length.value,
        fiber_length = result.x,
        residual = result.residual,
        iterations = result.iterations,
        bisections = result.bisections,
        "equilibrium solved"
    );

    Ok(EquilibriumSolution {
        fiber_length,
        terms,
        iterations: result.iterations,
        bisections: result.bisections,
    })
}

/// True when the error means the requested configuration has no valid
/// equilibrium, as opposed to the iteration running out of steps.
pub fn is_infeasible(error: &SolverError) -> bool {
    error.is_degenerate_geometry()
}
