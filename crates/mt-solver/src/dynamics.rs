//! State derivatives of the actuator.
//!
//! The tendon force at the current state is taken as given and the fiber
//! velocity that lets the contractile element carry it is found by
//! inverting force-velocity:
//!
//! ```text
//! F_T / cos(phi) - f_PE = a f_L f_V(v) + damping * v
//! ```
//!
//! Without damping this is a closed-form inverse. With damping the left side
//! is still strictly increasing in `v`, and the root lies between zero and
//! the undamped solution, so a bracketed Newton solve finds it.

use crate::error::SolverResult;
use crate::newton::{NewtonConfig, newton_solve};
use mt_core::units::{Force, Length, Velocity, m, mps};
use mt_core::{NormForce, NormVelocity, Real};
use mt_muscle::{
    ActivationDynamics, BalanceTerms, ForceBalance, ForceVelocity, MIN_CONTRACTILE_CAPACITY,
    MuscleError, MuscleParams,
};

/// Everything the derivative engine reads at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuscleInputs {
    pub musculotendon_length: Length,
    /// Only used as the starting guess of the damped velocity solve.
    pub musculotendon_speed: Velocity,
    pub activation: Real,
    pub fiber_length: Length,
    pub excitation: Real,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateDerivatives {
    /// da/dt (1/s)
    pub activation: Real,
    /// dL_f/dt
    pub fiber_length: Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativeEvaluation {
    pub derivatives: StateDerivatives,
    pub terms: BalanceTerms,
    pub norm_velocity: NormVelocity,
    /// Max contraction velocity at the current activation (optimal lengths / s).
    pub max_velocity: Real,
    /// Force transmitted along the line of action.
    pub tendon_force: Force,
}

/// Evaluate `da/dt` and `dL_f/dt`, along with the tendon force.
pub fn evaluate_derivatives(
    params: &MuscleParams,
    inputs: &MuscleInputs,
    config: &NewtonConfig,
) -> SolverResult<DerivativeEvaluation> {
    let balance = ForceBalance::new(params);
    let terms = balance.evaluate(
        inputs.musculotendon_length,
        inputs.fiber_length,
        inputs.activation,
    )?;
    let fv = &balance.curves().force_velocity;
    let max_velocity = fv.max_velocity(terms.activation);
    let velocity_scale = max_velocity * params.optimal_fiber_length().value;
    let cos = terms.geometry.cos_pennation;

    let contractile = terms.tendon_force.value() / cos - terms.passive_force.value();
    let capacity =
        (terms.activation * terms.active_multiplier.value()).max(MIN_CONTRACTILE_CAPACITY);
    let rigid_guess = NormVelocity(inputs.musculotendon_speed.value * cos / velocity_scale);

    let norm_velocity = contractile_velocity(
        fv,
        params.damping(),
        capacity,
        contractile,
        rigid_guess,
        config,
    )?;

    let activation_rate =
        ActivationDynamics::from_params(params).derivative(inputs.excitation, terms.activation);
    let fiber_velocity = mps(norm_velocity.value() * velocity_scale);
    let tendon_force = terms.tendon_force.to_force(params.max_isometric_force());

    tracing::trace!(
        fiber_length = inputs.fiber_length.value,
        fiber_velocity = fiber_velocity.value,
        activation_rate,
        tendon_force = tendon_force.value,
        "state derivatives"
    );

    Ok(DerivativeEvaluation {
        derivatives: StateDerivatives {
            activation: activation_rate,
            fiber_length: fiber_velocity,
        },
        terms,
        norm_velocity,
        max_velocity,
        tendon_force,
    })
}

/// Normalized velocity at which `capacity * f_V(v) + damping * v` equals
/// `contractile`.
fn contractile_velocity(
    fv: &ForceVelocity,
    damping: Real,
    capacity: Real,
    contractile: Real,
    guess: NormVelocity,
    config: &NewtonConfig,
) -> SolverResult<NormVelocity> {
    let undamped = fv.velocity(capacity, contractile).value();
    if damping == 0.0 || undamped == 0.0 {
        return Ok(NormVelocity(undamped));
    }

    let (lo, hi) = if undamped > 0.0 {
        (0.0, undamped)
    } else {
        (undamped, 0.0)
    };
    let residual = |v: Real| -> SolverResult<Real> {
        Ok(capacity * fv.extended_multiplier(NormVelocity(v)) + damping * v - contractile)
    };
    let start = if guess.value().is_finite() {
        guess.value().clamp(lo, hi)
    } else {
        0.5 * undamped
    };
    let result = newton_solve(start, (lo, hi), residual, config)?;
    Ok(NormVelocity(result.x))
}

/// Force along the line of action when the tendon is treated as rigid and
/// the musculotendon unit shortens or lengthens at a constant speed.
///
/// The tendon sits at slack length, so the fiber takes up the rest of
/// `L_mt` and moves at `dL_mt/dt * cos(phi)`.
pub fn isokinetic_force_rigid_tendon(
    params: &MuscleParams,
    musculotendon_length: Length,
    musculotendon_speed: Velocity,
    activation: Real,
) -> SolverResult<Force> {
    let along = musculotendon_length.value - params.tendon_slack_length().value;
    if along <= 0.0 {
        return Err(MuscleError::DegenerateGeometry {
            what: "musculotendon length does not exceed tendon slack length",
            fiber_length: f64::NAN,
            musculotendon_length: musculotendon_length.value,
        }
        .into());
    }
    let h = params.fiber_height().value;
    let fiber_length = m((along * along + h * h).sqrt());

    let balance = ForceBalance::new(params);
    let terms = balance.evaluate(musculotendon_length, fiber_length, activation)?;
    let curves = balance.curves();
    let cos = terms.geometry.cos_pennation;
    let velocity_scale =
        curves.force_velocity.max_velocity(terms.activation) * params.optimal_fiber_length().value;
    let v = NormVelocity(musculotendon_speed.value * cos / velocity_scale);

    let fiber = terms.activation
        * terms.active_multiplier.value()
        * curves.force_velocity.multiplier(v)
        + curves.passive.force(terms.norm_fiber_length, v).value();
    Ok(NormForce(fiber * cos).to_force(params.max_isometric_force()))
}
