//! Pennation geometry and the fiber/tendon force balance.
//!
//! Fibers keep a constant height under constant-volume pennation:
//!
//! ```text
//! h = L_f0 sin(phi_0) = L_f sin(phi)
//! L_t = L_mt - L_f cos(phi) = L_mt - sqrt(L_f^2 - h^2)
//! ```
//!
//! so a fiber length is geometrically valid for a given musculotendon length
//! exactly when `h < L_f <= sqrt(L_mt^2 + h^2)`.

use crate::activation::ActivationDynamics;
use crate::curves::MuscleCurves;
use crate::error::{MuscleError, MuscleResult};
use crate::params::MuscleParams;
use mt_core::units::{Angle, Force, Length, m, rad};
use mt_core::{NormFiberLength, NormForce, NormTendonLength, Real, ensure_finite};

/// Relative slack for roundoff when a fiber sits exactly at the upper bound.
const ROUNDOFF_LENGTH: Real = 1e-12;

/// Fiber orientation and tendon length at one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberGeometry {
    pub fiber_length: Length,
    pub musculotendon_length: Length,
    pub sin_pennation: Real,
    pub cos_pennation: Real,
    pub tendon_length: Length,
}

impl FiberGeometry {
    /// Resolve pennation and tendon length, rejecting collapsed fibers and
    /// negative tendon lengths.
    pub fn new(
        params: &MuscleParams,
        fiber_length: Length,
        musculotendon_length: Length,
    ) -> MuscleResult<Self> {
        let lf = ensure_finite(fiber_length.value, "fiber length")?;
        let lmt = ensure_finite(musculotendon_length.value, "musculotendon length")?;
        let degenerate = |what: &'static str| MuscleError::DegenerateGeometry {
            what,
            fiber_length: lf,
            musculotendon_length: lmt,
        };

        if lf <= 0.0 {
            return Err(degenerate("fiber length must be positive"));
        }
        let sin = params.fiber_height().value / lf;
        if sin >= 1.0 {
            return Err(degenerate("fiber fully collapsed (cos(pennation) <= 0)"));
        }
        let cos = (1.0 - sin * sin).sqrt();
        let lt = lmt - lf * cos;
        if lt < -ROUNDOFF_LENGTH * lmt.abs().max(1.0) {
            return Err(degenerate("negative tendon length"));
        }
        let lt = lt.max(0.0);

        Ok(Self {
            fiber_length,
            musculotendon_length,
            sin_pennation: sin,
            cos_pennation: cos,
            tendon_length: m(lt),
        })
    }

    pub fn pennation(&self) -> Angle {
        rad(self.sin_pennation.asin())
    }

    /// Fiber length projected on the line of action.
    pub fn fiber_length_along_tendon(&self) -> Length {
        self.fiber_length * self.cos_pennation
    }

    pub fn normalized_fiber_length(&self, params: &MuscleParams) -> NormFiberLength {
        NormFiberLength::from_length(self.fiber_length, params.optimal_fiber_length())
    }

    pub fn normalized_tendon_length(&self, params: &MuscleParams) -> NormTendonLength {
        NormTendonLength::from_length(self.tendon_length, params.tendon_slack_length())
    }
}

/// Interval of geometrically valid fiber lengths `(h, sqrt(L_mt^2 + h^2)]`.
///
/// The lower end is open: at `L_f = h` the fiber stands perpendicular to the
/// tendon.
pub fn fiber_length_bounds(
    params: &MuscleParams,
    musculotendon_length: Length,
) -> MuscleResult<(Length, Length)> {
    let lmt = ensure_finite(musculotendon_length.value, "musculotendon length")?;
    if lmt <= 0.0 {
        return Err(MuscleError::DegenerateGeometry {
            what: "musculotendon length must be positive",
            fiber_length: f64::NAN,
            musculotendon_length: lmt,
        });
    }
    let h = params.fiber_height().value;
    Ok((m(h), m((lmt * lmt + h * h).sqrt())))
}

/// Isometric force-balance terms at one fiber length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceTerms {
    pub geometry: FiberGeometry,
    /// Activation after clamping.
    pub activation: Real,
    pub norm_fiber_length: NormFiberLength,
    /// `f_L` at full activation.
    pub active_multiplier: NormForce,
    /// Elastic passive force.
    pub passive_force: NormForce,
    pub tendon_force: NormForce,
    /// `F_tendon - F_fiber cos(phi)`.
    pub residual: Force,
}

impl BalanceTerms {
    /// `a f_L + f_PE`, along the fiber.
    pub fn fiber_force(&self) -> NormForce {
        NormForce(self.activation * self.active_multiplier.value() + self.passive_force.value())
    }
}

/// Evaluates `R(L_f) = F_T(L_t) - F_fiber(L_f) cos(phi)` for one actuator.
#[derive(Debug, Clone, Copy)]
pub struct ForceBalance<'a> {
    params: &'a MuscleParams,
    curves: MuscleCurves,
}

impl<'a> ForceBalance<'a> {
    pub fn new(params: &'a MuscleParams) -> Self {
        Self {
            params,
            curves: params.curves(),
        }
    }

    pub fn params(&self) -> &'a MuscleParams {
        self.params
    }

    pub fn curves(&self) -> &MuscleCurves {
        &self.curves
    }

    pub fn evaluate(
        &self,
        musculotendon_length: Length,
        fiber_length: Length,
        activation: Real,
    ) -> MuscleResult<BalanceTerms> {
        let geometry = FiberGeometry::new(self.params, fiber_length, musculotendon_length)?;
        let activation = ActivationDynamics::clamp(activation);
        let norm_fiber_length = geometry.normalized_fiber_length(self.params);
        let active_multiplier = self.curves.active.force(norm_fiber_length);
        let passive_force = self.curves.passive.elastic_force(norm_fiber_length);
        let tendon_force = self
            .curves
            .tendon
            .force(geometry.normalized_tendon_length(self.params));

        let fiber = activation * active_multiplier.value() + passive_force.value();
        let residual = NormForce(tendon_force.value() - fiber * geometry.cos_pennation)
            .to_force(self.params.max_isometric_force());

        Ok(BalanceTerms {
            geometry,
            activation,
            norm_fiber_length,
            active_multiplier,
            passive_force,
            tendon_force,
            residual,
        })
    }

    pub fn residual(
        &self,
        musculotendon_length: Length,
        fiber_length: Length,
        activation: Real,
    ) -> MuscleResult<Force> {
        Ok(self
            .evaluate(musculotendon_length, fiber_length, activation)?
            .residual)
    }
}
