//! Constitutive curves of the Thelen (2003) muscle model.
//!
//! All curves are stateless and work on normalized quantities:
//!
//! ```text
//! active force-length    f_L(l)   Gaussian bell, peak 1 at l = 1
//! passive force-length   f_PE(l)  exponential above l = 1, 1 at l = 1 + eps0_M
//! force-velocity         f_V(v)   hyperbolic, 0 at v = -1, 1 at v = 0, -> flen
//! tendon force-length    f_T(lt)  exponential toe then linear, 1 at eps0_T
//! ```
//!
//! The fiber force along the fiber is
//! `F_max * (a * f_L(l) * f_V(v) + f_PE(l) + damping * v)`.

use crate::params::MuscleParams;
use mt_core::{NormFiberLength, NormForce, NormTendonLength, NormVelocity, Real};

/// Normalized fiber length where the ascending-limb blend ends.
///
/// Below this the Gaussian is pulled down by a cubic Hermite correction so
/// the curve reaches exactly zero, with zero slope, at zero length.
const ACTIVE_BLEND_END: Real = 0.4;

/// Normalized tendon force at the end of the exponential toe region.
const TENDON_TOE_FORCE: Real = 1.0 / 3.0;

/// Exponential curvature of the tendon toe region.
const TENDON_TOE_CURVATURE: Real = 3.0;

/// Fraction of the eccentric force range `[1, flen]` covered by the
/// hyperbolic branch before the inverse switches to linear extrapolation.
const ECCENTRIC_LINEAR_FRACTION: Real = 0.95;

/// Smallest `a * f_L` used when inverting force-velocity.
pub const MIN_CONTRACTILE_CAPACITY: Real = 1e-6;

/// Active force-length relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveForceLength {
    /// Gaussian width (Thelen's gamma).
    pub k_shape: Real,
}

impl ActiveForceLength {
    pub fn new(k_shape: Real) -> Self {
        Self { k_shape }
    }

    fn gaussian(&self, l: Real) -> Real {
        (-(l - 1.0).powi(2) / self.k_shape).exp()
    }

    /// Normalized active force at full activation.
    pub fn force(&self, l: NormFiberLength) -> NormForce {
        let l = l.value();
        if l <= 0.0 {
            return NormForce::ZERO;
        }
        let g = self.gaussian(l);
        if l >= ACTIVE_BLEND_END {
            return NormForce(g);
        }
        // Hermite basis on s in [0, 1]: p(0) = 1, p'(0) = G'(0)/G(0), p(1) = p'(1) = 0
        let g0 = self.gaussian(0.0);
        let s = l / ACTIVE_BLEND_END;
        let h00 = 2.0 * s.powi(3) - 3.0 * s.powi(2) + 1.0;
        let h10 = s.powi(3) - 2.0 * s.powi(2) + s;
        let p = h00 + h10 * ACTIVE_BLEND_END * 2.0 / self.k_shape;
        NormForce((g - g0 * p).max(0.0))
    }

    /// d f_L / d l.
    pub fn slope(&self, l: NormFiberLength) -> Real {
        let x = l.value();
        if x <= 0.0 {
            return 0.0;
        }
        let dg = -2.0 * (x - 1.0) / self.k_shape * self.gaussian(x);
        if x >= ACTIVE_BLEND_END {
            return dg;
        }
        let g0 = self.gaussian(0.0);
        let s = x / ACTIVE_BLEND_END;
        let dh00 = 6.0 * s.powi(2) - 6.0 * s;
        let dh10 = 3.0 * s.powi(2) - 4.0 * s + 1.0;
        let dp = (dh00 + dh10 * ACTIVE_BLEND_END * 2.0 / self.k_shape) / ACTIVE_BLEND_END;
        dg - g0 * dp
    }
}

/// Passive (parallel elastic) force-length relationship with linear damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassiveForceLength {
    /// Exponential shape factor.
    pub k_shape: Real,
    /// Passive strain at which the elastic force equals max isometric force.
    pub strain_at_fmax: Real,
    /// Normalized damping per unit normalized fiber velocity.
    pub damping: Real,
}

impl PassiveForceLength {
    pub fn new(k_shape: Real, strain_at_fmax: Real, damping: Real) -> Self {
        Self {
            k_shape,
            strain_at_fmax,
            damping,
        }
    }

    /// Elastic part only.
    pub fn elastic_force(&self, l: NormFiberLength) -> NormForce {
        let l = l.value();
        if l <= 1.0 {
            return NormForce::ZERO;
        }
        let num = (self.k_shape * (l - 1.0) / self.strain_at_fmax).exp() - 1.0;
        NormForce(num / (self.k_shape.exp() - 1.0))
    }

    /// d f_PE / d l.
    pub fn elastic_slope(&self, l: NormFiberLength) -> Real {
        let l = l.value();
        if l <= 1.0 {
            return 0.0;
        }
        let k = self.k_shape / self.strain_at_fmax;
        k * (k * (l - 1.0)).exp() / (self.k_shape.exp() - 1.0)
    }

    pub fn damping_force(&self, v: NormVelocity) -> NormForce {
        NormForce(self.damping * v.value())
    }

    /// Elastic plus damping.
    pub fn force(&self, l: NormFiberLength, v: NormVelocity) -> NormForce {
        NormForce(self.elastic_force(l).value() + self.damping_force(v).value())
    }
}

/// Force-velocity relationship.
///
/// Velocities are normalized by the activation-dependent max contraction
/// velocity, so `v = -1` is the unloaded shortening speed at any activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceVelocity {
    /// Curvature of the concentric branch.
    pub af: Real,
    /// Asymptotic eccentric force multiplier.
    pub flen: Real,
    /// Max contraction velocity at full activation (optimal lengths / s).
    pub vmax: Real,
    /// Max contraction velocity at zero activation (optimal lengths / s).
    pub vmax0: Real,
}

impl ForceVelocity {
    pub fn new(af: Real, flen: Real, vmax: Real, vmax0: Real) -> Self {
        Self {
            af,
            flen,
            vmax,
            vmax0,
        }
    }

    /// Max contraction velocity at activation `a`, interpolated between
    /// `vmax0` and `vmax` (optimal fiber lengths per second).
    pub fn max_velocity(&self, activation: Real) -> Real {
        let a = activation.clamp(0.0, 1.0);
        self.vmax0 + a * (self.vmax - self.vmax0)
    }

    // Eccentric hyperbola f = (1 + c v flen) / (1 + c v)
    fn eccentric_c(&self) -> Real {
        (2.0 + 2.0 / self.af) / (self.flen - 1.0)
    }

    fn linear_onset_force(&self) -> Real {
        1.0 + ECCENTRIC_LINEAR_FRACTION * (self.flen - 1.0)
    }

    fn linear_onset_velocity(&self) -> Real {
        let f = self.linear_onset_force();
        (f - 1.0) / (self.eccentric_c() * (self.flen - f))
    }

    fn linear_onset_slope(&self) -> Real {
        let c = self.eccentric_c();
        let v = self.linear_onset_velocity();
        c * (self.flen - 1.0) / (1.0 + c * v).powi(2)
    }

    fn concentric_floor_slope(&self) -> Real {
        self.af / (1.0 + self.af)
    }

    /// Force multiplier `f_V(v)`: 0 at or below `v = -1`, 1 at `v = 0`,
    /// approaching `flen` for fast lengthening.
    pub fn multiplier(&self, v: NormVelocity) -> Real {
        let v = v.value();
        if v <= -1.0 {
            0.0
        } else if v <= 0.0 {
            (1.0 + v) / (1.0 - v / self.af)
        } else {
            let c = self.eccentric_c();
            (1.0 + c * v * self.flen) / (1.0 + c * v)
        }
    }

    /// Force multiplier continued linearly past both ends of the hyperbolic
    /// range (below zero force, above the eccentric linear onset).
    ///
    /// This is the exact inverse of [`ForceVelocity::velocity_for_multiplier`]
    /// and is strictly increasing over all velocities.
    pub fn extended_multiplier(&self, v: NormVelocity) -> Real {
        let v = v.value();
        let v_lin = self.linear_onset_velocity();
        if v < -1.0 {
            (v + 1.0) * self.concentric_floor_slope()
        } else if v > v_lin {
            self.linear_onset_force() + self.linear_onset_slope() * (v - v_lin)
        } else {
            self.multiplier(NormVelocity(v))
        }
    }

    /// d/dv of [`ForceVelocity::extended_multiplier`].
    pub fn extended_slope(&self, v: NormVelocity) -> Real {
        let v = v.value();
        if v < -1.0 {
            self.concentric_floor_slope()
        } else if v <= 0.0 {
            let d = 1.0 - v / self.af;
            (1.0 + 1.0 / self.af) / (d * d)
        } else if v <= self.linear_onset_velocity() {
            let c = self.eccentric_c();
            c * (self.flen - 1.0) / (1.0 + c * v).powi(2)
        } else {
            self.linear_onset_slope()
        }
    }

    /// Invert the extended curve: velocity at which the multiplier equals `f`.
    ///
    /// The branch is picked by where `f` sits relative to isometric (1.0).
    pub fn velocity_for_multiplier(&self, f: Real) -> NormVelocity {
        let v = if f < 0.0 {
            -1.0 + f / self.concentric_floor_slope()
        } else if f <= 1.0 {
            (f - 1.0) / (1.0 + f / self.af)
        } else if f <= self.linear_onset_force() {
            (f - 1.0) / (self.eccentric_c() * (self.flen - f))
        } else {
            self.linear_onset_velocity()
                + (f - self.linear_onset_force()) / self.linear_onset_slope()
        };
        NormVelocity(v)
    }

    /// Velocity at which a contractile element with isometric capacity
    /// `active_capacity` (= `a * f_L`, normalized) carries `contractile_force`.
    ///
    /// Capacity is floored at [`MIN_CONTRACTILE_CAPACITY`].
    pub fn velocity(&self, active_capacity: Real, contractile_force: Real) -> NormVelocity {
        let capacity = active_capacity.max(MIN_CONTRACTILE_CAPACITY);
        self.velocity_for_multiplier(contractile_force / capacity)
    }
}

/// Tendon force-strain relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TendonForceLength {
    /// Tendon strain at max isometric force.
    pub strain_at_fmax: Real,
}

impl TendonForceLength {
    pub fn new(strain_at_fmax: Real) -> Self {
        Self { strain_at_fmax }
    }

    // Slope factor c/eps_toe of the toe at its end: F_toe K e^K / (e^K - 1).
    fn toe_end_slope_factor() -> Real {
        let ek = TENDON_TOE_CURVATURE.exp();
        TENDON_TOE_FORCE * TENDON_TOE_CURVATURE * ek / (ek - 1.0)
    }

    /// Strain where the exponential toe hands over to the linear region.
    ///
    /// Chosen so the curve is C1 there and passes through 1.0 at
    /// `strain_at_fmax`.
    pub fn toe_strain(&self) -> Real {
        let c = Self::toe_end_slope_factor();
        self.strain_at_fmax / (1.0 + (1.0 - TENDON_TOE_FORCE) / c)
    }

    /// Slope of the linear region (normalized force per unit strain).
    pub fn linear_stiffness(&self) -> Real {
        Self::toe_end_slope_factor() / self.toe_strain()
    }

    pub fn force(&self, lt: NormTendonLength) -> NormForce {
        let strain = lt.strain();
        if strain <= 0.0 {
            return NormForce::ZERO;
        }
        let toe = self.toe_strain();
        if strain <= toe {
            let num = (TENDON_TOE_CURVATURE * strain / toe).exp() - 1.0;
            NormForce(TENDON_TOE_FORCE * num / (TENDON_TOE_CURVATURE.exp() - 1.0))
        } else {
            NormForce(TENDON_TOE_FORCE + self.linear_stiffness() * (strain - toe))
        }
    }

    /// d f_T / d strain.
    pub fn stiffness(&self, lt: NormTendonLength) -> Real {
        let strain = lt.strain();
        if strain <= 0.0 {
            return 0.0;
        }
        let toe = self.toe_strain();
        if strain <= toe {
            let k = TENDON_TOE_CURVATURE / toe;
            TENDON_TOE_FORCE * k * (k * strain).exp() / (TENDON_TOE_CURVATURE.exp() - 1.0)
        } else {
            self.linear_stiffness()
        }
    }
}

/// The four curves of one actuator, parameterized together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuscleCurves {
    pub active: ActiveForceLength,
    pub passive: PassiveForceLength,
    pub force_velocity: ForceVelocity,
    pub tendon: TendonForceLength,
}

impl MuscleCurves {
    pub fn from_params(params: &MuscleParams) -> Self {
        Self {
            active: ActiveForceLength::new(params.k_shape_active()),
            passive: PassiveForceLength::new(
                params.k_shape_passive(),
                params.fmax_muscle_strain(),
                params.damping(),
            ),
            force_velocity: ForceVelocity::new(
                params.af(),
                params.flen(),
                params.vmax(),
                params.vmax0(),
            ),
            tendon: TendonForceLength::new(params.fmax_tendon_strain()),
        }
    }
}
