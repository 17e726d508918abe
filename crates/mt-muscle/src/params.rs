//! Physiological parameters of a Thelen 2003 musculotendon actuator.

use crate::curves::MuscleCurves;
use crate::error::{MuscleError, MuscleResult};
use mt_core::{Real, ensure_positive};
use mt_core::units::{Angle, Force, Length, Time, m, n, rad, s};
use std::f64::consts::FRAC_PI_2;

/// Parameter set for one actuator.
///
/// Fields are private: every mutation goes through a setter that validates the
/// new value and leaves the previous one in place when it is rejected.
///
/// Velocities `vmax`/`vmax0` are in optimal fiber lengths per second.
/// Strains and shape factors are dimensionless.
#[derive(Debug, Clone, PartialEq)]
pub struct MuscleParams {
    max_isometric_force: Force,
    optimal_fiber_length: Length,
    tendon_slack_length: Length,
    pennation_angle: Angle,
    activation_time_constant: Time,
    deactivation_time_constant: Time,
    vmax: Real,
    vmax0: Real,
    fmax_tendon_strain: Real,
    fmax_muscle_strain: Real,
    k_shape_active: Real,
    k_shape_passive: Real,
    damping: Real,
    af: Real,
    flen: Real,
}

impl Default for MuscleParams {
    /// Thelen (2003) young-adult values on a 1 kN, 10 cm fiber, 20 cm tendon unit.
    fn default() -> Self {
        Self {
            max_isometric_force: n(1000.0),
            optimal_fiber_length: m(0.1),
            tendon_slack_length: m(0.2),
            pennation_angle: rad(0.0),
            activation_time_constant: s(0.015),
            deactivation_time_constant: s(0.050),
            vmax: 10.0,
            vmax0: 5.0,
            fmax_tendon_strain: 0.033,
            fmax_muscle_strain: 0.6,
            k_shape_active: 0.45,
            k_shape_passive: 5.0,
            damping: 0.05,
            af: 0.25,
            flen: 1.4,
        }
    }
}

fn reject(name: &'static str, value: f64, reason: &'static str) -> MuscleError {
    tracing::warn!(parameter = name, value, reason, "rejected muscle parameter");
    MuscleError::InvalidParameter {
        name,
        value,
        reason,
    }
}

fn check_positive(name: &'static str, value: f64) -> MuscleResult<f64> {
    ensure_positive(value, name).map_err(|_| reject(name, value, "must be positive and finite"))
}

fn check_non_negative(name: &'static str, value: f64) -> MuscleResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(reject(name, value, "must be non-negative and finite"))
    }
}

fn check_pennation(value: f64) -> MuscleResult<f64> {
    if value.is_finite() && (0.0..FRAC_PI_2).contains(&value) {
        Ok(value)
    } else {
        Err(reject("pennation_angle", value, "must lie in [0, pi/2)"))
    }
}

fn check_flen(value: f64) -> MuscleResult<f64> {
    if value.is_finite() && value > 1.0 {
        Ok(value)
    } else {
        Err(reject("flen", value, "must exceed 1 (eccentric force above isometric)"))
    }
}

impl MuscleParams {
    /// Create a parameter set from the four architectural values, keeping
    /// the Thelen defaults for everything else.
    pub fn new(
        max_isometric_force: Force,
        optimal_fiber_length: Length,
        tendon_slack_length: Length,
        pennation_angle: Angle,
    ) -> MuscleResult<Self> {
        let mut params = Self::default();
        params.set_max_isometric_force(max_isometric_force)?;
        params.set_optimal_fiber_length(optimal_fiber_length)?;
        params.set_tendon_slack_length(tendon_slack_length)?;
        params.set_pennation_angle(pennation_angle)?;
        Ok(params)
    }

    /// Re-check every field. Used after bulk construction from configuration.
    pub fn validate(&self) -> MuscleResult<()> {
        check_positive("max_isometric_force", self.max_isometric_force.value)?;
        check_positive("optimal_fiber_length", self.optimal_fiber_length.value)?;
        check_positive("tendon_slack_length", self.tendon_slack_length.value)?;
        check_pennation(self.pennation_angle.value)?;
        check_positive(
            "activation_time_constant",
            self.activation_time_constant.value,
        )?;
        check_positive(
            "deactivation_time_constant",
            self.deactivation_time_constant.value,
        )?;
        check_positive("vmax", self.vmax)?;
        check_positive("vmax0", self.vmax0)?;
        check_positive("fmax_tendon_strain", self.fmax_tendon_strain)?;
        check_positive("fmax_muscle_strain", self.fmax_muscle_strain)?;
        check_positive("k_shape_active", self.k_shape_active)?;
        check_positive("k_shape_passive", self.k_shape_passive)?;
        check_non_negative("damping", self.damping)?;
        check_positive("af", self.af)?;
        check_flen(self.flen)?;
        self.warn_on_fast_deactivation();
        Ok(())
    }

    // Deactivation faster than activation is accepted but almost always a
    // swapped pair of constants.
    fn warn_on_fast_deactivation(&self) {
        if self.deactivation_time_constant < self.activation_time_constant {
            tracing::warn!(
                activation_s = self.activation_time_constant.value,
                deactivation_s = self.deactivation_time_constant.value,
                "deactivation time constant is shorter than activation time constant"
            );
        }
    }

    /// Curves parameterized by this set.
    pub fn curves(&self) -> MuscleCurves {
        MuscleCurves::from_params(self)
    }

    /// Multiply optimal fiber length and tendon slack length by `factor`.
    pub fn scale_lengths(&mut self, factor: Real) -> MuscleResult<()> {
        let factor = check_positive("scale_factor", factor)?;
        self.optimal_fiber_length = self.optimal_fiber_length * factor;
        self.tendon_slack_length = self.tendon_slack_length * factor;
        Ok(())
    }

    /// Fiber height `L_f0 * sin(phi_0)`, constant under constant-volume pennation.
    pub fn fiber_height(&self) -> Length {
        self.optimal_fiber_length * self.pennation_angle.value.sin()
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn max_isometric_force(&self) -> Force {
        self.max_isometric_force
    }
    pub fn optimal_fiber_length(&self) -> Length {
        self.optimal_fiber_length
    }
    pub fn tendon_slack_length(&self) -> Length {
        self.tendon_slack_length
    }
    pub fn pennation_angle(&self) -> Angle {
        self.pennation_angle
    }
    pub fn activation_time_constant(&self) -> Time {
        self.activation_time_constant
    }
    pub fn deactivation_time_constant(&self) -> Time {
        self.deactivation_time_constant
    }
    pub fn vmax(&self) -> Real {
        self.vmax
    }
    pub fn vmax0(&self) -> Real {
        self.vmax0
    }
    pub fn fmax_tendon_strain(&self) -> Real {
        self.fmax_tendon_strain
    }
    pub fn fmax_muscle_strain(&self) -> Real {
        self.fmax_muscle_strain
    }
    pub fn k_shape_active(&self) -> Real {
        self.k_shape_active
    }
    pub fn k_shape_passive(&self) -> Real {
        self.k_shape_passive
    }
    pub fn damping(&self) -> Real {
        self.damping
    }
    pub fn af(&self) -> Real {
        self.af
    }
    pub fn flen(&self) -> Real {
        self.flen
    }

    // ---------------------------------------------------------------------
    // Validated mutators
    // ---------------------------------------------------------------------

    pub fn set_max_isometric_force(&mut self, value: Force) -> MuscleResult<()> {
        check_positive("max_isometric_force", value.value)?;
        self.max_isometric_force = value;
        Ok(())
    }

    pub fn set_optimal_fiber_length(&mut self, value: Length) -> MuscleResult<()> {
        check_positive("optimal_fiber_length", value.value)?;
        self.optimal_fiber_length = value;
        Ok(())
    }

    pub fn set_tendon_slack_length(&mut self, value: Length) -> MuscleResult<()> {
        check_positive("tendon_slack_length", value.value)?;
        self.tendon_slack_length = value;
        Ok(())
    }

    pub fn set_pennation_angle(&mut self, value: Angle) -> MuscleResult<()> {
        check_pennation(value.value)?;
        self.pennation_angle = value;
        Ok(())
    }

    pub fn set_activation_time_constant(&mut self, value: Time) -> MuscleResult<()> {
        check_positive("activation_time_constant", value.value)?;
        self.activation_time_constant = value;
        self.warn_on_fast_deactivation();
        Ok(())
    }

    pub fn set_deactivation_time_constant(&mut self, value: Time) -> MuscleResult<()> {
        check_positive("deactivation_time_constant", value.value)?;
        self.deactivation_time_constant = value;
        self.warn_on_fast_deactivation();
        Ok(())
    }

    pub fn set_vmax(&mut self, value: Real) -> MuscleResult<()> {
        self.vmax = check_positive("vmax", value)?;
        Ok(())
    }

    pub fn set_vmax0(&mut self, value: Real) -> MuscleResult<()> {
        self.vmax0 = check_positive("vmax0", value)?;
        Ok(())
    }

    pub fn set_fmax_tendon_strain(&mut self, value: Real) -> MuscleResult<()> {
        self.fmax_tendon_strain = check_positive("fmax_tendon_strain", value)?;
        Ok(())
    }

    pub fn set_fmax_muscle_strain(&mut self, value: Real) -> MuscleResult<()> {
        self.fmax_muscle_strain = check_positive("fmax_muscle_strain", value)?;
        Ok(())
    }

    pub fn set_k_shape_active(&mut self, value: Real) -> MuscleResult<()> {
        self.k_shape_active = check_positive("k_shape_active", value)?;
        Ok(())
    }

    pub fn set_k_shape_passive(&mut self, value: Real) -> MuscleResult<()> {
        self.k_shape_passive = check_positive("k_shape_passive", value)?;
        Ok(())
    }

    pub fn set_damping(&mut self, value: Real) -> MuscleResult<()> {
        self.damping = check_non_negative("damping", value)?;
        Ok(())
    }

    pub fn set_af(&mut self, value: Real) -> MuscleResult<()> {
        self.af = check_positive("af", value)?;
        Ok(())
    }

    pub fn set_flen(&mut self, value: Real) -> MuscleResult<()> {
        self.flen = check_flen(value)?;
        Ok(())
    }
}
