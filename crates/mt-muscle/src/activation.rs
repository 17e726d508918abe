//! Activation dynamics.
//!
//! First-order lag from excitation `u` to activation `a`:
//!
//! ```text
//! da/dt = (u - a) / tau(u, a)
//!
//! tau = tau_act * (0.5 + 1.5 a)     if u >= a
//! tau = tau_deact / (0.5 + 1.5 a)   if u <  a
//! ```
//!
//! Both `u` and `a` are clamped to `[ACTIVATION_FLOOR, 1]` before evaluation.
//! Since the target `u` then never leaves that interval, an exact solution
//! starting inside it stays inside it.

use crate::params::MuscleParams;
use mt_core::{Real, clamp_unit};

/// Lowest activation the model will use. Keeps the force-velocity inversion
/// away from a zero contractile capacity.
pub const ACTIVATION_FLOOR: Real = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationDynamics {
    /// Activation time constant (s).
    pub tau_activation: Real,
    /// Deactivation time constant (s).
    pub tau_deactivation: Real,
}

impl ActivationDynamics {
    pub fn new(tau_activation: Real, tau_deactivation: Real) -> Self {
        Self {
            tau_activation,
            tau_deactivation,
        }
    }

    pub fn from_params(params: &MuscleParams) -> Self {
        Self::new(
            params.activation_time_constant().value,
            params.deactivation_time_constant().value,
        )
    }

    /// Clamp an activation or excitation into `[ACTIVATION_FLOOR, 1]`.
    pub fn clamp(value: Real) -> Real {
        clamp_unit(value, ACTIVATION_FLOOR, 1.0)
    }

    /// Effective time constant in seconds.
    pub fn time_constant(&self, excitation: Real, activation: Real) -> Real {
        let u = Self::clamp(excitation);
        let a = Self::clamp(activation);
        if u >= a {
            self.tau_activation * (0.5 + 1.5 * a)
        } else {
            self.tau_deactivation / (0.5 + 1.5 * a)
        }
    }

    /// da/dt in 1/s.
    pub fn derivative(&self, excitation: Real, activation: Real) -> Real {
        let u = Self::clamp(excitation);
        let a = Self::clamp(activation);
        (u - a) / self.time_constant(u, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamics() -> ActivationDynamics {
        ActivationDynamics::new(0.015, 0.050)
    }

    #[test]
    fn rising_uses_activation_constant() {
        let d = dynamics();
        let tau = d.time_constant(1.0, 0.2);
        assert!((tau - 0.015 * (0.5 + 0.3)).abs() < 1e-15);
        assert!(d.derivative(1.0, 0.2) > 0.0);
    }

    #[test]
    fn falling_uses_deactivation_constant() {
        let d = dynamics();
        let tau = d.time_constant(0.0, 0.6);
        assert!((tau - 0.050 / (0.5 + 0.9)).abs() < 1e-15);
        assert!(d.derivative(0.0, 0.6) < 0.0);
    }

    #[test]
    fn equal_excitation_is_steady() {
        assert_eq!(dynamics().derivative(0.4, 0.4), 0.0);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let d = dynamics();
        assert_eq!(d.derivative(1.5, 1.0), 0.0);
        assert_eq!(d.derivative(-0.3, ACTIVATION_FLOOR), 0.0);
        assert_eq!(d.derivative(-0.3, 0.0), 0.0);
        assert_eq!(d.derivative(f64::NAN, ACTIVATION_FLOOR), 0.0);
    }

    #[test]
    fn derivative_matches_first_order_formula() {
        let d = dynamics();
        let (u, a) = (0.8, 0.3);
        let expected = (u - a) / (0.015 * (0.5 + 1.5 * a));
        assert!((d.derivative(u, a) - expected).abs() < 1e-12);
    }
}
