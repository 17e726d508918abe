//! Dimensionless muscle quantities.
//!
//! Each reference scale gets its own type so a length normalized by optimal
//! fiber length cannot be handed to a curve expecting one normalized by
//! tendon slack length:
//!
//! | type | reference |
//! |---|---|
//! | [`NormFiberLength`] | optimal fiber length |
//! | [`NormTendonLength`] | tendon slack length |
//! | [`NormForce`] | max isometric force |
//! | [`NormVelocity`] | max contraction velocity (optimal lengths per second) |

use crate::numeric::Real;
use crate::units::{Force, Length, n};
use core::fmt;

macro_rules! normalized_scalar {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub Real);

        impl $name {
            #[inline]
            pub fn new(v: Real) -> Self {
                Self(v)
            }

            #[inline]
            pub fn value(self) -> Real {
                self.0
            }
        }

        impl From<Real> for $name {
            fn from(v: Real) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.6}", self.0)
            }
        }
    };
}

normalized_scalar!(
    /// Fiber length divided by optimal fiber length.
    NormFiberLength
);
normalized_scalar!(
    /// Tendon length divided by tendon slack length.
    NormTendonLength
);
normalized_scalar!(
    /// Force divided by max isometric force.
    NormForce
);
normalized_scalar!(
    /// Fiber velocity divided by the activation-dependent max contraction
    /// velocity. Negative is shortening (concentric).
    NormVelocity
);

impl NormFiberLength {
    pub fn from_length(fiber_length: Length, optimal_fiber_length: Length) -> Self {
        Self(fiber_length.value / optimal_fiber_length.value)
    }

    pub fn to_length(self, optimal_fiber_length: Length) -> Length {
        optimal_fiber_length * self.0
    }
}

impl NormTendonLength {
    pub fn from_length(tendon_length: Length, tendon_slack_length: Length) -> Self {
        Self(tendon_length.value / tendon_slack_length.value)
    }

    /// Engineering strain relative to slack length.
    pub fn strain(self) -> Real {
        self.0 - 1.0
    }
}

impl NormForce {
    pub const ZERO: Self = Self(0.0);

    pub fn from_force(force: Force, max_isometric_force: Force) -> Self {
        Self(force.value / max_isometric_force.value)
    }

    pub fn to_force(self, max_isometric_force: Force) -> Force {
        n(self.0 * max_isometric_force.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::m;

    #[test]
    fn fiber_length_round_trip() {
        let lopt = m(0.12);
        let norm = NormFiberLength::from_length(m(0.09), lopt);
        assert!((norm.value() - 0.75).abs() < 1e-12);
        assert!((norm.to_length(lopt).value - 0.09).abs() < 1e-12);
    }

    #[test]
    fn tendon_strain_is_relative_to_slack() {
        let norm = NormTendonLength::from_length(m(0.2066), m(0.2));
        assert!((norm.strain() - 0.033).abs() < 1e-9);
    }

    #[test]
    fn force_scaling() {
        let fmax = n(1500.0);
        let norm = NormForce::from_force(n(750.0), fmax);
        assert_eq!(norm, NormForce(0.5));
        assert_eq!(norm.to_force(fmax).value, 750.0);
    }
}
