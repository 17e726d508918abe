//! Musculotendon path kinematics supplied by the host.

use crate::error::{SimError, SimResult};
use mt_core::units::{Length, Velocity, m, mps};
use std::f64::consts::TAU;

/// Total musculotendon length and its rate of change at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathKinematics {
    pub length: Length,
    /// Positive when lengthening.
    pub speed: Velocity,
}

impl PathKinematics {
    pub fn new(length: Length, speed: Velocity) -> Self {
        Self { length, speed }
    }

    pub fn stationary(length: Length) -> Self {
        Self::new(length, mps(0.0))
    }
}

/// Source of musculotendon length over time.
pub trait MusclePath: Send + Sync {
    fn kinematics(&self, t: f64) -> PathKinematics;
}

/// Constant length, zero speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPath {
    pub length: Length,
}

impl FixedPath {
    pub fn new(length: Length) -> SimResult<Self> {
        if !(length.value.is_finite() && length.value > 0.0) {
            return Err(SimError::InvalidArg {
                what: "path length must be positive",
            });
        }
        Ok(Self { length })
    }
}

impl MusclePath for FixedPath {
    fn kinematics(&self, _t: f64) -> PathKinematics {
        PathKinematics::stationary(self.length)
    }
}

/// `L(t) = mean + amplitude * sin(2 pi f t + phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinusoidalPath {
    pub mean: Length,
    pub amplitude: Length,
    /// Hz
    pub frequency: f64,
    /// rad
    pub phase: f64,
}

impl SinusoidalPath {
    pub fn new(mean: Length, amplitude: Length, frequency: f64, phase: f64) -> SimResult<Self> {
        if !(amplitude.value >= 0.0 && mean.value - amplitude.value > 0.0) {
            return Err(SimError::InvalidArg {
                what: "sinusoidal path must stay at positive length",
            });
        }
        if !(frequency.is_finite() && frequency >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "frequency must be non-negative",
            });
        }
        Ok(Self {
            mean,
            amplitude,
            frequency,
            phase,
        })
    }
}

impl MusclePath for SinusoidalPath {
    fn kinematics(&self, t: f64) -> PathKinematics {
        let omega = TAU * self.frequency;
        let arg = omega * t + self.phase;
        PathKinematics::new(
            m(self.mean.value + self.amplitude.value * arg.sin()),
            mps(self.amplitude.value * omega * arg.cos()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_path_is_stationary() {
        let p = FixedPath::new(m(0.3)).unwrap();
        let k = p.kinematics(12.0);
        assert_eq!(k.length, m(0.3));
        assert_eq!(k.speed.value, 0.0);
        assert!(FixedPath::new(m(-0.1)).is_err());
    }

    #[test]
    fn sinusoid_speed_matches_length_slope() {
        let p = SinusoidalPath::new(m(0.3), m(0.01), 2.0, 0.3).unwrap();
        let t = 0.17;
        let h = 1e-6;
        let slope =
            (p.kinematics(t + h).length.value - p.kinematics(t - h).length.value) / (2.0 * h);
        assert!((slope - p.kinematics(t).speed.value).abs() < 1e-6);
    }

    #[test]
    fn sinusoid_rejects_nonpositive_lengths() {
        assert!(SinusoidalPath::new(m(0.1), m(0.2), 1.0, 0.0).is_err());
    }
}
