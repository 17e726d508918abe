//! Excitation (control) signals.
//!
//! Signals may leave `[0, 1]`; activation dynamics clamps them.

use crate::error::{SimError, SimResult};

pub trait Excitation: Send + Sync {
    fn excitation(&self, t: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantExcitation(pub f64);

impl Excitation for ConstantExcitation {
    fn excitation(&self, _t: f64) -> f64 {
        self.0
    }
}

/// Jumps from `before` to `after` at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepExcitation {
    pub before: f64,
    pub after: f64,
    pub time: f64,
}

impl Excitation for StepExcitation {
    fn excitation(&self, t: f64) -> f64 {
        if t < self.time { self.before } else { self.after }
    }
}

/// Linear ramp between two times, constant outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampExcitation {
    pub start_value: f64,
    pub end_value: f64,
    pub start_time: f64,
    pub end_time: f64,
}

impl RampExcitation {
    pub fn new(
        start_value: f64,
        end_value: f64,
        start_time: f64,
        end_time: f64,
    ) -> SimResult<Self> {
        if !(end_time > start_time) {
            return Err(SimError::InvalidArg {
                what: "ramp end_time must be after start_time",
            });
        }
        Ok(Self {
            start_value,
            end_value,
            start_time,
            end_time,
        })
    }
}

impl Excitation for RampExcitation {
    fn excitation(&self, t: f64) -> f64 {
        if t <= self.start_time {
            self.start_value
        } else if t >= self.end_time {
            self.end_value
        } else {
            let s = (t - self.start_time) / (self.end_time - self.start_time);
            self.start_value + s * (self.end_value - self.start_value)
        }
    }
}
