//! Error types for simulation operations.

use mt_muscle::MuscleError;
use mt_solver::SolverError;
use thiserror::Error;

/// Errors encountered while driving actuators or integrating in time.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    /// The step may succeed with a smaller time step.
    #[error("Retryable failure: {message}")]
    Retryable { message: String },

    #[error("Unknown state slot: {name}")]
    UnknownSlot { name: String },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl SimError {
    /// Failures a cut-back time step can plausibly cure.
    ///
    /// A too-large step can push the fiber into a degenerate configuration
    /// or out of the range where the velocity solve converges quickly.
    pub fn is_retryable(&self) -> bool {
        match self {
            SimError::Retryable { .. } => true,
            SimError::Solver(e) => {
                matches!(e, SolverError::ConvergenceFailed { .. }) || e.is_degenerate_geometry()
            }
            _ => false,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;

impl From<MuscleError> for SimError {
    fn from(e: MuscleError) -> Self {
        SimError::Solver(SolverError::Muscle(e))
    }
}

impl From<mt_core::MtError> for SimError {
    fn from(e: mt_core::MtError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(
            SimError::Retryable {
                message: "x".into()
            }
            .is_retryable()
        );
        let conv = SimError::from(SolverError::ConvergenceFailed {
            iterations: 100,
            residual: 1.0,
            estimate: 0.1,
        });
        assert!(conv.is_retryable());
        let degenerate = SimError::from(MuscleError::DegenerateGeometry {
            what: "negative tendon length",
            fiber_length: 0.4,
            musculotendon_length: 0.3,
        });
        assert!(degenerate.is_retryable());
        assert!(!SimError::InvalidArg { what: "dt" }.is_retryable());
    }
}
