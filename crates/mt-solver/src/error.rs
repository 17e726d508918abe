//! Error types for solver operations.

use mt_core::MtError;
use mt_muscle::MuscleError;
use thiserror::Error;

/// Errors that can occur while solving for equilibrium or fiber velocity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error(
        "Convergence failed after {iterations} iterations (residual = {residual}, estimate = {estimate})"
    )]
    ConvergenceFailed {
        iterations: usize,
        residual: f64,
        estimate: f64,
    },

    #[error("Muscle model error: {0}")]
    Muscle(#[from] MuscleError),

    #[error("Core error: {0}")]
    Core(#[from] MtError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

impl SolverError {
    /// True for collapsed fibers, negative tendon lengths and similar
    /// configurations no solver setting can fix.
    pub fn is_degenerate_geometry(&self) -> bool {
        matches!(
            self,
            SolverError::Muscle(MuscleError::DegenerateGeometry { .. })
        )
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
