//! Error types for muscle model operations.

use mt_core::MtError;
use thiserror::Error;

/// Errors raised by parameter validation and fiber geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MuscleError {
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error(
        "Degenerate geometry: {what} (fiber length = {fiber_length} m, musculotendon length = {musculotendon_length} m)"
    )]
    DegenerateGeometry {
        what: &'static str,
        fiber_length: f64,
        musculotendon_length: f64,
    },

    #[error("Core error: {0}")]
    Core(#[from] MtError),
}

pub type MuscleResult<T> = Result<T, MuscleError>;
