//! mt-core: stable foundation for the musculotendon workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - normalized (dimensionless muscle quantities, one type per reference scale)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact state-slot identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod normalized;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{MtError, MtResult};
pub use ids::*;
pub use normalized::*;
pub use numeric::*;
pub use units::*;
