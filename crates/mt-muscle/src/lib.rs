//! mt-muscle: Hill-type musculotendon mechanics after Thelen (2003).
//!
//! Provides the stateless pieces of the actuator:
//! - validated physiological parameters
//! - constitutive curves (active/passive force-length, force-velocity, tendon)
//! - activation dynamics
//! - constant-volume pennation geometry and the fiber/tendon force balance
//!
//! Everything here is a pure function of parameters and the values passed in.
//! Solving for equilibrium and fiber velocity lives in `mt-solver`; owning
//! state lives in `mt-sim`.
//!
//! # Example
//!
//! ```
//! use mt_core::units::{m, n, rad};
//! use mt_muscle::{ForceBalance, MuscleParams};
//!
//! let params = MuscleParams::new(n(1000.0), m(0.1), m(0.2), rad(0.0)).unwrap();
//! let balance = ForceBalance::new(&params);
//! let terms = balance.evaluate(m(0.3), m(0.1), 1.0).unwrap();
//! assert!(terms.residual.value < 0.0); // slack tendon, fiber pulling
//! ```

pub mod activation;
pub mod curves;
pub mod error;
pub mod geometry;
pub mod params;

pub use activation::{ACTIVATION_FLOOR, ActivationDynamics};
pub use curves::{
    ActiveForceLength, ForceVelocity, MIN_CONTRACTILE_CAPACITY, MuscleCurves, PassiveForceLength,
    TendonForceLength,
};
pub use error::{MuscleError, MuscleResult};
pub use geometry::{BalanceTerms, FiberGeometry, ForceBalance, fiber_length_bounds};
pub use params::MuscleParams;
