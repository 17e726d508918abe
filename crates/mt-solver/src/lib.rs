//! Numerical core of the musculotendon actuator.
//!
//! This crate provides:
//! - a scalar Newton solver that never leaves its admissible interval and
//!   falls back to bisection once a sign change is known
//! - the equilibrium solve for fiber length at a given musculotendon length
//! - the derivative engine: fiber velocity from the inverted force-velocity
//!   relation, combined with activation dynamics

pub mod dynamics;
pub mod equilibrium;
pub mod error;
pub mod initialization;
pub mod jacobian;
pub mod newton;

pub use dynamics::{
    DerivativeEvaluation, MuscleInputs, StateDerivatives, evaluate_derivatives,
    isokinetic_force_rigid_tendon,
};
pub use equilibrium::{EquilibriumConfig, EquilibriumSolution, solve_equilibrium};
pub use error::{SolverError, SolverResult};
pub use initialization::InitialGuess;
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
