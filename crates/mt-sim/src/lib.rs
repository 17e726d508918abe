//! Host-side machinery for musculotendon actuators.
//!
//! Provides:
//! - a state store of named scalar slots (values and derivatives)
//! - the Thelen 2003 actuator facade behind the `MuscleActuator` capability
//! - path-length and excitation sources
//! - a multi-actuator transient model evaluated in parallel
//! - fixed-step RK4 / forward Euler integration with step cutback

pub mod actuator;
pub mod error;
pub mod excitation;
pub mod integrator;
pub mod model;
pub mod musculotendon;
pub mod path;
pub mod sim;
pub mod state;

pub use actuator::{FiberSnapshot, MuscleActuator, MuscleSlots, Thelen2003Muscle};
pub use error::{SimError, SimResult};
pub use excitation::{ConstantExcitation, Excitation, RampExcitation, StepExcitation};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use musculotendon::{MuscleUnit, MusculotendonModel};
pub use path::{FixedPath, MusclePath, PathKinematics, SinusoidalPath};
pub use sim::{IntegratorType, SimOptions, SimRecord, run_sim};
pub use state::StateStore;
