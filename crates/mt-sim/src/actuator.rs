//! Thelen (2003) musculotendon actuator facade.
//!
//! The actuator owns its parameters and solver settings but no state. Its
//! two state variables, activation and fiber length, live in a host
//! [`StateStore`] under `"<name>.activation"` and `"<name>.fiber_length"`,
//! registered once through [`MuscleActuator::register`].

use crate::error::{SimError, SimResult};
use crate::path::PathKinematics;
use crate::state::StateStore;
use mt_core::units::{Angle, Force, Length, m};
use mt_core::{NormFiberLength, NormForce, Real, SlotId};
use mt_muscle::{ActivationDynamics, ForceBalance, MuscleParams};
use mt_solver::{
    EquilibriumConfig, EquilibriumSolution, MuscleInputs, NewtonConfig, StateDerivatives,
    evaluate_derivatives, isokinetic_force_rigid_tendon, solve_equilibrium,
};

/// Activation written into the store at registration.
pub const DEFAULT_ACTIVATION: Real = 0.05;

/// Capability a host needs from a musculotendon actuator.
pub trait MuscleActuator: Send + Sync {
    fn name(&self) -> &str;

    /// Add this actuator's state slots to `store`.
    fn register(&mut self, store: &mut StateStore) -> SimResult<()>;

    /// Slot handles, once registered.
    fn slots(&self) -> SimResult<MuscleSlots>;

    /// Solve the fiber/tendon force balance and write the fiber length into
    /// the store.
    fn compute_equilibrium(
        &self,
        store: &mut StateStore,
        path: PathKinematics,
    ) -> SimResult<EquilibriumSolution>;

    /// Tendon force at the stored state.
    fn compute_actuation(&self, store: &StateStore, path: PathKinematics) -> SimResult<Force>;

    /// `(da/dt, dL_f/dt)` at the stored state, without touching the store.
    fn state_derivatives(
        &self,
        store: &StateStore,
        path: PathKinematics,
        excitation: Real,
    ) -> SimResult<StateDerivatives>;

    /// Same as [`MuscleActuator::state_derivatives`], also writing the
    /// derivatives into the store.
    fn compute_state_variable_derivatives(
        &self,
        store: &mut StateStore,
        path: PathKinematics,
        excitation: Real,
    ) -> SimResult<StateDerivatives> {
        let d = self.state_derivatives(store, path, excitation)?;
        let slots = self.slots()?;
        store.set_derivative(slots.activation, d.activation)?;
        store.set_derivative(slots.fiber_length, d.fiber_length.value)?;
        Ok(d)
    }

    /// Derived quantities at the stored state.
    fn snapshot(&self, store: &StateStore, path: PathKinematics) -> SimResult<FiberSnapshot>;

    /// Scale length parameters by `factor` and re-establish equilibrium.
    fn rescale(
        &mut self,
        store: &mut StateStore,
        path: PathKinematics,
        factor: Real,
    ) -> SimResult<EquilibriumSolution>;
}

/// Store handles of one actuator's state variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuscleSlots {
    pub activation: SlotId,
    pub fiber_length: SlotId,
}

/// Quantities derived from the state, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiberSnapshot {
    /// After clamping.
    pub activation: Real,
    pub fiber_length: Length,
    pub normalized_fiber_length: NormFiberLength,
    pub pennation_angle: Angle,
    pub tendon_length: Length,
    /// `a * f_L * F_max`, along the fiber.
    pub active_fiber_force: Force,
    /// Elastic passive force along the fiber.
    pub passive_fiber_force: Force,
    /// Active plus passive, along the fiber.
    pub fiber_force: Force,
    pub tendon_force: Force,
    /// Tendon force over max isometric force.
    pub stress: Real,
}

#[derive(Debug, Clone)]
pub struct Thelen2003Muscle {
    name: String,
    params: MuscleParams,
    equilibrium: EquilibriumConfig,
    velocity_solver: NewtonConfig,
    slots: Option<MuscleSlots>,
    pre_scale_length: Option<Length>,
}

impl Thelen2003Muscle {
    /// Actuator with the given architecture and default Thelen constants.
    pub fn new(
        name: impl Into<String>,
        max_isometric_force: Force,
        optimal_fiber_length: Length,
        tendon_slack_length: Length,
        pennation_angle: Angle,
    ) -> SimResult<Self> {
        let params = MuscleParams::new(
            max_isometric_force,
            optimal_fiber_length,
            tendon_slack_length,
            pennation_angle,
        )?;
        Self::with_params(name, params)
    }

    pub fn with_params(name: impl Into<String>, params: MuscleParams) -> SimResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SimError::InvalidArg {
                what: "actuator name must not be empty",
            });
        }
        params.validate()?;
        Ok(Self {
            name,
            params,
            equilibrium: EquilibriumConfig::default(),
            velocity_solver: NewtonConfig::default(),
            slots: None,
            pre_scale_length: None,
        })
    }

    pub fn with_equilibrium_config(mut self, config: EquilibriumConfig) -> Self {
        self.equilibrium = config;
        self
    }

    pub fn params(&self) -> &MuscleParams {
        &self.params
    }

    /// Parameter setters validate individually and keep the old value on
    /// rejection.
    pub fn params_mut(&mut self) -> &mut MuscleParams {
        &mut self.params
    }

    pub fn equilibrium_config(&self) -> &EquilibriumConfig {
        &self.equilibrium
    }

    pub fn set_equilibrium_config(&mut self, config: EquilibriumConfig) {
        self.equilibrium = config;
    }

    /// Host state index of local state variable `i` (0 = activation,
    /// 1 = fiber length).
    pub fn state_variable_y_index(&self, i: usize) -> SimResult<usize> {
        let slots = self.slots()?;
        match i {
            0 => Ok(slots.activation.as_usize()),
            1 => Ok(slots.fiber_length.as_usize()),
            _ => Err(SimError::InvalidArg {
                what: "state variable index must be 0 (activation) or 1 (fiber length)",
            }),
        }
    }

    // ---------------------------------------------------------------------
    // State accessors
    // ---------------------------------------------------------------------

    pub fn activation(&self, store: &StateStore) -> SimResult<Real> {
        store.value(self.slots()?.activation)
    }

    /// Stores the activation clamped to `[ACTIVATION_FLOOR, 1]`.
    pub fn set_activation(&self, store: &mut StateStore, activation: Real) -> SimResult<()> {
        store.set_value(self.slots()?.activation, ActivationDynamics::clamp(activation))
    }

    pub fn activation_derivative(&self, store: &StateStore) -> SimResult<Real> {
        store.derivative(self.slots()?.activation)
    }

    pub fn fiber_length(&self, store: &StateStore) -> SimResult<Length> {
        Ok(m(store.value(self.slots()?.fiber_length)?))
    }

    pub fn set_fiber_length(&self, store: &mut StateStore, length: Length) -> SimResult<()> {
        if !(length.value.is_finite() && length.value > 0.0) {
            return Err(SimError::NonPhysical {
                what: "fiber length must be positive",
            });
        }
        store.set_value(self.slots()?.fiber_length, length.value)
    }

    pub fn fiber_length_derivative(&self, store: &StateStore) -> SimResult<Real> {
        store.derivative(self.slots()?.fiber_length)
    }

    // ---------------------------------------------------------------------
    // Derived quantities
    // ---------------------------------------------------------------------

    pub fn pennation_angle(&self, store: &StateStore, path: PathKinematics) -> SimResult<Angle> {
        Ok(self.snapshot(store, path)?.pennation_angle)
    }

    pub fn normalized_fiber_length(
        &self,
        store: &StateStore,
        path: PathKinematics,
    ) -> SimResult<NormFiberLength> {
        Ok(self.snapshot(store, path)?.normalized_fiber_length)
    }

    pub fn passive_fiber_force(
        &self,
        store: &StateStore,
        path: PathKinematics,
    ) -> SimResult<Force> {
        Ok(self.snapshot(store, path)?.passive_fiber_force)
    }

    pub fn stress(&self, store: &StateStore, path: PathKinematics) -> SimResult<Real> {
        Ok(self.snapshot(store, path)?.stress)
    }

    /// Set activation, solve equilibrium and return the tendon force.
    pub fn compute_isometric_force(
        &self,
        store: &mut StateStore,
        path: PathKinematics,
        activation: Real,
    ) -> SimResult<Force> {
        self.set_activation(store, activation)?;
        let sol = self.compute_equilibrium(store, path)?;
        Ok(sol.tendon_force(&self.params))
    }

    /// Force with the tendon held at slack length and the fiber moving with
    /// the path. Does not read or write the store.
    pub fn compute_isokinetic_force_assuming_infinitely_stiff_tendon(
        &self,
        path: PathKinematics,
        activation: Real,
    ) -> SimResult<Force> {
        Ok(isokinetic_force_rigid_tendon(
            &self.params,
            path.length,
            path.speed,
            activation,
        )?)
    }

    // ---------------------------------------------------------------------
    // Scaling
    // ---------------------------------------------------------------------

    /// Remember the path length before a geometric rescale.
    pub fn pre_scale(&mut self, path_length: Length) -> SimResult<()> {
        if !(path_length.value.is_finite() && path_length.value > 0.0) {
            return Err(SimError::InvalidArg {
                what: "path length before scaling must be positive",
            });
        }
        self.pre_scale_length = Some(path_length);
        Ok(())
    }

    /// Scale by the ratio of the new path length to the one recorded in
    /// [`Thelen2003Muscle::pre_scale`]. The recorded length is kept until a
    /// rescale succeeds.
    pub fn post_scale(
        &mut self,
        store: &mut StateStore,
        path: PathKinematics,
    ) -> SimResult<EquilibriumSolution> {
        let before = self.pre_scale_length.ok_or(SimError::InvalidArg {
            what: "post_scale called without pre_scale",
        })?;
        let factor = path.length.value / before.value;
        let sol = self.rescale(store, path, factor)?;
        self.pre_scale_length = None;
        Ok(sol)
    }

    fn inputs(
        &self,
        store: &StateStore,
        path: PathKinematics,
        excitation: Real,
    ) -> SimResult<MuscleInputs> {
        let slots = self.slots()?;
        Ok(MuscleInputs {
            musculotendon_length: path.length,
            musculotendon_speed: path.speed,
            activation: store.value(slots.activation)?,
            fiber_length: m(store.value(slots.fiber_length)?),
            excitation,
        })
    }
}

impl MuscleActuator for Thelen2003Muscle {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&mut self, store: &mut StateStore) -> SimResult<()> {
        if self.slots.is_some() {
            return Err(SimError::InvalidArg {
                what: "actuator already registered",
            });
        }
        let activation = store.add_slot(format!("{}.activation", self.name), DEFAULT_ACTIVATION)?;
        let fiber_length = store.add_slot(
            format!("{}.fiber_length", self.name),
            self.params.optimal_fiber_length().value,
        )?;
        self.slots = Some(MuscleSlots {
            activation,
            fiber_length,
        });
        Ok(())
    }

    fn slots(&self) -> SimResult<MuscleSlots> {
        self.slots.ok_or(SimError::InvalidArg {
            what: "actuator is not registered with a state store",
        })
    }

    fn compute_equilibrium(
        &self,
        store: &mut StateStore,
        path: PathKinematics,
    ) -> SimResult<EquilibriumSolution> {
        let slots = self.slots()?;
        let activation = store.value(slots.activation)?;
        let current = m(store.value(slots.fiber_length)?);
        let sol = solve_equilibrium(
            &self.params,
            path.length,
            activation,
            Some(current),
            &self.equilibrium,
        )?;
        store.set_value(slots.fiber_length, sol.fiber_length.value)?;
        tracing::debug!(
            muscle = %self.name,
            fiber_length = sol.fiber_length.value,
            tendon_force = sol.tendon_force(&self.params).value,
            "equilibrium written to state"
        );
        Ok(sol)
    }

    fn compute_actuation(&self, store: &StateStore, path: PathKinematics) -> SimResult<Force> {
        Ok(self.snapshot(store, path)?.tendon_force)
    }

    fn state_derivatives(
        &self,
        store: &StateStore,
        path: PathKinematics,
        excitation: Real,
    ) -> SimResult<StateDerivatives> {
        let inputs = self.inputs(store, path, excitation)?;
        let eval = evaluate_derivatives(&self.params, &inputs, &self.velocity_solver)?;
        Ok(eval.derivatives)
    }

    fn snapshot(&self, store: &StateStore, path: PathKinematics) -> SimResult<FiberSnapshot> {
        let inputs = self.inputs(store, path, 0.0)?;
        let terms = ForceBalance::new(&self.params).evaluate(
            path.length,
            inputs.fiber_length,
            inputs.activation,
        )?;
        let fmax = self.params.max_isometric_force();
        Ok(FiberSnapshot {
            activation: terms.activation,
            fiber_length: terms.geometry.fiber_length,
            normalized_fiber_length: terms.norm_fiber_length,
            pennation_angle: terms.geometry.pennation(),
            tendon_length: terms.geometry.tendon_length,
            active_fiber_force: NormForce(terms.activation * terms.active_multiplier.value())
                .to_force(fmax),
            passive_fiber_force: terms.passive_force.to_force(fmax),
            fiber_force: terms.fiber_force().to_force(fmax),
            tendon_force: terms.tendon_force.to_force(fmax),
            stress: terms.tendon_force.value(),
        })
    }

    fn rescale(
        &mut self,
        store: &mut StateStore,
        path: PathKinematics,
        factor: Real,
    ) -> SimResult<EquilibriumSolution> {
        let before = self.params.clone();
        self.params.scale_lengths(factor)?;
        match self.compute_equilibrium(store, path) {
            Ok(sol) => {
                tracing::debug!(muscle = %self.name, factor, "rescaled");
                Ok(sol)
            }
            Err(e) => {
                tracing::warn!(muscle = %self.name, factor, error = %e, "rescale rejected");
                self.params = before;
                Err(e)
            }
        }
    }
}
