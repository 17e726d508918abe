//! A set of actuators driven by path and excitation sources.
//!
//! Every unit owns its own parameters and reads and writes only its own
//! state slots, so derivative evaluation runs across units in parallel.

use crate::actuator::{FiberSnapshot, MuscleActuator, MuscleSlots};
use crate::error::SimResult;
use crate::excitation::Excitation;
use crate::model::TransientModel;
use crate::path::MusclePath;
use crate::state::StateStore;
use mt_core::units::Force;
use mt_muscle::ActivationDynamics;
use mt_solver::StateDerivatives;
use nalgebra::DVector;
use rayon::prelude::*;

pub struct MuscleUnit {
    pub actuator: Box<dyn MuscleActuator>,
    pub path: Box<dyn MusclePath>,
    pub excitation: Box<dyn Excitation>,
}

pub struct MusculotendonModel {
    units: Vec<MuscleUnit>,
    store: StateStore,
}

impl Default for MusculotendonModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MusculotendonModel {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            store: StateStore::new(),
        }
    }

    /// Register the actuator's state and add it to the model. Returns the
    /// unit index.
    pub fn add_unit(
        &mut self,
        mut actuator: Box<dyn MuscleActuator>,
        path: Box<dyn MusclePath>,
        excitation: Box<dyn Excitation>,
    ) -> SimResult<usize> {
        actuator.register(&mut self.store)?;
        self.units.push(MuscleUnit {
            actuator,
            path,
            excitation,
        });
        Ok(self.units.len() - 1)
    }

    /// Start every unit at steady activation (`a = u(0)`) and in fiber/tendon
    /// equilibrium at its t = 0 path length.
    pub fn initialize(&mut self) -> SimResult<()> {
        for unit in &self.units {
            let slots = unit.actuator.slots()?;
            let a = ActivationDynamics::clamp(unit.excitation.excitation(0.0));
            self.store.set_value(slots.activation, a)?;
            unit.actuator
                .compute_equilibrium(&mut self.store, unit.path.kinematics(0.0))?;
        }
        tracing::info!(units = self.units.len(), "musculotendon model initialized");
        Ok(())
    }

    pub fn units(&self) -> &[MuscleUnit] {
        &self.units
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    /// Tendon force of every unit at `(t, x)`.
    pub fn actuations(&mut self, t: f64, x: &DVector<f64>) -> SimResult<Vec<Force>> {
        self.store.set_values(x)?;
        let store = &self.store;
        self.units
            .par_iter()
            .map(|unit| unit.actuator.compute_actuation(store, unit.path.kinematics(t)))
            .collect()
    }

    /// Derived quantities of every unit at `(t, x)`.
    pub fn snapshots(&mut self, t: f64, x: &DVector<f64>) -> SimResult<Vec<FiberSnapshot>> {
        self.store.set_values(x)?;
        let store = &self.store;
        self.units
            .par_iter()
            .map(|unit| unit.actuator.snapshot(store, unit.path.kinematics(t)))
            .collect()
    }
}

impl TransientModel for MusculotendonModel {
    type State = DVector<f64>;

    fn initial_state(&self) -> Self::State {
        self.store.values().clone()
    }

    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State> {
        self.store.set_values(x)?;
        let store = &self.store;
        let per_unit: Vec<(MuscleSlots, StateDerivatives)> = self
            .units
            .par_iter()
            .map(|unit| -> SimResult<_> {
                let path = unit.path.kinematics(t);
                let u = unit.excitation.excitation(t);
                let d = unit.actuator.state_derivatives(store, path, u)?;
                Ok((unit.actuator.slots()?, d))
            })
            .collect::<SimResult<_>>()?;

        let mut xdot = DVector::zeros(x.len());
        for (slots, d) in per_unit {
            xdot[slots.activation.as_usize()] = d.activation;
            xdot[slots.fiber_length.as_usize()] = d.fiber_length.value;
        }
        self.store.set_derivatives(&xdot)?;
        Ok(xdot)
    }

    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State {
        a + b
    }

    fn scale(&self, a: &Self::State, scale: f64) -> Self::State {
        a * scale
    }
}
