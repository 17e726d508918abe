//! Project schema definitions.
//!
//! Physical quantities carry their SI unit in the field name. Every
//! physiological constant except the four architectural ones is optional
//! and defaults to the Thelen (2003) value.

use mt_muscle::MuscleParams;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub muscles: Vec<MuscleDef>,
    #[serde(default)]
    pub simulation: SimulationDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MuscleDef {
    pub id: String,
    pub params: MuscleParamsDef,
    pub path: PathDef,
    pub excitation: ExcitationDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MuscleParamsDef {
    pub max_isometric_force_n: f64,
    pub optimal_fiber_length_m: f64,
    pub tendon_slack_length_m: f64,
    #[serde(default)]
    pub pennation_angle_rad: f64,
    #[serde(default = "defaults::activation_time_constant_s")]
    pub activation_time_constant_s: f64,
    #[serde(default = "defaults::deactivation_time_constant_s")]
    pub deactivation_time_constant_s: f64,
    #[serde(default = "defaults::vmax")]
    pub vmax: f64,
    #[serde(default = "defaults::vmax0")]
    pub vmax0: f64,
    #[serde(default = "defaults::fmax_tendon_strain")]
    pub fmax_tendon_strain: f64,
    #[serde(default = "defaults::fmax_muscle_strain")]
    pub fmax_muscle_strain: f64,
    #[serde(default = "defaults::k_shape_active")]
    pub k_shape_active: f64,
    #[serde(default = "defaults::k_shape_passive")]
    pub k_shape_passive: f64,
    #[serde(default = "defaults::damping")]
    pub damping: f64,
    #[serde(default = "defaults::af")]
    pub af: f64,
    #[serde(default = "defaults::flen")]
    pub flen: f64,
}

impl MuscleParamsDef {
    /// Architecture as given, every other constant at its default.
    pub fn new(
        max_isometric_force_n: f64,
        optimal_fiber_length_m: f64,
        tendon_slack_length_m: f64,
        pennation_angle_rad: f64,
    ) -> Self {
        Self {
            max_isometric_force_n,
            optimal_fiber_length_m,
            tendon_slack_length_m,
            pennation_angle_rad,
            activation_time_constant_s: defaults::activation_time_constant_s(),
            deactivation_time_constant_s: defaults::deactivation_time_constant_s(),
            vmax: defaults::vmax(),
            vmax0: defaults::vmax0(),
            fmax_tendon_strain: defaults::fmax_tendon_strain(),
            fmax_muscle_strain: defaults::fmax_muscle_strain(),
            k_shape_active: defaults::k_shape_active(),
            k_shape_passive: defaults::k_shape_passive(),
            damping: defaults::damping(),
            af: defaults::af(),
            flen: defaults::flen(),
        }
    }
}

mod defaults {
    use super::MuscleParams;

    pub fn activation_time_constant_s() -> f64 {
        MuscleParams::default().activation_time_constant().value
    }
    pub fn deactivation_time_constant_s() -> f64 {
        MuscleParams::default().deactivation_time_constant().value
    }
    pub fn vmax() -> f64 {
        MuscleParams::default().vmax()
    }
    pub fn vmax0() -> f64 {
        MuscleParams::default().vmax0()
    }
    pub fn fmax_tendon_strain() -> f64 {
        MuscleParams::default().fmax_tendon_strain()
    }
    pub fn fmax_muscle_strain() -> f64 {
        MuscleParams::default().fmax_muscle_strain()
    }
    pub fn k_shape_active() -> f64 {
        MuscleParams::default().k_shape_active()
    }
    pub fn k_shape_passive() -> f64 {
        MuscleParams::default().k_shape_passive()
    }
    pub fn damping() -> f64 {
        MuscleParams::default().damping()
    }
    pub fn af() -> f64 {
        MuscleParams::default().af()
    }
    pub fn flen() -> f64 {
        MuscleParams::default().flen()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathDef {
    Fixed {
        length_m: f64,
    },
    Sinusoid {
        mean_m: f64,
        amplitude_m: f64,
        frequency_hz: f64,
        #[serde(default)]
        phase_rad: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExcitationDef {
    Constant {
        value: f64,
    },
    Step {
        before: f64,
        after: f64,
        time_s: f64,
    },
    Ramp {
        start_value: f64,
        end_value: f64,
        start_time_s: f64,
        end_time_s: f64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InitialGuessDef {
    #[default]
    CurrentState,
    TendonSlack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquilibriumDef {
    /// Fraction of max isometric force.
    pub force_tolerance: f64,
    pub max_iterations: usize,
    #[serde(default)]
    pub initial_guess: InitialGuessDef,
}

impl Default for EquilibriumDef {
    fn default() -> Self {
        Self {
            force_tolerance: 1e-4,
            max_iterations: 100,
            initial_guess: InitialGuessDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    pub dt_s: f64,
    pub t_end_s: f64,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default)]
    pub integrator: IntegratorDef,
    #[serde(default)]
    pub equilibrium: EquilibriumDef,
}

fn default_record_every() -> usize {
    10
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            dt_s: 1e-4,
            t_end_s: 0.5,
            record_every: default_record_every(),
            integrator: IntegratorDef::default(),
            equilibrium: EquilibriumDef::default(),
        }
    }
}
