//! Turning a validated project into runnable objects.

use crate::schema::{
    EquilibriumDef, ExcitationDef, InitialGuessDef, IntegratorDef, MuscleDef, MuscleParamsDef,
    PathDef, Project, SimulationDef,
};
use crate::ProjectResult;
use mt_core::units::{m, n, rad, s};
use mt_muscle::{MuscleParams, MuscleResult};
use mt_sim::{
    ConstantExcitation, Excitation, FixedPath, IntegratorType, MusclePath, MusculotendonModel,
    RampExcitation, SimOptions, SinusoidalPath, StepExcitation, Thelen2003Muscle,
};
use mt_solver::{EquilibriumConfig, InitialGuess, NewtonConfig};

/// Apply every field through the validated setters.
pub fn muscle_params(def: &MuscleParamsDef) -> MuscleResult<MuscleParams> {
    let mut p = MuscleParams::new(
        n(def.max_isometric_force_n),
        m(def.optimal_fiber_length_m),
        m(def.tendon_slack_length_m),
        rad(def.pennation_angle_rad),
    )?;
    p.set_activation_time_constant(s(def.activation_time_constant_s))?;
    p.set_deactivation_time_constant(s(def.deactivation_time_constant_s))?;
    p.set_vmax(def.vmax)?;
    p.set_vmax0(def.vmax0)?;
    p.set_fmax_tendon_strain(def.fmax_tendon_strain)?;
    p.set_fmax_muscle_strain(def.fmax_muscle_strain)?;
    p.set_k_shape_active(def.k_shape_active)?;
    p.set_k_shape_passive(def.k_shape_passive)?;
    p.set_damping(def.damping)?;
    p.set_af(def.af)?;
    p.set_flen(def.flen)?;
    Ok(p)
}

pub fn equilibrium_config(def: &EquilibriumDef) -> EquilibriumConfig {
    EquilibriumConfig {
        newton: NewtonConfig {
            max_iterations: def.max_iterations,
            ..NewtonConfig::default()
        },
        force_tolerance: def.force_tolerance,
        initial_guess: match def.initial_guess {
            InitialGuessDef::CurrentState => InitialGuess::CurrentState,
            InitialGuessDef::TendonSlack => InitialGuess::TendonSlack,
        },
    }
}

pub fn sim_options(def: &SimulationDef) -> SimOptions {
    SimOptions {
        dt: def.dt_s,
        t_end: def.t_end_s,
        record_every: def.record_every,
        integrator: match def.integrator {
            IntegratorDef::Rk4 => IntegratorType::RK4,
            IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
        },
        min_dt: def.dt_s * 1e-4,
        ..SimOptions::default()
    }
}

pub fn build_muscle(
    def: &MuscleDef,
    equilibrium: &EquilibriumDef,
) -> ProjectResult<Thelen2003Muscle> {
    let params = muscle_params(&def.params)?;
    Ok(Thelen2003Muscle::with_params(def.id.clone(), params)?
        .with_equilibrium_config(equilibrium_config(equilibrium)))
}

pub fn build_path(def: &PathDef) -> ProjectResult<Box<dyn MusclePath>> {
    let path: Box<dyn MusclePath> = match *def {
        PathDef::Fixed { length_m } => Box::new(FixedPath::new(m(length_m))?),
        PathDef::Sinusoid {
            mean_m,
            amplitude_m,
            frequency_hz,
            phase_rad,
        } => Box::new(SinusoidalPath::new(
            m(mean_m),
            m(amplitude_m),
            frequency_hz,
            phase_rad,
        )?),
    };
    Ok(path)
}

pub fn build_excitation(def: &ExcitationDef) -> ProjectResult<Box<dyn Excitation>> {
    let excitation: Box<dyn Excitation> = match *def {
        ExcitationDef::Constant { value } => Box::new(ConstantExcitation(value)),
        ExcitationDef::Step {
            before,
            after,
            time_s,
        } => Box::new(StepExcitation {
            before,
            after,
            time: time_s,
        }),
        ExcitationDef::Ramp {
            start_value,
            end_value,
            start_time_s,
            end_time_s,
        } => Box::new(RampExcitation::new(
            start_value,
            end_value,
            start_time_s,
            end_time_s,
        )?),
    };
    Ok(excitation)
}

/// Build every muscle unit and bring it to equilibrium at t = 0.
pub fn build_model(project: &Project) -> ProjectResult<MusculotendonModel> {
    crate::validate_project(project)?;
    let mut model = MusculotendonModel::new();
    for def in &project.muscles {
        let muscle = build_muscle(def, &project.simulation.equilibrium)?;
        model.add_unit(
            Box::new(muscle),
            build_path(&def.path)?,
            build_excitation(&def.excitation)?,
        )?;
    }
    model.initialize()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_def_matches_library_defaults() {
        let def = MuscleParamsDef::new(1000.0, 0.1, 0.2, 0.0);
        assert_eq!(muscle_params(&def).unwrap(), MuscleParams::default());
    }

    #[test]
    fn equilibrium_settings_carry_over() {
        let def = EquilibriumDef {
            force_tolerance: 1e-6,
            max_iterations: 7,
            initial_guess: InitialGuessDef::TendonSlack,
        };
        let cfg = equilibrium_config(&def);
        assert_eq!(cfg.newton.max_iterations, 7);
        assert_eq!(cfg.force_tolerance, 1e-6);
        assert_eq!(cfg.initial_guess, InitialGuess::TendonSlack);
    }

    #[test]
    fn sim_options_follow_definition() {
        let def = SimulationDef {
            dt_s: 1e-3,
            t_end_s: 2.0,
            record_every: 5,
            integrator: IntegratorDef::ForwardEuler,
            equilibrium: EquilibriumDef::default(),
        };
        let opts = sim_options(&def);
        assert_eq!(opts.dt, 1e-3);
        assert_eq!(opts.t_end, 2.0);
        assert_eq!(opts.record_every, 5);
        assert_eq!(opts.integrator, IntegratorType::ForwardEuler);
        assert!(opts.min_dt > 0.0 && opts.min_dt < opts.dt);
    }
}
