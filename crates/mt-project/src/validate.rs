//! Project validation logic.

use crate::compile::muscle_params;
use crate::schema::{ExcitationDef, MuscleDef, PathDef, Project, SimulationDef};
use mt_muscle::MuscleError;
use std::collections::HashSet;

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut ids = HashSet::new();
    for muscle in &project.muscles {
        if muscle.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "muscles.id".to_string(),
                value: format!("{:?}", muscle.id),
                reason: "must not be empty".to_string(),
            });
        }
        if !ids.insert(&muscle.id) {
            return Err(ValidationError::DuplicateId {
                id: muscle.id.clone(),
                context: "muscles".to_string(),
            });
        }
        validate_muscle(muscle)?;
    }

    validate_simulation(&project.simulation)
}

fn validate_muscle(muscle: &MuscleDef) -> Result<(), ValidationError> {
    let ctx = |field: &str| format!("muscles[{}].{field}", muscle.id);

    muscle_params(&muscle.params).map_err(|e| match e {
        MuscleError::InvalidParameter {
            name,
            value,
            reason,
        } => invalid(ctx(&format!("params.{name}")), value, reason),
        other => ValidationError::InvalidValue {
            field: ctx("params"),
            value: String::new(),
            reason: other.to_string(),
        },
    })?;

    match muscle.path {
        PathDef::Fixed { length_m } => {
            if !(length_m.is_finite() && length_m > 0.0) {
                return Err(invalid(ctx("path.length_m"), length_m, "must be positive"));
            }
        }
        PathDef::Sinusoid {
            mean_m,
            amplitude_m,
            frequency_hz,
            ..
        } => {
            if !(amplitude_m >= 0.0 && mean_m - amplitude_m > 0.0) {
                return Err(invalid(
                    ctx("path.amplitude_m"),
                    amplitude_m,
                    "path length must stay positive",
                ));
            }
            if !(frequency_hz.is_finite() && frequency_hz >= 0.0) {
                return Err(invalid(
                    ctx("path.frequency_hz"),
                    frequency_hz,
                    "must be non-negative",
                ));
            }
        }
    }

    match muscle.excitation {
        ExcitationDef::Constant { value } => check_finite(ctx("excitation.value"), value),
        ExcitationDef::Step {
            before,
            after,
            time_s,
        } => {
            check_finite(ctx("excitation.before"), before)?;
            check_finite(ctx("excitation.after"), after)?;
            check_finite(ctx("excitation.time_s"), time_s)
        }
        ExcitationDef::Ramp {
            start_value,
            end_value,
            start_time_s,
            end_time_s,
        } => {
            check_finite(ctx("excitation.start_value"), start_value)?;
            check_finite(ctx("excitation.end_value"), end_value)?;
            if !(end_time_s > start_time_s) {
                return Err(invalid(
                    ctx("excitation.end_time_s"),
                    end_time_s,
                    "must be after start_time_s",
                ));
            }
            Ok(())
        }
    }
}

fn check_finite(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    if !(sim.dt_s > 0.0) {
        return Err(invalid("simulation.dt_s", sim.dt_s, "must be positive"));
    }
    if !(sim.t_end_s >= 0.0) {
        return Err(invalid(
            "simulation.t_end_s",
            sim.t_end_s,
            "must be non-negative",
        ));
    }
    if sim.record_every == 0 {
        return Err(invalid(
            "simulation.record_every",
            0.0,
            "must be at least 1",
        ));
    }
    let eq = &sim.equilibrium;
    if !(eq.force_tolerance > 0.0 && eq.force_tolerance < 1.0) {
        return Err(invalid(
            "simulation.equilibrium.force_tolerance",
            eq.force_tolerance,
            "must be in (0, 1)",
        ));
    }
    if eq.max_iterations == 0 {
        return Err(invalid(
            "simulation.equilibrium.max_iterations",
            0.0,
            "must be at least 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MuscleParamsDef, PathDef};

    fn project() -> Project {
        Project {
            version: 1,
            name: "test".to_string(),
            muscles: vec![MuscleDef {
                id: "soleus".to_string(),
                params: MuscleParamsDef::new(1000.0, 0.1, 0.2, 0.0),
                path: PathDef::Fixed { length_m: 0.3 },
                excitation: ExcitationDef::Constant { value: 0.5 },
            }],
            simulation: SimulationDef::default(),
        }
    }

    #[test]
    fn valid_project_passes() {
        validate_project(&project()).unwrap();
    }

    #[test]
    fn duplicate_muscle_ids_rejected() {
        let mut p = project();
        p.muscles.push(p.muscles[0].clone());
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn bad_parameter_names_the_field() {
        let mut p = project();
        p.muscles[0].params.max_isometric_force_n = -5.0;
        match validate_project(&p) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "muscles[soleus].params.max_isometric_force");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn future_version_rejected() {
        let mut p = project();
        p.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn sinusoid_must_stay_positive() {
        let mut p = project();
        p.muscles[0].path = PathDef::Sinusoid {
            mean_m: 0.3,
            amplitude_m: 0.4,
            frequency_hz: 1.0,
            phase_rad: 0.0,
        };
        assert!(validate_project(&p).is_err());
    }

    #[test]
    fn zero_time_step_rejected() {
        let mut p = project();
        p.simulation.dt_s = 0.0;
        assert!(validate_project(&p).is_err());
    }
}
