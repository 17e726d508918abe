use mt_project::schema::*;
use mt_project::{load, load_json, load_yaml, save_json, save_yaml, validate_project};

fn sample() -> Project {
    Project {
        version: 1,
        name: "Roundtrip".to_string(),
        muscles: vec![
            MuscleDef {
                id: "gastrocnemius".to_string(),
                params: MuscleParamsDef::new(1500.0, 0.06, 0.39, 0.3),
                path: PathDef::Sinusoid {
                    mean_m: 0.45,
                    amplitude_m: 0.01,
                    frequency_hz: 1.5,
                    phase_rad: 0.25,
                },
                excitation: ExcitationDef::Ramp {
                    start_value: 0.0,
                    end_value: 1.0,
                    start_time_s: 0.1,
                    end_time_s: 0.4,
                },
            },
            MuscleDef {
                id: "biceps".to_string(),
                params: MuscleParamsDef {
                    damping: 0.0,
                    flen: 1.8,
                    ..MuscleParamsDef::new(600.0, 0.12, 0.2, 0.0)
                },
                path: PathDef::Fixed { length_m: 0.33 },
                excitation: ExcitationDef::Step {
                    before: 0.1,
                    after: 0.9,
                    time_s: 0.2,
                },
            },
        ],
        simulation: SimulationDef {
            integrator: IntegratorDef::ForwardEuler,
            ..SimulationDef::default()
        },
    }
}

#[test]
fn roundtrip_yaml() {
    let project = sample();
    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("mt_project_roundtrip.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json() {
    let project = sample();
    let path = std::env::temp_dir().join("mt_project_roundtrip.json");
    save_json(&path, &project).unwrap();
    assert_eq!(project, load_json(&path).unwrap());
    assert_eq!(project, load(&path).unwrap());
}

#[test]
fn optional_parameters_take_defaults() {
    let yaml = r#"
version: 1
name: minimal
muscles:
  - id: m
    params:
      max_isometric_force_n: 1000.0
      optimal_fiber_length_m: 0.1
      tendon_slack_length_m: 0.2
    path: { type: fixed, length_m: 0.3 }
    excitation: { type: constant, value: 0.2 }
"#;
    let project: Project = serde_yaml::from_str(yaml).unwrap();
    validate_project(&project).unwrap();
    assert_eq!(
        project.muscles[0].params,
        MuscleParamsDef::new(1000.0, 0.1, 0.2, 0.0)
    );
    assert_eq!(project.simulation, SimulationDef::default());
}

#[test]
fn invalid_project_is_not_saved() {
    let mut project = sample();
    project.muscles[1].params.optimal_fiber_length_m = 0.0;
    let path = std::env::temp_dir().join("mt_project_invalid.yaml");
    assert!(save_yaml(&path, &project).is_err());
}
