//! The bundled demo files load, validate, build and run.

use mt_project::{build_model, load_yaml, sim_options};
use mt_sim::run_sim;
use std::path::PathBuf;

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

#[test]
fn demos_load_and_validate() {
    let mut count = 0;
    for entry in std::fs::read_dir(demos_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
            load_yaml(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
            count += 1;
        }
    }
    assert!(count > 0);
}

#[test]
fn isometric_step_demo_runs() {
    let mut project = load_yaml(&demos_dir().join("isometric_step.yaml")).unwrap();
    project.simulation.t_end_s = 0.02;
    let mut model = build_model(&project).unwrap();
    assert_eq!(model.units().len(), 2);
    assert_eq!(model.store().len(), 4);

    let record = run_sim(&mut model, &sim_options(&project.simulation)).unwrap();
    let last = record.x.last().unwrap().clone();
    let forces = model.actuations(*record.t.last().unwrap(), &last).unwrap();
    assert!(forces.iter().all(|f| f.value.is_finite() && f.value >= 0.0));
}
