//! Transient runs of the musculotendon model.
//!
//! A fixed-length unit starting passive and switched fully on should
//! approach its isometric equilibrium: activation near 1, fiber shortened
//! against the tendon, tendon force near the active force-length value.

use mt_core::units::{m, n, rad};
use mt_sim::{
    ConstantExcitation, FixedPath, IntegratorType, MuscleActuator, MusculotendonModel,
    SimOptions, SinusoidalPath, StateStore, StepExcitation, Thelen2003Muscle, run_sim,
};

fn muscle(name: &str) -> Box<Thelen2003Muscle> {
    Box::new(Thelen2003Muscle::new(name, n(1000.0), m(0.1), m(0.2), rad(0.0)).unwrap())
}

#[test]
fn step_excitation_approaches_isometric_equilibrium() {
    let mut model = MusculotendonModel::new();
    model
        .add_unit(
            muscle("tibialis"),
            Box::new(FixedPath::new(m(0.3)).unwrap()),
            Box::new(StepExcitation {
                before: 0.0,
                after: 1.0,
                time: 0.02,
            }),
        )
        .unwrap();
    model.initialize().unwrap();

    let opts = SimOptions {
        dt: 1e-4,
        t_end: 0.3,
        record_every: 100,
        ..SimOptions::default()
    };
    let record = run_sim(&mut model, &opts).unwrap();
    let t_end = *record.t.last().unwrap();
    let x_end = record.x.last().unwrap().clone();

    let a = x_end[0];
    let lf = x_end[1];
    assert!(a > 0.99 && a <= 1.0 + 1e-9, "activation {a}");
    assert!(lf > 0.09 && lf < 0.1, "fiber length {lf}");

    let forces = model.actuations(t_end, &x_end).unwrap();
    assert!(forces[0].value > 900.0 && forces[0].value < 1000.0, "force {}", forces[0].value);

    // Started passive.
    let f0 = model.actuations(0.0, &record.x[0]).unwrap()[0].value;
    assert!(f0 < 5.0);
}

#[test]
fn independent_units_run_together() {
    let mut model = MusculotendonModel::new();
    model
        .add_unit(
            muscle("a"),
            Box::new(FixedPath::new(m(0.3)).unwrap()),
            Box::new(ConstantExcitation(0.5)),
        )
        .unwrap();
    model
        .add_unit(
            muscle("b"),
            Box::new(SinusoidalPath::new(m(0.3), m(0.005), 2.0, 0.0).unwrap()),
            Box::new(ConstantExcitation(0.3)),
        )
        .unwrap();
    model.initialize().unwrap();
    assert_eq!(model.store().len(), 4);

    let opts = SimOptions {
        dt: 1e-4,
        t_end: 0.05,
        record_every: 50,
        integrator: IntegratorType::RK4,
        ..SimOptions::default()
    };
    let record = run_sim(&mut model, &opts).unwrap();
    for x in &record.x {
        assert!(x.iter().all(|v| v.is_finite()));
    }

    // Unit "a" started in equilibrium at steady activation and its path
    // does not move, so it stays put.
    let first = &record.x[0];
    let last = record.x.last().unwrap();
    assert!((last[0] - first[0]).abs() < 1e-9);
    assert!((last[1] - first[1]).abs() < 1e-5);
    let snaps = model.snapshots(*record.t.last().unwrap(), last).unwrap();
    assert_eq!(snaps.len(), 2);
}

#[test]
fn derivatives_visible_through_store() {
    let mut muscle = Thelen2003Muscle::new("m", n(500.0), m(0.08), m(0.25), rad(0.2)).unwrap();
    let mut store = StateStore::new();
    muscle.register(&mut store).unwrap();
    let path = mt_sim::PathKinematics::stationary(m(0.33));
    muscle.compute_equilibrium(&mut store, path).unwrap();
    muscle
        .compute_state_variable_derivatives(&mut store, path, 0.05)
        .unwrap();
    // Activation is at its default of 0.05 and excitation matches it.
    assert_eq!(store.derivatives()[0], 0.0);
    assert!(store.derivatives()[1].abs() < 1e-3);
}
