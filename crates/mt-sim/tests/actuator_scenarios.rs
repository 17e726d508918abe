//! Facade behavior of the Thelen 2003 actuator against a host state store.

use mt_core::units::{m, mps, n, rad};
use mt_muscle::MuscleError;
use mt_sim::{MuscleActuator, PathKinematics, SimError, StateStore, Thelen2003Muscle};
use mt_solver::SolverError;

fn setup(pennation: f64) -> (Thelen2003Muscle, StateStore) {
    let mut muscle =
        Thelen2003Muscle::new("vastus", n(1000.0), m(0.1), m(0.2), rad(pennation)).unwrap();
    let mut store = StateStore::new();
    muscle.register(&mut store).unwrap();
    (muscle, store)
}

#[test]
fn isometric_force_at_full_activation() {
    let (muscle, mut store) = setup(0.0);
    let path = PathKinematics::stationary(m(0.3));
    let force = muscle.compute_isometric_force(&mut store, path, 1.0).unwrap();

    let snap = muscle.snapshot(&store, path).unwrap();
    let l = snap.normalized_fiber_length.value();
    assert!(l > 0.9 && l < 1.0, "normalized fiber length {l}");
    // Tendon carries the active force-length value at the equilibrium length.
    let expected = muscle.params().curves().active.force(snap.normalized_fiber_length).value();
    assert!((force.value - 1000.0 * expected).abs() < 0.1 + 1e-9);
    assert_eq!(muscle.compute_actuation(&store, path).unwrap(), force);
    assert!((snap.stress - force.value / 1000.0).abs() < 1e-12);
}

#[test]
fn passive_muscle_barely_loads_tendon() {
    let (muscle, mut store) = setup(0.0);
    let path = PathKinematics::stationary(m(0.3));
    let force = muscle.compute_isometric_force(&mut store, path, 0.0).unwrap();
    assert!(force.value < 5.0);
    assert_eq!(muscle.passive_fiber_force(&store, path).unwrap().value, 0.0);
}

#[test]
fn repeated_equilibrium_is_stable() {
    let (muscle, mut store) = setup(0.2);
    let path = PathKinematics::stationary(m(0.31));
    muscle.set_activation(&mut store, 0.5).unwrap();
    let first = muscle.compute_equilibrium(&mut store, path).unwrap();
    let second = muscle.compute_equilibrium(&mut store, path).unwrap();
    assert_eq!(second.iterations, 0);
    assert!((first.fiber_length.value - second.fiber_length.value).abs() < 1e-12);
    assert_eq!(muscle.fiber_length(&store).unwrap(), second.fiber_length);
}

#[test]
fn rejected_setter_keeps_previous_value() {
    let (mut muscle, _store) = setup(0.0);
    let err = muscle
        .params_mut()
        .set_max_isometric_force(n(-5.0))
        .unwrap_err();
    assert!(matches!(err, MuscleError::InvalidParameter { .. }));
    assert_eq!(muscle.params().max_isometric_force(), n(1000.0));
}

#[test]
fn too_short_path_is_a_geometry_error() {
    let (muscle, mut store) = setup(0.0);
    let before = muscle.fiber_length(&store).unwrap();
    let err = muscle
        .compute_equilibrium(&mut store, PathKinematics::stationary(m(0.1)))
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Solver(SolverError::Muscle(MuscleError::DegenerateGeometry { .. }))
    ));
    assert_eq!(muscle.fiber_length(&store).unwrap(), before);
}

#[test]
fn rescale_preserves_normalized_equilibrium() {
    let (mut muscle, mut store) = setup(0.1);
    muscle.set_activation(&mut store, 0.8).unwrap();
    let path = PathKinematics::stationary(m(0.3));
    muscle.compute_equilibrium(&mut store, path).unwrap();
    let before = muscle.snapshot(&store, path).unwrap();

    muscle.pre_scale(m(0.3)).unwrap();
    let scaled_path = PathKinematics::stationary(m(0.33));
    muscle.post_scale(&mut store, scaled_path).unwrap();

    assert!((muscle.params().optimal_fiber_length().value - 0.11).abs() < 1e-12);
    assert!((muscle.params().tendon_slack_length().value - 0.22).abs() < 1e-12);
    let after = muscle.snapshot(&store, scaled_path).unwrap();
    assert!((after.tendon_force.value - before.tendon_force.value).abs() < 0.5);
    assert!(
        (after.normalized_fiber_length.value() - before.normalized_fiber_length.value()).abs()
            < 2e-5
    );
}

#[test]
fn failed_rescale_restores_parameters() {
    let (mut muscle, mut store) = setup(0.0);
    // Scaled tendon slack (0.4 m) exceeds the path (0.3 m).
    let err = muscle
        .rescale(&mut store, PathKinematics::stationary(m(0.3)), 2.0)
        .unwrap_err();
    assert!(err.is_retryable() || matches!(err, SimError::Solver(_)));
    assert_eq!(muscle.params().tendon_slack_length(), m(0.2));
}

#[test]
fn rigid_tendon_force_velocity_ordering() {
    let (muscle, _) = setup(0.0);
    let at = |speed: f64| {
        muscle
            .compute_isokinetic_force_assuming_infinitely_stiff_tendon(
                PathKinematics::new(m(0.3), mps(speed)),
                1.0,
            )
            .unwrap()
            .value
    };
    assert!(at(-0.5) < at(-0.1));
    assert!(at(-0.1) < at(0.0));
    assert!(at(0.0) < at(0.1));
}
