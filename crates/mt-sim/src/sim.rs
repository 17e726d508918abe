//! Simulation runner and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1 rhs call per step).
    ForwardEuler,
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Nominal time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of accepted steps
    pub max_steps: usize,
    /// Record every N-th accepted step
    pub record_every: usize,
    pub integrator: IntegratorType,
    /// Smallest step a cutback may produce (seconds)
    pub min_dt: f64,
    /// Cutbacks allowed for a single step
    pub max_retries: usize,
    /// Step multiplier on a retryable failure, in (0, 1)
    pub cutback_factor: f64,
    /// Step multiplier after a clean step, >= 1, capped at `dt`
    pub grow_factor: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 10,
            integrator: IntegratorType::default(),
            min_dt: 1e-7,
            max_retries: 8,
            cutback_factor: 0.5,
            grow_factor: 2.0,
        }
    }
}

impl SimOptions {
    fn validate(&self) -> SimResult<()> {
        let invalid = |what| Err(SimError::InvalidArg { what });
        if !(self.dt > 0.0) {
            return invalid("dt must be positive");
        }
        if !(self.t_end >= 0.0) {
            return invalid("t_end must be non-negative");
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be positive");
        }
        if self.record_every == 0 {
            return invalid("record_every must be positive");
        }
        if !(self.min_dt > 0.0 && self.min_dt <= self.dt) {
            return invalid("min_dt must be in (0, dt]");
        }
        if !(self.cutback_factor > 0.0 && self.cutback_factor < 1.0) {
            return invalid("cutback_factor must be in (0, 1)");
        }
        if !(self.grow_factor >= 1.0) {
            return invalid("grow_factor must be >= 1");
        }
        Ok(())
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

fn integrate<M: TransientModel>(
    integrator: IntegratorType,
    model: &mut M,
    t: f64,
    x: &M::State,
    dt: f64,
) -> SimResult<M::State> {
    match integrator {
        IntegratorType::RK4 => RK4.step(model, t, x, dt),
        IntegratorType::ForwardEuler => ForwardEuler.step(model, t, x, dt),
    }
}

/// Run a transient simulation from `model.initial_state()` to `t_end`.
///
/// A step that fails with a retryable error is repeated with the step size
/// multiplied by `cutback_factor`, down to `min_dt`. After a step that
/// needed no cutback the step grows back toward `dt`.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;

    let end_slack = 1e-12 * opts.t_end.max(1.0);
    let mut t = 0.0;
    let mut x = model.initial_state();
    let mut dt = opts.dt;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    let mut step = 0;
    while opts.t_end - t > end_slack && step < opts.max_steps {
        let mut h = dt.min(opts.t_end - t);
        let mut retries = 0;
        let x_new = loop {
            match integrate(opts.integrator, model, t, &x, h) {
                Ok(x_new) => break x_new,
                Err(e)
                    if e.is_retryable()
                        && retries < opts.max_retries
                        && h * opts.cutback_factor >= opts.min_dt =>
                {
                    retries += 1;
                    h *= opts.cutback_factor;
                    tracing::warn!(t, dt = h, retries, error = %e, "step cut back");
                }
                Err(e) => return Err(e),
            }
        };

        x = x_new;
        t += h;
        step += 1;
        dt = if retries == 0 {
            (h * opts.grow_factor).min(opts.dt)
        } else {
            h
        };

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }
    tracing::debug!(steps = step, t, "simulation finished");

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl TransientModel for Constant {
        type State = f64;
        fn initial_state(&self) -> f64 {
            0.0
        }
        fn rhs(&mut self, _t: f64, _x: &f64) -> SimResult<f64> {
            Ok(1.0)
        }
        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }
        fn scale(&self, a: &f64, s: f64) -> f64 {
            a * s
        }
    }

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt, 1e-3);
        assert_eq!(opts.t_end, 1.0);
        assert_eq!(opts.record_every, 10);
        assert_eq!(opts.integrator, IntegratorType::RK4);
        opts.validate().unwrap();
    }

    #[test]
    fn sim_options_invalid() {
        let mut model = Constant;
        for opts in [
            SimOptions {
                dt: 0.0,
                ..SimOptions::default()
            },
            SimOptions {
                cutback_factor: 1.0,
                ..SimOptions::default()
            },
            SimOptions {
                record_every: 0,
                ..SimOptions::default()
            },
        ] {
            assert!(matches!(
                run_sim(&mut model, &opts),
                Err(SimError::InvalidArg { .. })
            ));
        }
    }

    #[test]
    fn last_step_lands_on_t_end() {
        let mut model = Constant;
        let opts = SimOptions {
            dt: 0.3,
            t_end: 1.0,
            record_every: 1,
            min_dt: 0.01,
            ..SimOptions::default()
        };
        let record = run_sim(&mut model, &opts).unwrap();
        let t_last = *record.t.last().unwrap();
        assert!((t_last - 1.0).abs() < 1e-12);
        assert!((record.x.last().unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(record.t.len(), 5);
    }
}
