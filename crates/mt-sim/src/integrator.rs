//! Fixed-step time integrators.

use crate::error::SimResult;
use crate::model::TransientModel;

pub trait Integrator {
    /// Advance `x` from `t` to `t + dt`.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;
}

/// Classical 4th-order Runge-Kutta.
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let half = 0.5 * dt;
        let k1 = model.rhs(t, x)?;
        let k2 = model.rhs(t + half, &model.add(x, &model.scale(&k1, half)))?;
        let k3 = model.rhs(t + half, &model.add(x, &model.scale(&k2, half)))?;
        let k4 = model.rhs(t + dt, &model.add(x, &model.scale(&k3, dt)))?;

        // x + dt/6 (k1 + 2 k2 + 2 k3 + k4)
        let mid = model.scale(&model.add(&k2, &k3), 2.0);
        let sum = model.add(&model.add(&k1, &mid), &k4);
        Ok(model.add(x, &model.scale(&sum, dt / 6.0)))
    }
}

/// Explicit Euler. One rhs call per step.
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x' = -x
    struct Decay;

    impl TransientModel for Decay {
        type State = f64;
        fn initial_state(&self) -> f64 {
            1.0
        }
        fn rhs(&mut self, _t: f64, x: &f64) -> SimResult<f64> {
            Ok(-x)
        }
        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }
        fn scale(&self, a: &f64, s: f64) -> f64 {
            a * s
        }
    }

    fn integrate<I: Integrator>(integrator: &I, dt: f64) -> f64 {
        let mut model = Decay;
        let mut x = model.initial_state();
        let steps = (1.0 / dt).round() as usize;
        for i in 0..steps {
            x = integrator.step(&mut model, i as f64 * dt, &x, dt).unwrap();
        }
        x
    }

    #[test]
    fn rk4_is_fourth_order() {
        let exact = (-1.0_f64).exp();
        let e1 = (integrate(&RK4, 0.1) - exact).abs();
        let e2 = (integrate(&RK4, 0.05) - exact).abs();
        assert!(e1 < 1e-5);
        assert!(e1 / e2 > 12.0);
    }

    #[test]
    fn euler_is_first_order() {
        let exact = (-1.0_f64).exp();
        let e1 = (integrate(&ForwardEuler, 0.01) - exact).abs();
        let e2 = (integrate(&ForwardEuler, 0.005) - exact).abs();
        assert!(e1 / e2 > 1.8 && e1 / e2 < 2.2);
    }
}
