//! Safeguarded scalar Newton solver.
//!
//! Every iterate stays inside the admissible interval `[lo, hi]`. A Newton
//! step that would leave it is damped back in; once the residual has been
//! seen with both signs the step is additionally confined to that sign-change
//! bracket, and bisection takes over whenever Newton points outside it.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::central_difference;

/// Newton solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance on the residual
    pub abs_tol: f64,
    /// Finite difference step, relative to `max(|x|, hi - lo)`
    pub derivative_step: f64,
    /// Maximum step halvings when a Newton step leaves the interval
    pub max_damping_halvings: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol: 1e-9,
            derivative_step: 1e-7,
            max_damping_halvings: 40,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonResult {
    /// Root estimate
    pub x: f64,
    /// Residual at `x`
    pub residual: f64,
    /// Number of iterations
    pub iterations: usize,
    /// How many of those iterations fell back to bisection
    pub bisections: usize,
}

/// Two points with residuals of opposite sign.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    neg: f64,
    pos: f64,
}

impl Bracket {
    fn from_pair(xa: f64, ra: f64, xb: f64, rb: f64) -> Option<Self> {
        if ra < 0.0 && rb > 0.0 {
            Some(Self { neg: xa, pos: xb })
        } else if ra > 0.0 && rb < 0.0 {
            Some(Self { neg: xb, pos: xa })
        } else {
            None
        }
    }

    fn contains_strictly(&self, x: f64) -> bool {
        x > self.neg.min(self.pos) && x < self.neg.max(self.pos)
    }

    fn midpoint(&self) -> f64 {
        0.5 * (self.neg + self.pos)
    }

    fn update(&mut self, x: f64, r: f64) {
        if r < 0.0 {
            self.neg = x;
        } else if r > 0.0 {
            self.pos = x;
        }
    }
}

/// Shrink the step from `x` toward `target` until it lands inside `[lo, hi]`.
fn damp_into(x: f64, target: f64, lo: f64, hi: f64, max_halvings: usize) -> f64 {
    let mut step = target - x;
    for _ in 0..max_halvings {
        let candidate = x + step;
        if candidate >= lo && candidate <= hi {
            return candidate;
        }
        step *= 0.5;
    }
    (x + step).clamp(lo, hi)
}

/// Find `x` in `[lo, hi]` with `|f(x)| < abs_tol`, starting from `x0`.
///
/// `f` is only ever evaluated inside the interval. The endpoints are probed
/// once up front; if they straddle a root, convergence is guaranteed.
pub fn newton_solve<F>(
    x0: f64,
    domain: (f64, f64),
    residual_fn: F,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(f64) -> SolverResult<f64>,
{
    let (lo, hi) = domain;
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(SolverError::Numeric {
            what: format!("empty search interval [{lo}, {hi}]"),
        });
    }
    let width = hi - lo;

    let mut x = if x0.is_finite() {
        x0.clamp(lo, hi)
    } else {
        0.5 * (lo + hi)
    };
    let mut r = residual_fn(x)?;

    // Endpoint probes. A failed probe just means no bracket yet.
    let mut bracket = match (residual_fn(lo).ok(), residual_fn(hi).ok()) {
        (Some(r_lo), Some(r_hi)) => Bracket::from_pair(lo, r_lo, hi, r_hi),
        _ => None,
    };
    if let Some(b) = bracket.as_mut() {
        b.update(x, r);
    }

    let mut bisections = 0;
    for iter in 0..config.max_iterations {
        if r.abs() < config.abs_tol {
            return Ok(NewtonResult {
                x,
                residual: r,
                iterations: iter,
                bisections,
            });
        }

        let h = config.derivative_step * x.abs().max(width);
        let slope = central_difference(x, &residual_fn, h, lo, hi)?;
        let newton = (slope.is_finite() && slope != 0.0).then(|| x - r / slope);

        let x_new = match (bracket, newton) {
            (Some(b), Some(xn)) if b.contains_strictly(xn) => xn,
            (Some(b), _) => {
                bisections += 1;
                b.midpoint()
            }
            (None, Some(xn)) => damp_into(x, xn, lo, hi, config.max_damping_halvings),
            (None, None) => {
                return Err(SolverError::Numeric {
                    what: format!("zero slope at x = {x} with no sign change seen"),
                });
            }
        };

        let r_new = residual_fn(x_new)?;
        tracing::trace!(iter, x = x_new, residual = r_new, "newton iteration");

        match bracket.as_mut() {
            Some(b) => b.update(x_new, r_new),
            None => bracket = Bracket::from_pair(x, r, x_new, r_new),
        }
        x = x_new;
        r = r_new;
    }

    if r.abs() < config.abs_tol {
        return Ok(NewtonResult {
            x,
            residual: r,
            iterations: config.max_iterations,
            bisections,
        });
    }

    Err(SolverError::ConvergenceFailed {
        iterations: config.max_iterations,
        residual: r,
        estimate: x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0, x > 0
        let residual = |x: f64| -> SolverResult<f64> { Ok(x * x - 4.0) };
        let result = newton_solve(3.0, (0.0, 10.0), residual, &NewtonConfig::default()).unwrap();
        assert!((result.x - 2.0).abs() < 1e-9);
        assert!(result.iterations > 0);
    }

    #[test]
    fn already_converged_takes_no_iterations() {
        let residual = |x: f64| -> SolverResult<f64> { Ok(x - 1.0) };
        let result = newton_solve(1.0, (0.0, 2.0), residual, &NewtonConfig::default()).unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.x, 1.0);
    }

    #[test]
    fn residual_at_tolerance_is_not_converged() {
        let residual = |x: f64| -> SolverResult<f64> { Ok(x - 1.0) };
        let config = NewtonConfig {
            abs_tol: 0.5,
            ..NewtonConfig::default()
        };
        let result = newton_solve(1.5, (0.0, 2.0), residual, &config).unwrap();
        assert_eq!(result.iterations, 1);
        assert!((result.x - 1.0).abs() < 1e-12);
        assert!(result.residual.abs() < 0.5);
    }

    #[test]
    fn never_evaluates_outside_interval() {
        // Newton from near the top of atan overshoots wildly.
        let residual = |x: f64| -> SolverResult<f64> {
            assert!((-5.0..=5.0).contains(&x), "evaluated at {x}");
            Ok(x.atan())
        };
        let result = newton_solve(4.0, (-5.0, 5.0), residual, &NewtonConfig::default()).unwrap();
        assert!(result.x.abs() < 1e-8);
    }

    #[test]
    fn bisection_rescues_bad_newton_steps() {
        // Flat near the root's left, steep on the right: Newton from the
        // left jumps past the bracket.
        let residual = |x: f64| -> SolverResult<f64> { Ok(x.powi(3) - 0.001) };
        let result = newton_solve(-1.0, (-1.0, 1.0), residual, &NewtonConfig::default()).unwrap();
        assert!((result.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn no_root_reports_convergence_failure() {
        // Root at -2 lies outside the interval.
        let residual = |x: f64| -> SolverResult<f64> { Ok(x + 2.0) };
        let config = NewtonConfig {
            max_iterations: 20,
            ..NewtonConfig::default()
        };
        let err = newton_solve(0.5, (-1.0, 1.0), residual, &config).unwrap_err();
        match err {
            SolverError::ConvergenceFailed {
                iterations,
                residual,
                ..
            } => {
                assert_eq!(iterations, 20);
                assert!(residual >= 1.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_empty_interval() {
        let residual = |x: f64| -> SolverResult<f64> { Ok(x) };
        assert!(newton_solve(0.0, (1.0, 1.0), residual, &NewtonConfig::default()).is_err());
    }
}
