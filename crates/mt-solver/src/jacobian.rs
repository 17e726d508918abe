//! Finite difference slopes for scalar residuals.

use crate::error::SolverResult;

/// Forward difference `(f(x+h) - f(x)) / h`, reusing a known `f(x)`.
pub fn forward_difference<F>(x: f64, f_x: f64, f: F, h: f64) -> SolverResult<f64>
where
    F: Fn(f64) -> SolverResult<f64>,
{
    Ok((f(x + h)? - f_x) / h)
}

/// Central difference restricted to `[lo, hi]`.
///
/// Falls back to a one-sided difference when `x ± h` would leave the
/// interval, so `f` is never evaluated outside it.
pub fn central_difference<F>(x: f64, f: F, h: f64, lo: f64, hi: f64) -> SolverResult<f64>
where
    F: Fn(f64) -> SolverResult<f64>,
{
    let up = x + h <= hi;
    let down = x - h >= lo;
    match (down, up) {
        (true, true) => Ok((f(x + h)? - f(x - h)?) / (2.0 * h)),
        (false, true) => forward_difference(x, f(x)?, &f, h),
        (true, false) => Ok((f(x)? - f(x - h)?) / h),
        (false, false) => {
            let span = hi - lo;
            Ok((f(hi)? - f(lo)?) / span)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_linear() {
        let f = |x: f64| -> SolverResult<f64> { Ok(2.0 * x) };
        let d = central_difference(3.0, f, 1e-7, 0.0, 10.0).unwrap();
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn slope_quadratic() {
        let f = |x: f64| -> SolverResult<f64> { Ok(x * x) };
        let d = central_difference(3.0, f, 1e-6, 0.0, 10.0).unwrap();
        assert!((d - 6.0).abs() < 1e-5);
    }

    #[test]
    fn one_sided_at_interval_edges() {
        let f = |x: f64| -> SolverResult<f64> {
            assert!((0.0..=1.0).contains(&x), "evaluated outside interval: {x}");
            Ok(x * x)
        };
        let lo = central_difference(0.0, f, 1e-6, 0.0, 1.0).unwrap();
        assert!(lo.abs() < 1e-5);
        let hi = central_difference(1.0, f, 1e-6, 0.0, 1.0).unwrap();
        assert!((hi - 2.0).abs() < 1e-5);
    }
}
