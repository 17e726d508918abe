use crate::MtError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, MtError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MtError::NonFinite { what, value: v })
    }
}

/// Require `v > 0` and finite.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, MtError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(MtError::InvalidArg { what })
    }
}

/// Clamp into `[lo, hi]`, mapping NaN to `lo`.
pub fn clamp_unit(v: Real, lo: Real, hi: Real) -> Real {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(0.0, "x").is_err());
        assert!(ensure_positive(-1.0, "x").is_err());
        assert!(ensure_positive(Real::INFINITY, "x").is_err());
        assert_eq!(ensure_positive(2.5, "x").unwrap(), 2.5);
    }

    #[test]
    fn clamp_unit_handles_nan() {
        assert_eq!(clamp_unit(Real::NAN, 0.001, 1.0), 0.001);
        assert_eq!(clamp_unit(1.7, 0.0, 1.0), 1.0);
        assert_eq!(clamp_unit(-0.2, 0.0, 1.0), 0.0);
    }

    proptest::proptest! {
        #[test]
        fn clamp_unit_stays_in_range(v in proptest::num::f64::ANY, lo in 0.0_f64..0.5) {
            let c = clamp_unit(v, lo, 1.0);
            proptest::prop_assert!(c >= lo && c <= 1.0);
        }
    }
}
