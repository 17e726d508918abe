// mt-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, Force as UomForce, Length as UomLength, Pressure as UomPressure,
    Ratio as UomRatio, Time as UomTime, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn n(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _l = m(0.1);
        let _f = n(1000.0);
        let _dt = s(0.01);
        let _v = mps(-0.5);
        let _a = rad(0.2);
        let _r = unitless(0.5);
    }

    #[test]
    fn values_are_si() {
        assert_eq!(m(0.25).value, 0.25);
        assert_eq!(n(12.0).value, 12.0);
        assert_eq!(rad(0.3).value, 0.3);
        assert_eq!(mps(-1.5).value, -1.5);
    }
}
