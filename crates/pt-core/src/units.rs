// pt-core/src/units.rs

use uom::si::f64::{
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn kelvin_interval(v: f64) -> TempInterval {
    use uom::si::temperature_interval::kelvin;
    TempInterval::new::<kelvin>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn minutes(v: f64) -> Time {
    use uom::si::time::minute;
    Time::new::<minute>(v)
}

#[inline]
pub fn as_kelvin_interval(v: TempInterval) -> f64 {
    use uom::si::temperature_interval::kelvin;
    v.get::<kelvin>()
}

#[inline]
pub fn as_celsius(v: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    v.get::<degree_celsius>()
}

#[inline]
pub fn as_seconds(v: Time) -> f64 {
    use uom::si::time::second;
    v.get::<second>()
}

#[inline]
pub fn as_minutes(v: Time) -> f64 {
    use uom::si::time::minute;
    v.get::<minute>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_convert_to_seconds() {
        assert!((as_seconds(minutes(30.0)) - 1800.0).abs() < 1e-9);
        assert!((as_minutes(s(90.0)) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn constructors_smoke() {
        let _band = kelvin_interval(4.0);
        let _dt = s(60.0);
        assert!((as_celsius(celsius(21.0)) - 21.0).abs() < 1e-9);
        assert!((as_kelvin_interval(kelvin_interval(4.0)) - 4.0).abs() < 1e-12);
    }
}
