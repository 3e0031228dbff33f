//! Conversion between HVAC tuning parameters and normalized PI gains.
//!
//! HVAC controllers are tuned with a proportional band (the temperature span
//! over which the proportional branch sweeps the full 0-100% output) and an
//! integral time in minutes (how long the integral branch needs to repeat the
//! proportional action under a constant error). The controller itself works
//! with plain gains:
//!
//! - `kp = 100 / proportional_band`
//! - `ki = kp / (integral_time_min * 60)`
//!
//! Both gains are unsigned magnitudes. The heating/cooling sign is applied by
//! [`crate::mode::ControlMode::apply`].

use pt_core::{TempInterval, Time, as_kelvin_interval, as_minutes};
use serde::{Deserialize, Serialize};

/// Full output span in percent.
pub const OUTPUT_SPAN_PERCENT: f64 = 100.0;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Proportional and integral gain pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    /// Percent output per unit of error.
    pub kp: f64,
    /// Percent output per unit of error per second.
    pub ki: f64,
}

impl Gains {
    /// Gains from a proportional band (K) and an integral time (minutes).
    ///
    /// Both inputs must be strictly positive; validation is the caller's job.
    pub fn from_hvac(proportional_band: f64, integral_time_min: f64) -> Self {
        let (kp, ki) = to_gains(proportional_band, integral_time_min);
        Self { kp, ki }
    }

    /// Same as [`Gains::from_hvac`] with typed quantities.
    pub fn from_quantities(proportional_band: TempInterval, integral_time: Time) -> Self {
        Self::from_hvac(
            as_kelvin_interval(proportional_band),
            as_minutes(integral_time),
        )
    }

    /// Recover `(proportional_band, integral_time_min)`.
    pub fn to_hvac(self) -> (f64, f64) {
        let kp = self.kp.abs();
        let ki = self.ki.abs();
        (
            OUTPUT_SPAN_PERCENT / kp,
            kp / (ki * SECONDS_PER_MINUTE),
        )
    }
}

/// `(kp, ki)` for the given proportional band and integral time in minutes.
pub fn to_gains(proportional_band: f64, integral_time_min: f64) -> (f64, f64) {
    let kp = OUTPUT_SPAN_PERCENT / proportional_band;
    let ki = kp / (integral_time_min * SECONDS_PER_MINUTE);
    (kp, ki)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_core::{kelvin_interval, minutes};

    #[test]
    fn standard_conversion() {
        let (kp, ki) = to_gains(4.0, 120.0);
        assert!((kp - 25.0).abs() < 1e-12);
        assert!((ki - 25.0 / 7200.0).abs() < 1e-15);
    }

    #[test]
    fn narrow_band_means_high_gain() {
        let (narrow, _) = to_gains(1.0, 60.0);
        let (wide, _) = to_gains(10.0, 60.0);
        assert!((narrow - 100.0).abs() < 1e-12);
        assert!((wide - 10.0).abs() < 1e-12);
    }

    #[test]
    fn integral_repeats_proportional_after_integral_time() {
        // Constant error e: P = kp*e, integral after Ti*60 s = ki*e*Ti*60 = kp*e.
        let integral_time = 30.0;
        let (kp, ki) = to_gains(4.0, integral_time);
        let error = 2.0;
        let integral = ki * error * integral_time * 60.0;
        assert!((integral - kp * error).abs() < 1e-9);
    }

    #[test]
    fn typed_quantities_match_raw() {
        let typed = Gains::from_quantities(kelvin_interval(4.0), minutes(30.0));
        let raw = Gains::from_hvac(4.0, 30.0);
        assert!((typed.kp - raw.kp).abs() < 1e-12);
        assert!((typed.ki - raw.ki).abs() < 1e-15);
    }

    #[test]
    fn to_hvac_inverts_from_hvac() {
        let (band, ti) = Gains::from_hvac(2.5, 45.0).to_hvac();
        assert!((band - 2.5).abs() < 1e-12);
        assert!((ti - 45.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn gains_are_positive(pb in 0.01_f64..100.0, it in 0.01_f64..1000.0) {
            let (kp, ki) = to_gains(pb, it);
            prop_assert!(kp > 0.0);
            prop_assert!(ki > 0.0);
        }

        #[test]
        fn kp_decreases_with_band(
            pb in 0.01_f64..100.0,
            delta in 0.01_f64..10.0,
            it in 1.0_f64..600.0,
        ) {
            let (kp_a, _) = to_gains(pb, it);
            let (kp_b, _) = to_gains(pb + delta, it);
            prop_assert!(kp_b < kp_a);
        }

        #[test]
        fn ki_decreases_with_integral_time(
            pb in 0.1_f64..50.0,
            it in 0.1_f64..600.0,
            delta in 0.1_f64..60.0,
        ) {
            let (_, ki_a) = to_gains(pb, it);
            let (_, ki_b) = to_gains(pb, it + delta);
            prop_assert!(ki_b < ki_a);
        }
    }
}
