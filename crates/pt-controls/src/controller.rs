//! PI controller for HVAC temperature loops.
//!
//! Tuning is given in HVAC units (proportional band, integral time) and
//! converted through [`crate::gain`]. The controller includes:
//! - Anti-windup: the integral accumulator is clamped to the output limits
//! - Output clamping
//! - Sample-time gating with zero-order hold
//! - Heating/cooling via gain sign, never via the error sign
//! - Integral save/restore for persistence across restarts
//!
//! There is no derivative branch.

use crate::error::{
    ControlError, ControlsResult, INTEGRAL_TIME, OUTPUT_LIMITS, PROPORTIONAL_BAND, SAMPLE_TIME,
};
use crate::gain::Gains;
use crate::mode::ControlMode;
use crate::sampled::SampleGate;
use pt_core::{clamp, ensure_finite, ensure_positive, ensure_range};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Resolved parameter set a controller is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerParameters {
    /// Temperature span (K) mapped to the full proportional output.
    pub proportional_band: f64,
    /// Integral (reset) time in minutes.
    pub integral_time: f64,
    pub output_min: f64,
    pub output_max: f64,
    /// Minimum interval between effective updates, seconds.
    pub sample_time: f64,
    pub setpoint: f64,
    pub is_cooling: bool,
}

impl Default for ControllerParameters {
    fn default() -> Self {
        Self {
            proportional_band: 4.0,
            integral_time: 120.0,
            output_min: 0.0,
            output_max: 100.0,
            sample_time: 60.0,
            setpoint: 20.0,
            is_cooling: false,
        }
    }
}

impl ControllerParameters {
    /// Check every construction precondition.
    pub fn validate(&self) -> ControlsResult<()> {
        validate_tunings(self.proportional_band, self.integral_time)?;
        validate_limits(self.output_min, self.output_max)?;
        validate_sample_time(self.sample_time)?;
        ensure_finite(self.setpoint, "setpoint").map_err(ControlError::from_core)?;
        Ok(())
    }
}

fn validate_tunings(proportional_band: f64, integral_time: f64) -> ControlsResult<()> {
    ensure_positive(proportional_band, PROPORTIONAL_BAND).map_err(ControlError::from_core)?;
    ensure_positive(integral_time, INTEGRAL_TIME).map_err(ControlError::from_core)?;
    Ok(())
}

fn validate_limits(output_min: f64, output_max: f64) -> ControlsResult<()> {
    ensure_range(output_min, output_max, OUTPUT_LIMITS).map_err(|err| match err {
        pt_core::PtError::NonFinite { .. } => ControlError::InvalidOutputLimits {
            min: output_min,
            max: output_max,
        },
        other => ControlError::from_core(other),
    })?;
    Ok(())
}

fn validate_sample_time(sample_time: f64) -> ControlsResult<()> {
    ensure_positive(sample_time, SAMPLE_TIME).map_err(ControlError::from_core)?;
    Ok(())
}

/// Outcome of one [`PIController::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlResult {
    /// Command in `[output_min, output_max]`.
    pub output: f64,
    /// `setpoint - current_value`, never sign-flipped.
    pub error: f64,
    pub proportional_term: f64,
    /// Integral accumulator after this call, in output units.
    pub integral_term: f64,
    /// True when the sample time had not elapsed and `output` was reused.
    pub held: bool,
}

/// PI controller with HVAC parameterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIController {
    proportional_band: f64,
    integral_time: f64,
    /// Unsigned gain magnitudes; the sign comes from `mode`.
    gains: Gains,
    mode: ControlMode,
    output_min: f64,
    output_max: f64,
    setpoint: f64,
    integral: f64,
    last_output: f64,
    gate: SampleGate,
}

impl PIController {
    /// Create a new PI controller.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition: non-positive proportional
    /// band, integral time or sample time, or `output_min >= output_max`.
    pub fn new(params: ControllerParameters) -> ControlsResult<Self> {
        params.validate()?;

        Ok(Self {
            proportional_band: params.proportional_band,
            integral_time: params.integral_time,
            gains: Gains::from_hvac(params.proportional_band, params.integral_time),
            mode: ControlMode::from_cooling(params.is_cooling),
            output_min: params.output_min,
            output_max: params.output_max,
            setpoint: params.setpoint,
            integral: 0.0,
            last_output: initial_output(params.output_min, params.output_max),
            gate: SampleGate::new(params.sample_time),
        })
    }

    /// Run one control iteration.
    ///
    /// `elapsed_s` is the time since the previous effective update. When it
    /// is shorter than the sample time, no new computation happens and the
    /// previous output is returned with `held = true`.
    pub fn update(&mut self, current_value: f64, elapsed_s: f64) -> ControlResult {
        if !self.gate.should_sample(elapsed_s) {
            return self.held(current_value);
        }
        let dt = SampleGate::step_for(elapsed_s);
        let now = self.gate.advanced_by(dt);
        self.compute(current_value, dt, now)
    }

    /// Run one control iteration at host timestamp `now_s` (seconds, monotonic).
    ///
    /// The first call only establishes the timeline and integrates nothing.
    /// A non-finite timestamp is a hold and never enters the timeline.
    pub fn update_at(&mut self, current_value: f64, now_s: f64) -> ControlResult {
        if !now_s.is_finite() {
            return self.held(current_value);
        }
        let elapsed = self.gate.elapsed_since(now_s);
        match elapsed {
            Some(dt) if !self.gate.should_sample(dt) => self.held(current_value),
            Some(dt) => self.compute(current_value, dt, now_s),
            None => self.compute(current_value, 0.0, now_s),
        }
    }

    fn compute(&mut self, current_value: f64, dt: f64, now_s: f64) -> ControlResult {
        let gains = self.signed_gains();
        let error = self.setpoint - current_value;
        let proportional_term = gains.kp * error;

        // Anti-windup: clamp before committing.
        let integral = clamp(
            self.integral + gains.ki * error * dt,
            self.output_min,
            self.output_max,
        );
        let output = clamp(
            proportional_term + integral,
            self.output_min,
            self.output_max,
        );

        self.integral = integral;
        self.last_output = output;
        self.gate.mark(now_s);

        ControlResult {
            output,
            error,
            proportional_term,
            integral_term: integral,
            held: false,
        }
    }

    fn held(&self, current_value: f64) -> ControlResult {
        let error = self.setpoint - current_value;
        ControlResult {
            output: self.last_output,
            error,
            proportional_term: self.signed_gains().kp * error,
            integral_term: self.integral,
            held: true,
        }
    }

    /// Switch between heating and cooling.
    ///
    /// An actual change discards the integral; the old integral would push
    /// the actuator the wrong way. Same mode is a no-op.
    pub fn set_cooling(&mut self, is_cooling: bool) {
        self.set_mode(ControlMode::from_cooling(is_cooling));
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if mode == self.mode {
            return;
        }
        info!(from = %self.mode, to = %mode, "control direction changed, integral cleared");
        self.mode = mode;
        self.reset();
    }

    /// Replace the setpoint. Takes effect on the next update.
    pub fn set_target(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Replace tuning; the accumulated integral is kept.
    pub fn update_tunings(
        &mut self,
        proportional_band: f64,
        integral_time: f64,
    ) -> ControlsResult<()> {
        validate_tunings(proportional_band, integral_time)?;
        self.proportional_band = proportional_band;
        self.integral_time = integral_time;
        self.gains = Gains::from_hvac(proportional_band, integral_time);
        debug!(
            proportional_band,
            integral_time,
            kp = self.gains.kp,
            ki = self.gains.ki,
            "tunings updated"
        );
        Ok(())
    }

    /// Replace the output limits.
    ///
    /// The integral and the held output are re-clamped right away so that
    /// [`PIController::get_integral_term`] never reports a value outside the
    /// active limits.
    pub fn update_output_limits(
        &mut self,
        output_min: f64,
        output_max: f64,
    ) -> ControlsResult<()> {
        validate_limits(output_min, output_max)?;
        self.output_min = output_min;
        self.output_max = output_max;
        self.integral = clamp(self.integral, output_min, output_max);
        self.last_output = clamp(self.last_output, output_min, output_max);
        debug!(output_min, output_max, "output limits updated");
        Ok(())
    }

    pub fn update_sample_time(&mut self, sample_time: f64) -> ControlsResult<()> {
        validate_sample_time(sample_time)?;
        self.gate.set_sample_time(sample_time);
        Ok(())
    }

    /// Clear the integral and the sample history.
    ///
    /// Setpoint, tuning, limits and mode are untouched.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_output = initial_output(self.output_min, self.output_max);
        self.gate.reset();
    }

    /// Current integral accumulator, for persistence.
    pub fn get_integral_term(&self) -> f64 {
        self.integral
    }

    /// Seed the integral accumulator, typically once at startup.
    ///
    /// The value is trusted as-is and not clamped; the next update clamps
    /// it. Non-finite values are ignored.
    pub fn restore_integral_term(&mut self, value: f64) {
        if !value.is_finite() {
            warn!(value, "ignoring non-finite integral restore");
            return;
        }
        info!(value, "integral term restored");
        self.integral = value;
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn is_cooling(&self) -> bool {
        self.mode.is_cooling()
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn proportional_band(&self) -> f64 {
        self.proportional_band
    }

    pub fn integral_time(&self) -> f64 {
        self.integral_time
    }

    /// Gains with the sign of the current mode applied.
    pub fn signed_gains(&self) -> Gains {
        self.mode.apply(self.gains)
    }

    pub fn output_limits(&self) -> (f64, f64) {
        (self.output_min, self.output_max)
    }

    pub fn sample_time(&self) -> f64 {
        self.gate.sample_time()
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    /// Parameters that would rebuild this controller (without its integral).
    pub fn parameters(&self) -> ControllerParameters {
        ControllerParameters {
            proportional_band: self.proportional_band,
            integral_time: self.integral_time,
            output_min: self.output_min,
            output_max: self.output_max,
            sample_time: self.gate.sample_time(),
            setpoint: self.setpoint,
            is_cooling: self.mode.is_cooling(),
        }
    }
}

/// Output reported before the first computation: zero pulled into the limits.
fn initial_output(output_min: f64, output_max: f64) -> f64 {
    clamp(0.0, output_min, output_max)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn output_and_integral_stay_in_limits(
            pb in 0.5_f64..20.0,
            it in 1.0_f64..240.0,
            lo in -50.0_f64..50.0,
            span in 1.0_f64..100.0,
            is_cooling in any::<bool>(),
            steps in prop::collection::vec((0.0_f64..40.0, 0.0_f64..180.0), 1..40),
        ) {
            let mut pi = PIController::new(ControllerParameters {
                proportional_band: pb,
                integral_time: it,
                output_min: lo,
                output_max: lo + span,
                sample_time: 60.0,
                setpoint: 21.0,
                is_cooling,
            }).unwrap();

            for (temp, dt) in steps {
                let r = pi.update(temp, dt);
                prop_assert!(r.output >= lo && r.output <= lo + span);
                prop_assert!(r.integral_term >= lo && r.integral_term <= lo + span);
            }
        }

        #[test]
        fn held_calls_repeat_output(
            temp in 0.0_f64..40.0,
            next in 0.0_f64..40.0,
            dt in 0.0_f64..59.9,
        ) {
            let mut pi = PIController::new(ControllerParameters {
                sample_time: 60.0,
                ..ControllerParameters::default()
            }).unwrap();
            let first = pi.update(temp, 60.0);
            let second = pi.update(next, dt);
            prop_assert!(second.held);
            prop_assert_eq!(first.output, second.output);
        }
    }
}
