//! Sample-time gating for the PI update.
//!
//! An update is effective only when at least `sample_time` seconds have
//! passed since the previous effective update. Anything sooner is a hold:
//! the previous output is reused (zero-order hold).
//!
//! The gate keeps its own timeline in seconds. Hosts either report the
//! interval since the last effective update, or a monotonic timestamp on a
//! timeline of their choosing. Elapsed time is never read from a wall clock
//! here.

use serde::{Deserialize, Serialize};

/// Tracks when the controller last produced a new output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleGate {
    /// Minimum interval between effective updates, seconds.
    sample_time: f64,
    /// Timeline position of the last effective update.
    last_update_s: Option<f64>,
}

impl SampleGate {
    /// New gate with no prior update. `sample_time` is validated upstream.
    pub fn new(sample_time: f64) -> Self {
        Self {
            sample_time,
            last_update_s: None,
        }
    }

    pub fn sample_time(&self) -> f64 {
        self.sample_time
    }

    pub fn set_sample_time(&mut self, sample_time: f64) {
        self.sample_time = sample_time;
    }

    pub fn last_update(&self) -> Option<f64> {
        self.last_update_s
    }

    /// Whether an update `elapsed_s` after the previous effective one
    /// should compute a new output.
    ///
    /// The first update after construction or [`SampleGate::reset`] always
    /// samples. Non-finite and negative intervals never do afterwards.
    pub fn should_sample(&self, elapsed_s: f64) -> bool {
        match self.last_update_s {
            None => true,
            Some(_) => elapsed_s.is_finite() && elapsed_s >= self.sample_time,
        }
    }

    /// Integration step for an accepted interval: zero unless finite and positive.
    pub fn step_for(elapsed_s: f64) -> f64 {
        if elapsed_s.is_finite() {
            elapsed_s.max(0.0)
        } else {
            0.0
        }
    }

    /// Interval between the last effective update and `now_s`, if any.
    pub fn elapsed_since(&self, now_s: f64) -> Option<f64> {
        self.last_update_s.map(|t| now_s - t)
    }

    /// Timeline position reached by advancing `elapsed_s` from the last update.
    pub fn advanced_by(&self, elapsed_s: f64) -> f64 {
        self.last_update_s.unwrap_or(0.0) + elapsed_s
    }

    /// Record an effective update at `now_s`.
    pub fn mark(&mut self, now_s: f64) {
        self.last_update_s = Some(now_s);
    }

    /// Forget the last update; the next call samples unconditionally.
    pub fn reset(&mut self) {
        self.last_update_s = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_always_samples() {
        let gate = SampleGate::new(60.0);
        assert!(gate.should_sample(0.0));
        assert!(gate.should_sample(1.0));
        assert!(gate.should_sample(-5.0));
    }

    #[test]
    fn holds_until_sample_time_elapsed() {
        let mut gate = SampleGate::new(60.0);
        gate.mark(0.0);

        assert!(!gate.should_sample(0.0));
        assert!(!gate.should_sample(59.9));
        assert!(gate.should_sample(60.0));
        assert!(gate.should_sample(120.0));
        assert!(!gate.should_sample(f64::NAN));
        assert!(!gate.should_sample(f64::INFINITY));
    }

    #[test]
    fn step_for_rejects_non_finite_intervals() {
        assert_eq!(SampleGate::step_for(60.0), 60.0);
        assert_eq!(SampleGate::step_for(-5.0), 0.0);
        assert_eq!(SampleGate::step_for(f64::NAN), 0.0);
        assert_eq!(SampleGate::step_for(f64::INFINITY), 0.0);
    }

    #[test]
    fn timeline_tracking() {
        let mut gate = SampleGate::new(10.0);
        assert_eq!(gate.elapsed_since(5.0), None);
        assert_eq!(gate.advanced_by(10.0), 10.0);

        gate.mark(100.0);
        assert_eq!(gate.elapsed_since(112.5), Some(12.5));
        assert_eq!(gate.advanced_by(10.0), 110.0);

        gate.reset();
        assert_eq!(gate.last_update(), None);
    }

    #[test]
    fn sample_time_change_applies_to_next_check() {
        let mut gate = SampleGate::new(60.0);
        gate.mark(0.0);
        assert!(!gate.should_sample(30.0));
        gate.set_sample_time(30.0);
        assert!(gate.should_sample(30.0));
        assert_eq!(gate.sample_time(), 30.0);
    }
}
