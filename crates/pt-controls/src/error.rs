//! Error types for controller construction and runtime reconfiguration.

use pt_core::PtError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlsResult<T> = Result<T, ControlError>;

/// Rejected controller parameters.
///
/// Each variant names the precondition that failed so configuration layers
/// can map it back to the offending field.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Proportional band must be finite and strictly positive.
    #[error("Proportional band must be positive, got {value}")]
    InvalidProportionalBand { value: f64 },

    /// Integral time must be finite and strictly positive.
    #[error("Integral time must be positive, got {value} min")]
    InvalidIntegralTime { value: f64 },

    /// Output limits must be finite with `min < max`.
    #[error("Output limits must satisfy min < max, got min={min}, max={max}")]
    InvalidOutputLimits { min: f64, max: f64 },

    /// Sample time must be finite and strictly positive.
    #[error("Sample time must be positive, got {value} s")]
    InvalidSampleTime { value: f64 },

    /// Any other parameter that has to be finite.
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}

impl ControlError {
    /// Re-tag a generic core check as the controller-specific variant.
    pub(crate) fn from_core(err: PtError) -> Self {
        match err {
            PtError::NonFinite { what, value } | PtError::NotPositive { what, value } => {
                match what {
                    PROPORTIONAL_BAND => Self::InvalidProportionalBand { value },
                    INTEGRAL_TIME => Self::InvalidIntegralTime { value },
                    SAMPLE_TIME => Self::InvalidSampleTime { value },
                    _ => Self::NonFinite { what, value },
                }
            }
            PtError::InvalidRange { min, max, .. } => Self::InvalidOutputLimits { min, max },
        }
    }
}

pub(crate) const PROPORTIONAL_BAND: &str = "proportional_band";
pub(crate) const INTEGRAL_TIME: &str = "integral_time";
pub(crate) const SAMPLE_TIME: &str = "sample_time";
pub(crate) const OUTPUT_LIMITS: &str = "output_limits";
