//! Heating/cooling direction.
//!
//! The error is always `setpoint - current`. Direction lives entirely in the
//! gain sign: heating drives output up when the room is below setpoint,
//! cooling drives output up when the room is above it.

use crate::gain::Gains;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actuation direction of a control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    #[default]
    Heating,
    Cooling,
}

impl ControlMode {
    pub fn from_cooling(is_cooling: bool) -> Self {
        if is_cooling { Self::Cooling } else { Self::Heating }
    }

    pub fn is_cooling(self) -> bool {
        matches!(self, Self::Cooling)
    }

    /// Signed gains for this mode from unsigned magnitudes.
    pub fn apply(self, gains: Gains) -> Gains {
        let sign = match self {
            Self::Heating => 1.0,
            Self::Cooling => -1.0,
        };
        Gains {
            kp: sign * gains.kp.abs(),
            ki: sign * gains.ki.abs(),
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heating => write!(f, "heating"),
            Self::Cooling => write!(f, "cooling"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_sets_sign_and_keeps_magnitude() {
        let g = Gains { kp: 25.0, ki: 0.01 };
        let heat = ControlMode::Heating.apply(g);
        let cool = ControlMode::Cooling.apply(g);
        assert!(heat.kp > 0.0 && heat.ki > 0.0);
        assert!(cool.kp < 0.0 && cool.ki < 0.0);
        assert_eq!(heat.kp, -cool.kp);
        assert_eq!(heat.ki, -cool.ki);
    }

    #[test]
    fn apply_is_idempotent() {
        let g = Gains { kp: 25.0, ki: 0.01 };
        let once = ControlMode::Cooling.apply(g);
        assert_eq!(ControlMode::Cooling.apply(once), once);
        assert_eq!(ControlMode::Heating.apply(once), g);
    }

    #[test]
    fn from_cooling_flag() {
        assert_eq!(ControlMode::from_cooling(true), ControlMode::Cooling);
        assert_eq!(ControlMode::from_cooling(false), ControlMode::Heating);
        assert_eq!(ControlMode::Cooling.to_string(), "cooling");
    }
}
