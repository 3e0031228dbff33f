//! I/O adapter contract between the coordinator and the host.
//!
//! Entities are addressed by name. A reading that is missing, unavailable or
//! not a number comes back as `None`; the coordinator treats that as a
//! sensor fault.

use serde::{Deserialize, Serialize};

/// HVAC mode reported by a climate entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Auto,
    Dry,
    FanOnly,
}

/// What a climate entity is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Off,
    Idle,
    Heating,
    Cooling,
    Drying,
    Fan,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to write {value} to {entity}: {reason}")]
pub struct IoError {
    pub entity: String,
    pub value: f64,
    pub reason: String,
}

/// Sensor reads and actuator writes for one thermostat.
pub trait ThermostatIo {
    /// State of a temperature sensor entity.
    fn temperature(&self, entity: &str) -> Option<f64>;

    /// State of an external setpoint entity.
    fn target_temperature(&self, entity: &str) -> Option<f64>;

    fn climate_current_temperature(&self, entity: &str) -> Option<f64>;

    fn climate_target_temperature(&self, entity: &str) -> Option<f64>;

    fn climate_hvac_mode(&self, entity: &str) -> Option<HvacMode>;

    fn climate_hvac_action(&self, entity: &str) -> Option<HvacAction>;

    /// Write the controller output to an actuator entity.
    fn set_output(&mut self, entity: &str, value: f64) -> Result<(), IoError>;
}
