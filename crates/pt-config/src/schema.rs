//! Thermostat configuration schema.
//!
//! Every field has a default so partial files and option maps resolve to a
//! complete, typed configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PROP_BAND: f64 = 4.0;
pub const DEFAULT_INT_TIME: f64 = 120.0;
pub const DEFAULT_OUTPUT_MIN: f64 = 0.0;
pub const DEFAULT_OUTPUT_MAX: f64 = 100.0;
pub const DEFAULT_TARGET_TEMP: f64 = 20.0;
pub const DEFAULT_UPDATE_INTERVAL_S: u32 = 60;

/// Seconds a held output survives a sensor outage in [`SensorFaultMode::Hold`].
pub const SENSOR_FAULT_GRACE_PERIOD_S: u32 = 300;

/// How the controller decides between heating and cooling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Follow the climate entity's current HVAC action.
    #[default]
    HeatCool,
    Heat,
    Cool,
}

/// Where the setpoint comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetTempMode {
    /// `target_temp` from this configuration.
    #[default]
    Internal,
    /// State of `target_temp_entity`.
    External,
    /// Target temperature of `climate_entity`.
    Climate,
}

/// Behavior while the temperature sensor is unavailable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SensorFaultMode {
    /// Output 0 immediately.
    #[default]
    Shutdown,
    /// Hold the last output for the grace period, then shut down.
    Hold,
}

/// How the integral term is seeded at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ITermStartupMode {
    /// Persisted value, falling back to `iterm_startup_value`.
    #[default]
    Last,
    /// Always `iterm_startup_value`.
    Fixed,
    /// Always zero.
    Zero,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThermostatConfig {
    pub enabled: bool,
    pub climate_entity: String,
    pub temp_sensor: String,
    pub target_temp_mode: TargetTempMode,
    pub target_temp_entity: String,
    pub target_temp: f64,
    pub operating_mode: OperatingMode,
    pub auto_disable_on_hvac_off: bool,
    /// Kelvin.
    pub proportional_band: f64,
    /// Minutes.
    pub integral_time: f64,
    pub output_entity: String,
    pub output_min: f64,
    pub output_max: f64,
    /// Seconds between control cycles; also the controller's sample time.
    pub update_interval: u32,
    pub sensor_fault_mode: SensorFaultMode,
    pub iterm_startup_mode: ITermStartupMode,
    pub iterm_startup_value: f64,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            climate_entity: String::new(),
            temp_sensor: String::new(),
            target_temp_mode: TargetTempMode::Internal,
            target_temp_entity: String::new(),
            target_temp: DEFAULT_TARGET_TEMP,
            operating_mode: OperatingMode::HeatCool,
            auto_disable_on_hvac_off: true,
            proportional_band: DEFAULT_PROP_BAND,
            integral_time: DEFAULT_INT_TIME,
            output_entity: String::new(),
            output_min: DEFAULT_OUTPUT_MIN,
            output_max: DEFAULT_OUTPUT_MAX,
            update_interval: DEFAULT_UPDATE_INTERVAL_S,
            sensor_fault_mode: SensorFaultMode::Shutdown,
            iterm_startup_mode: ITermStartupMode::Last,
            iterm_startup_value: 0.0,
        }
    }
}

/// Configuration keys, spelled as in the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfKey {
    Enabled,
    ClimateEntity,
    TempSensor,
    TargetTempMode,
    TargetTempEntity,
    TargetTemp,
    OperatingMode,
    AutoDisableOnHvacOff,
    ProportionalBand,
    IntegralTime,
    OutputEntity,
    OutputMin,
    OutputMax,
    UpdateInterval,
    SensorFaultMode,
    ITermStartupMode,
    ITermStartupValue,
}

impl ConfKey {
    pub const ALL: [ConfKey; 17] = [
        ConfKey::Enabled,
        ConfKey::ClimateEntity,
        ConfKey::TempSensor,
        ConfKey::TargetTempMode,
        ConfKey::TargetTempEntity,
        ConfKey::TargetTemp,
        ConfKey::OperatingMode,
        ConfKey::AutoDisableOnHvacOff,
        ConfKey::ProportionalBand,
        ConfKey::IntegralTime,
        ConfKey::OutputEntity,
        ConfKey::OutputMin,
        ConfKey::OutputMax,
        ConfKey::UpdateInterval,
        ConfKey::SensorFaultMode,
        ConfKey::ITermStartupMode,
        ConfKey::ITermStartupValue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfKey::Enabled => "enabled",
            ConfKey::ClimateEntity => "climate_entity",
            ConfKey::TempSensor => "temp_sensor",
            ConfKey::TargetTempMode => "target_temp_mode",
            ConfKey::TargetTempEntity => "target_temp_entity",
            ConfKey::TargetTemp => "target_temp",
            ConfKey::OperatingMode => "operating_mode",
            ConfKey::AutoDisableOnHvacOff => "auto_disable_on_hvac_off",
            ConfKey::ProportionalBand => "proportional_band",
            ConfKey::IntegralTime => "integral_time",
            ConfKey::OutputEntity => "output_entity",
            ConfKey::OutputMin => "output_min",
            ConfKey::OutputMax => "output_max",
            ConfKey::UpdateInterval => "update_interval",
            ConfKey::SensorFaultMode => "sensor_fault_mode",
            ConfKey::ITermStartupMode => "iterm_startup_mode",
            ConfKey::ITermStartupValue => "iterm_startup_value",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Keys a running controller picks up without being rebuilt.
    pub fn is_runtime_configurable(self) -> bool {
        matches!(
            self,
            ConfKey::Enabled
                | ConfKey::TargetTemp
                | ConfKey::AutoDisableOnHvacOff
                | ConfKey::ProportionalBand
                | ConfKey::IntegralTime
                | ConfKey::OutputMin
                | ConfKey::OutputMax
                | ConfKey::UpdateInterval
        )
    }
}

pub fn runtime_configurable_keys() -> Vec<ConfKey> {
    ConfKey::ALL
        .iter()
        .copied()
        .filter(|k| k.is_runtime_configurable())
        .collect()
}

impl ThermostatConfig {
    /// Serialized form keyed by [`ConfKey::as_str`].
    pub fn to_options(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Coerce `raw` into the field for `key`.
    ///
    /// Returns `false` and leaves the field untouched when `raw` cannot be
    /// coerced.
    pub fn set(&mut self, key: ConfKey, raw: &Value) -> bool {
        match key {
            ConfKey::Enabled => assign(&mut self.enabled, to_bool(raw)),
            ConfKey::ClimateEntity => assign(&mut self.climate_entity, to_string(raw)),
            ConfKey::TempSensor => assign(&mut self.temp_sensor, to_string(raw)),
            ConfKey::TargetTempMode => assign(&mut self.target_temp_mode, to_enum(raw)),
            ConfKey::TargetTempEntity => assign(&mut self.target_temp_entity, to_string(raw)),
            ConfKey::TargetTemp => assign(&mut self.target_temp, to_f64(raw)),
            ConfKey::OperatingMode => assign(&mut self.operating_mode, to_enum(raw)),
            ConfKey::AutoDisableOnHvacOff => {
                assign(&mut self.auto_disable_on_hvac_off, to_bool(raw))
            }
            ConfKey::ProportionalBand => assign(&mut self.proportional_band, to_f64(raw)),
            ConfKey::IntegralTime => assign(&mut self.integral_time, to_f64(raw)),
            ConfKey::OutputEntity => assign(&mut self.output_entity, to_string(raw)),
            ConfKey::OutputMin => assign(&mut self.output_min, to_f64(raw)),
            ConfKey::OutputMax => assign(&mut self.output_max, to_f64(raw)),
            ConfKey::UpdateInterval => assign(&mut self.update_interval, to_u32(raw)),
            ConfKey::SensorFaultMode => assign(&mut self.sensor_fault_mode, to_enum(raw)),
            ConfKey::ITermStartupMode => assign(&mut self.iterm_startup_mode, to_enum(raw)),
            ConfKey::ITermStartupValue => assign(&mut self.iterm_startup_value, to_f64(raw)),
        }
    }
}

/// Resolve options over defaults.
///
/// Unknown keys are ignored; values that fail coercion fall back to the
/// default for that key.
pub fn resolve(options: &Map<String, Value>) -> ThermostatConfig {
    let mut config = ThermostatConfig::default();
    for key in ConfKey::ALL {
        if let Some(raw) = options.get(key.as_str()) {
            config.set(key, raw);
        }
    }
    config
}

fn assign<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

fn to_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_f64(raw: &Value) -> Option<f64> {
    let value: Option<f64> = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn to_u32(raw: &Value) -> Option<u32> {
    match raw {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn to_enum<T: serde::de::DeserializeOwned>(raw: &Value) -> Option<T> {
    match raw {
        Value::String(s) => serde_json::from_value(Value::String(s.trim().to_string())).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_constants() {
        let c = ThermostatConfig::default();
        assert!(c.enabled);
        assert_eq!(c.proportional_band, DEFAULT_PROP_BAND);
        assert_eq!(c.integral_time, DEFAULT_INT_TIME);
        assert_eq!(c.update_interval, 60);
        assert_eq!(c.operating_mode, OperatingMode::HeatCool);
        assert_eq!(c.sensor_fault_mode, SensorFaultMode::Shutdown);
    }

    #[test]
    fn resolve_coerces_strings() {
        let options = json!({
            "enabled": "off",
            "proportional_band": "2.5",
            "update_interval": "30",
            "operating_mode": "cool",
            "sensor_fault_mode": "hold",
        });
        let c = resolve(options.as_object().unwrap());
        assert!(!c.enabled);
        assert_eq!(c.proportional_band, 2.5);
        assert_eq!(c.update_interval, 30);
        assert_eq!(c.operating_mode, OperatingMode::Cool);
        assert_eq!(c.sensor_fault_mode, SensorFaultMode::Hold);
    }

    #[test]
    fn resolve_falls_back_on_bad_values() {
        let options = json!({
            "integral_time": "soon",
            "operating_mode": "sideways",
            "enabled": [1, 2],
            "not_a_key": 5,
        });
        let c = resolve(options.as_object().unwrap());
        assert_eq!(c, ThermostatConfig::default());
    }

    #[test]
    fn options_roundtrip_through_resolve() {
        let c = ThermostatConfig {
            temp_sensor: "sensor.living_room".to_string(),
            target_temp: 22.5,
            iterm_startup_mode: ITermStartupMode::Fixed,
            iterm_startup_value: 12.0,
            ..ThermostatConfig::default()
        };
        assert_eq!(resolve(&c.to_options()), c);
    }

    #[test]
    fn every_key_is_serialized() {
        let options = ThermostatConfig::default().to_options();
        for key in ConfKey::ALL {
            assert!(options.contains_key(key.as_str()), "{}", key.as_str());
            assert_eq!(ConfKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(options.len(), ConfKey::ALL.len());
    }

    #[test]
    fn runtime_keys() {
        let keys = runtime_configurable_keys();
        assert!(keys.contains(&ConfKey::ProportionalBand));
        assert!(keys.contains(&ConfKey::UpdateInterval));
        assert!(!keys.contains(&ConfKey::OperatingMode));
        assert!(!keys.contains(&ConfKey::TempSensor));
    }
}
