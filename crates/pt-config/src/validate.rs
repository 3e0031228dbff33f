//! Configuration validation logic.

use crate::schema::{OperatingMode, TargetTempMode, ThermostatConfig};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No temperature source: set temp_sensor or climate_entity")]
    NoTemperatureSource,

    #[error("{setting} requires {requires}")]
    MissingDependency {
        setting: String,
        requires: String,
    },
}

pub fn validate_config(config: &ThermostatConfig) -> Result<(), ValidationError> {
    positive("proportional_band", config.proportional_band)?;
    positive("integral_time", config.integral_time)?;

    pt_core::ensure_range(config.output_min, config.output_max, "output_limits").map_err(
        |_| ValidationError::InvalidValue {
            field: "output_min".to_string(),
            value: config.output_min.to_string(),
            reason: format!("must be less than output_max ({})", config.output_max),
        },
    )?;

    if config.update_interval == 0 {
        return Err(ValidationError::InvalidValue {
            field: "update_interval".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    if !config.target_temp.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "target_temp".to_string(),
            value: config.target_temp.to_string(),
            reason: "must be finite".to_string(),
        });
    }

    if !config.iterm_startup_value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: "iterm_startup_value".to_string(),
            value: config.iterm_startup_value.to_string(),
            reason: "must be finite".to_string(),
        });
    }

    let has_climate = !config.climate_entity.trim().is_empty();

    if config.temp_sensor.trim().is_empty() && !has_climate {
        return Err(ValidationError::NoTemperatureSource);
    }

    if config.operating_mode == OperatingMode::HeatCool && !has_climate {
        return Err(ValidationError::MissingDependency {
            setting: "operating_mode heat_cool".to_string(),
            requires: "climate_entity".to_string(),
        });
    }

    match config.target_temp_mode {
        TargetTempMode::Climate if !has_climate => Err(ValidationError::MissingDependency {
            setting: "target_temp_mode climate".to_string(),
            requires: "climate_entity".to_string(),
        }),
        TargetTempMode::External if config.target_temp_entity.trim().is_empty() => {
            Err(ValidationError::MissingDependency {
                setting: "target_temp_mode external".to_string(),
                requires: "target_temp_entity".to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    pt_core::ensure_positive(value, field)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ThermostatConfig {
        ThermostatConfig {
            temp_sensor: "sensor.room".to_string(),
            operating_mode: OperatingMode::Heat,
            ..ThermostatConfig::default()
        }
    }

    #[test]
    fn accepts_minimal_config() {
        validate_config(&valid()).unwrap();
    }

    #[test]
    fn rejects_non_positive_tuning() {
        let c = ThermostatConfig {
            proportional_band: 0.0,
            ..valid()
        };
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::InvalidValue { field, .. }) if field == "proportional_band"
        ));

        let c = ThermostatConfig {
            integral_time: -1.0,
            ..valid()
        };
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::InvalidValue { field, .. }) if field == "integral_time"
        ));
    }

    #[test]
    fn rejects_inverted_limits() {
        let c = ThermostatConfig {
            output_min: 100.0,
            output_max: 100.0,
            ..valid()
        };
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::InvalidValue { field, .. }) if field == "output_min"
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        let c = ThermostatConfig {
            update_interval: 0,
            ..valid()
        };
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn requires_temperature_source() {
        let c = ThermostatConfig {
            temp_sensor: String::new(),
            ..valid()
        };
        assert_eq!(validate_config(&c), Err(ValidationError::NoTemperatureSource));
    }

    #[test]
    fn heat_cool_requires_climate() {
        let c = ThermostatConfig {
            operating_mode: OperatingMode::HeatCool,
            ..valid()
        };
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::MissingDependency { requires, .. }) if requires == "climate_entity"
        ));

        let c = ThermostatConfig {
            operating_mode: OperatingMode::HeatCool,
            climate_entity: "climate.living_room".to_string(),
            ..valid()
        };
        validate_config(&c).unwrap();
    }

    #[test]
    fn target_modes_require_sources() {
        let c = ThermostatConfig {
            target_temp_mode: TargetTempMode::Climate,
            ..valid()
        };
        assert!(validate_config(&c).is_err());

        let c = ThermostatConfig {
            target_temp_mode: TargetTempMode::External,
            ..valid()
        };
        assert!(validate_config(&c).is_err());

        let c = ThermostatConfig {
            target_temp_mode: TargetTempMode::External,
            target_temp_entity: "input_number.target".to_string(),
            ..valid()
        };
        validate_config(&c).unwrap();
    }
}
