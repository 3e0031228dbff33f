use pt_config::*;

fn living_room() -> ThermostatConfig {
    ThermostatConfig {
        climate_entity: "climate.living_room".to_string(),
        temp_sensor: "sensor.living_room_temperature".to_string(),
        target_temp_mode: TargetTempMode::Climate,
        output_entity: "number.valve_position".to_string(),
        proportional_band: 3.0,
        integral_time: 90.0,
        update_interval: 120,
        sensor_fault_mode: SensorFaultMode::Hold,
        ..ThermostatConfig::default()
    }
}

#[test]
fn roundtrip_yaml() {
    let config = living_room();
    let path = std::env::temp_dir().join("pt_config_roundtrip.yaml");

    save_yaml(&path, &config).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn roundtrip_json() {
    let config = living_room();
    let path = std::env::temp_dir().join("pt_config_roundtrip.json");

    save_json(&path, &config).unwrap();
    let loaded = load(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn partial_yaml_uses_defaults() {
    let path = std::env::temp_dir().join("pt_config_partial.yaml");
    std::fs::write(
        &path,
        "temp_sensor: sensor.office\noperating_mode: cool\ntarget_temp: 24.0\n",
    )
    .unwrap();

    let loaded = load_yaml(&path).unwrap();
    assert_eq!(loaded.operating_mode, OperatingMode::Cool);
    assert_eq!(loaded.target_temp, 24.0);
    assert_eq!(loaded.proportional_band, DEFAULT_PROP_BAND);
    assert_eq!(loaded.update_interval, DEFAULT_UPDATE_INTERVAL_S);
}

#[test]
fn invalid_file_is_rejected() {
    let path = std::env::temp_dir().join("pt_config_invalid.yaml");
    std::fs::write(
        &path,
        "temp_sensor: sensor.office\noperating_mode: heat\nproportional_band: -2.0\n",
    )
    .unwrap();

    assert!(matches!(load_yaml(&path), Err(ConfigError::Validation(_))));
}

#[test]
fn save_refuses_invalid_config() {
    let path = std::env::temp_dir().join("pt_config_refused.yaml");
    let config = ThermostatConfig::default();
    // Default has no temperature source.
    assert!(save_yaml(&path, &config).is_err());
}
