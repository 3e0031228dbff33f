use pt_config::{ITermStartupMode, OperatingMode, SensorFaultMode};
use std::path::Path;

#[test]
fn shipped_configs_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs");
    let configs = ["living_room.yaml", "office_cooling.json"];

    for name in configs {
        let path = root.join(name);
        pt_config::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
    }
}

#[test]
fn partial_json_config_falls_back_to_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs/office_cooling.json");
    let config = pt_config::load(&path).unwrap();

    assert_eq!(config.operating_mode, OperatingMode::Cool);
    assert_eq!(config.sensor_fault_mode, SensorFaultMode::Shutdown);
    assert_eq!(config.iterm_startup_mode, ITermStartupMode::Zero);
    assert_eq!(config.update_interval, 30);
    assert!(config.enabled);
    assert_eq!(config.output_max, 100.0);
}
