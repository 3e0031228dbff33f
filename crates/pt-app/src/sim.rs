//! In-memory room model implementing [`ThermostatIo`].
//!
//! First-order thermal response: the room relaxes toward ambient with time
//! constant `tau_s` and the actuator adds (heating) or removes (cooling)
//! `rate_c_per_s * output / 100` degrees per second.

use pt_core::{Temperature, as_celsius};

use crate::io::{HvacAction, HvacMode, IoError, ThermostatIo};

#[derive(Debug, Clone)]
pub struct SimulatedRoom {
    temperature_c: f64,
    ambient_c: f64,
    /// Relaxation time constant toward ambient.
    pub tau_s: f64,
    /// Temperature change per second at 100 % output.
    pub rate_c_per_s: f64,
    pub hvac_mode: HvacMode,
    pub hvac_action: HvacAction,
    /// Setpoint exposed by the climate entity and the external target entity.
    pub target_c: Option<f64>,
    /// Cycles (inclusive start, exclusive end) during which the sensor reads `None`.
    pub outage: Option<(u64, u64)>,
    pub fail_writes: bool,
    cycle: u64,
    output: f64,
    writes: Vec<(String, f64)>,
}

impl SimulatedRoom {
    pub fn new(initial: Temperature, ambient: Temperature) -> Self {
        Self {
            temperature_c: as_celsius(initial),
            ambient_c: as_celsius(ambient),
            tau_s: 3600.0,
            rate_c_per_s: 0.01,
            hvac_mode: HvacMode::Heat,
            hvac_action: HvacAction::Heating,
            target_c: None,
            outage: None,
            fail_writes: false,
            cycle: 0,
            output: 0.0,
            writes: Vec::new(),
        }
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    /// Last value successfully written to the actuator.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn writes(&self) -> &[(String, f64)] {
        &self.writes
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    fn sensor_up(&self) -> bool {
        match self.outage {
            Some((start, end)) => !(start..end).contains(&self.cycle),
            None => true,
        }
    }

    /// Advance the room by `dt_s` seconds using the current actuator output.
    pub fn step(&mut self, dt_s: f64) {
        let drive = match self.hvac_action {
            HvacAction::Cooling => -self.output,
            HvacAction::Heating => self.output,
            _ => 0.0,
        } / 100.0;
        let leak = (self.ambient_c - self.temperature_c) / self.tau_s;
        self.temperature_c += (leak + self.rate_c_per_s * drive) * dt_s;
        self.cycle += 1;
    }
}

impl ThermostatIo for SimulatedRoom {
    fn temperature(&self, _entity: &str) -> Option<f64> {
        self.sensor_up().then_some(self.temperature_c)
    }

    fn target_temperature(&self, _entity: &str) -> Option<f64> {
        self.target_c
    }

    fn climate_current_temperature(&self, _entity: &str) -> Option<f64> {
        self.sensor_up().then_some(self.temperature_c)
    }

    fn climate_target_temperature(&self, _entity: &str) -> Option<f64> {
        self.target_c
    }

    fn climate_hvac_mode(&self, _entity: &str) -> Option<HvacMode> {
        Some(self.hvac_mode)
    }

    fn climate_hvac_action(&self, _entity: &str) -> Option<HvacAction> {
        Some(self.hvac_action)
    }

    fn set_output(&mut self, entity: &str, value: f64) -> Result<(), IoError> {
        if self.fail_writes {
            return Err(IoError {
                entity: entity.to_string(),
                value,
                reason: "actuator unavailable".to_string(),
            });
        }
        self.output = value;
        self.writes.push((entity.to_string(), value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_core::celsius;

    #[test]
    fn relaxes_toward_ambient_without_output() {
        let mut room = SimulatedRoom::new(celsius(20.0), celsius(10.0));
        room.step(600.0);
        assert!(room.temperature_c() < 20.0);
        assert!(room.temperature_c() > 10.0);
    }

    #[test]
    fn heating_and_cooling_drive_opposite_ways() {
        let mut heat = SimulatedRoom::new(celsius(20.0), celsius(20.0));
        heat.set_output("valve", 100.0).unwrap();
        heat.step(60.0);
        assert!(heat.temperature_c() > 20.0);

        let mut cool = SimulatedRoom::new(celsius(20.0), celsius(20.0));
        cool.hvac_action = HvacAction::Cooling;
        cool.set_output("valve", 100.0).unwrap();
        cool.step(60.0);
        assert!(cool.temperature_c() < 20.0);
    }

    #[test]
    fn outage_window_hides_sensor() {
        let mut room = SimulatedRoom::new(celsius(20.0), celsius(20.0));
        room.outage = Some((1, 2));
        assert!(room.temperature("s").is_some());
        room.step(1.0);
        assert!(room.temperature("s").is_none());
        room.step(1.0);
        assert!(room.temperature("s").is_some());
    }

    #[test]
    fn failed_writes_keep_previous_output() {
        let mut room = SimulatedRoom::new(celsius(20.0), celsius(20.0));
        room.set_output("valve", 40.0).unwrap();
        room.fail_writes = true;
        assert!(room.set_output("valve", 80.0).is_err());
        assert_eq!(room.output(), 40.0);
        assert_eq!(room.writes().len(), 1);
    }
}
