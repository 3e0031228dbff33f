//! Control cycle driver.
//!
//! [`Coordinator::run_cycle`] runs once per update interval:
//!
//!  1. Paused (`enabled = false`): return the last cycle's data, write nothing.
//!  2. Auto-disable when the climate entity's HVAC mode is `off`.
//!  3. Pick heating or cooling (fixed, or from the climate entity's action).
//!  4. Read the current temperature (dedicated sensor, else climate entity).
//!  5. Resolve the setpoint (internal, external entity, or climate entity).
//!  6. Sensor fault handling (shutdown, or hold then shutdown).
//!  7. Apply runtime tuning, limit and interval changes.
//!  8. Run the PI controller.
//!  9. Write the output to the output entity, if configured.
//! 10. Return [`CycleData`].

use pt_config::{
    OperatingMode, SENSOR_FAULT_GRACE_PERIOD_S, SensorFaultMode, TargetTempMode, ThermostatConfig,
    validate_config,
};
use pt_controls::{ControllerParameters, PIController};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::io::{HvacAction, HvacMode, ThermostatIo};

/// What the cycle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Controller computed (or held, within its sample time) an output.
    Active,
    /// Disabled by configuration; previous data repeated.
    Paused,
    /// Climate entity is off; output forced to 0.
    AutoDisabled,
    /// Sensor missing, last good output held.
    SensorHold,
    /// Sensor missing, output forced to 0.
    SensorShutdown,
    /// Sensor missing and nothing to hold yet; output left unknown.
    AwaitingSensor,
}

/// Result of one coordinator cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleData {
    /// `None` when no trustworthy output exists yet.
    pub output: Option<f64>,
    pub error: Option<f64>,
    pub proportional_term: Option<f64>,
    pub integral_term: Option<f64>,
    pub current_temp: Option<f64>,
    pub target_temp: Option<f64>,
    pub sensor_available: bool,
    pub status: CycleStatus,
}

impl CycleData {
    fn unknown(status: CycleStatus, target_temp: Option<f64>, sensor_available: bool) -> Self {
        Self {
            output: None,
            error: None,
            proportional_term: None,
            integral_term: None,
            current_temp: None,
            target_temp,
            sensor_available,
            status,
        }
    }

    fn shutdown(status: CycleStatus, target_temp: Option<f64>, sensor_available: bool) -> Self {
        Self {
            output: Some(0.0),
            ..Self::unknown(status, target_temp, sensor_available)
        }
    }
}

/// Settings last pushed into the controller.
#[derive(Debug, Clone, PartialEq)]
struct AppliedSettings {
    proportional_band: f64,
    integral_time: f64,
    output_min: f64,
    output_max: f64,
    update_interval: u32,
}

impl AppliedSettings {
    fn from_config(config: &ThermostatConfig) -> Self {
        Self {
            proportional_band: config.proportional_band,
            integral_time: config.integral_time,
            output_min: config.output_min,
            output_max: config.output_max,
            update_interval: config.update_interval,
        }
    }
}

/// Controller parameters derived from a validated configuration.
pub fn controller_parameters(config: &ThermostatConfig) -> ControllerParameters {
    ControllerParameters {
        proportional_band: config.proportional_band,
        integral_time: config.integral_time,
        output_min: config.output_min,
        output_max: config.output_max,
        sample_time: f64::from(config.update_interval),
        setpoint: config.target_temp,
        is_cooling: config.operating_mode == OperatingMode::Cool,
    }
}

/// Number of cycles a held output survives a sensor outage.
pub fn grace_cycles(update_interval: u32) -> u32 {
    (SENSOR_FAULT_GRACE_PERIOD_S / update_interval.max(1)).max(1)
}

/// Owns one control loop's PI controller and its fault bookkeeping.
#[derive(Debug, Clone)]
pub struct Coordinator {
    pi: PIController,
    applied: AppliedSettings,
    fault_cycles: u32,
    last_good_output: Option<f64>,
    last_data: Option<CycleData>,
    /// Time since the controller last computed, fed to `update`.
    pending_elapsed_s: f64,
}

impl Coordinator {
    pub fn new(config: &ThermostatConfig) -> AppResult<Self> {
        validate_config(config)?;
        let pi = PIController::new(controller_parameters(config))?;

        info!(
            update_interval = config.update_interval,
            proportional_band = config.proportional_band,
            integral_time = config.integral_time,
            operating_mode = ?config.operating_mode,
            "coordinator initialized"
        );

        Ok(Self {
            pi,
            applied: AppliedSettings::from_config(config),
            fault_cycles: 0,
            last_good_output: None,
            last_data: None,
            pending_elapsed_s: 0.0,
        })
    }

    pub fn controller(&self) -> &PIController {
        &self.pi
    }

    pub fn last_data(&self) -> Option<&CycleData> {
        self.last_data.as_ref()
    }

    pub fn integral_term(&self) -> f64 {
        self.pi.get_integral_term()
    }

    pub fn restore_integral_term(&mut self, value: f64) {
        self.pi.restore_integral_term(value);
    }

    /// Run one control cycle; `elapsed_s` is the time since the previous cycle.
    pub fn run_cycle<I>(
        &mut self,
        io: &mut I,
        config: &ThermostatConfig,
        elapsed_s: f64,
    ) -> CycleData
    where
        I: ThermostatIo + ?Sized,
    {
        if elapsed_s.is_finite() && elapsed_s > 0.0 {
            self.pending_elapsed_s += elapsed_s;
        }

        if !config.enabled {
            debug!("controller paused via enabled flag");
            return self.paused_result();
        }

        if !config.climate_entity.is_empty()
            && config.auto_disable_on_hvac_off
            && io.climate_hvac_mode(&config.climate_entity) == Some(HvacMode::Off)
        {
            debug!("auto-disabled: climate entity hvac mode is off");
            write_output(io, config, 0.0);
            return CycleData::shutdown(CycleStatus::AutoDisabled, None, true);
        }

        let is_cooling = determine_cooling(io, config);
        if is_cooling != self.pi.is_cooling() {
            // The flip resets the controller; time spent in the old direction
            // must not be integrated in the new one.
            self.pending_elapsed_s = 0.0;
        }
        self.pi.set_cooling(is_cooling);

        let current_temp = read_current_temp(io, config);
        let target_temp = read_target_temp(io, config);
        if let Some(target) = target_temp {
            self.pi.set_target(target);
        }

        let Some(current_temp) = current_temp else {
            return self.handle_sensor_fault(io, config, target_temp);
        };
        self.fault_cycles = 0;

        self.apply_runtime_changes(config);

        let result = self.pi.update(current_temp, self.pending_elapsed_s);
        if !result.held {
            self.pending_elapsed_s = 0.0;
        }
        self.last_good_output = Some(result.output);

        debug!(
            current_temp,
            output = result.output,
            error = result.error,
            p = result.proportional_term,
            i = result.integral_term,
            held = result.held,
            "control cycle"
        );

        write_output(io, config, result.output);

        let data = CycleData {
            output: Some(result.output),
            error: Some(result.error),
            proportional_term: Some(result.proportional_term),
            integral_term: Some(result.integral_term),
            current_temp: Some(current_temp),
            target_temp,
            sensor_available: true,
            status: CycleStatus::Active,
        };
        self.last_data = Some(data.clone());
        data
    }

    fn paused_result(&self) -> CycleData {
        match &self.last_data {
            Some(last) => CycleData {
                status: CycleStatus::Paused,
                ..last.clone()
            },
            None => CycleData::unknown(CycleStatus::Paused, None, true),
        }
    }

    fn apply_runtime_changes(&mut self, config: &ThermostatConfig) {
        let wanted = AppliedSettings::from_config(config);

        if wanted.proportional_band != self.applied.proportional_band
            || wanted.integral_time != self.applied.integral_time
        {
            match self
                .pi
                .update_tunings(wanted.proportional_band, wanted.integral_time)
            {
                Ok(()) => {
                    self.applied.proportional_band = wanted.proportional_band;
                    self.applied.integral_time = wanted.integral_time;
                    info!(
                        proportional_band = wanted.proportional_band,
                        integral_time = wanted.integral_time,
                        "tunings updated"
                    );
                }
                Err(err) => warn!(%err, "rejected tuning change"),
            }
        }

        if wanted.output_min != self.applied.output_min
            || wanted.output_max != self.applied.output_max
        {
            match self
                .pi
                .update_output_limits(wanted.output_min, wanted.output_max)
            {
                Ok(()) => {
                    self.applied.output_min = wanted.output_min;
                    self.applied.output_max = wanted.output_max;
                    info!(
                        output_min = wanted.output_min,
                        output_max = wanted.output_max,
                        "output limits updated"
                    );
                }
                Err(err) => warn!(%err, "rejected output limit change"),
            }
        }

        if wanted.update_interval != self.applied.update_interval {
            match self.pi.update_sample_time(f64::from(wanted.update_interval)) {
                Ok(()) => {
                    self.applied.update_interval = wanted.update_interval;
                    info!(update_interval = wanted.update_interval, "update interval changed");
                }
                Err(err) => warn!(%err, "rejected update interval change"),
            }
        }
    }

    fn handle_sensor_fault<I>(
        &mut self,
        io: &mut I,
        config: &ThermostatConfig,
        target_temp: Option<f64>,
    ) -> CycleData
    where
        I: ThermostatIo + ?Sized,
    {
        match (config.sensor_fault_mode, self.last_good_output) {
            (SensorFaultMode::Hold, Some(held)) => {
                let grace = grace_cycles(config.update_interval);
                self.fault_cycles += 1;

                if self.fault_cycles <= grace {
                    warn!(
                        cycle = self.fault_cycles,
                        grace,
                        output = held,
                        "sensor unavailable, holding last output"
                    );
                    return CycleData {
                        output: Some(held),
                        ..CycleData::unknown(CycleStatus::SensorHold, target_temp, false)
                    };
                }
                warn!("sensor unavailable, grace period exceeded, shutting down output");
            }
            (SensorFaultMode::Hold, None) => {
                warn!("sensor unavailable, no prior output, waiting for sensor");
                return CycleData::unknown(CycleStatus::AwaitingSensor, target_temp, false);
            }
            (SensorFaultMode::Shutdown, _) => {
                warn!("sensor unavailable, shutting down output");
            }
        }

        write_output(io, config, 0.0);
        CycleData::shutdown(CycleStatus::SensorShutdown, target_temp, false)
    }
}

fn determine_cooling<I>(io: &I, config: &ThermostatConfig) -> bool
where
    I: ThermostatIo + ?Sized,
{
    match config.operating_mode {
        OperatingMode::Cool => true,
        OperatingMode::Heat => false,
        OperatingMode::HeatCool => {
            !config.climate_entity.is_empty()
                && io.climate_hvac_action(&config.climate_entity) == Some(HvacAction::Cooling)
        }
    }
}

fn read_current_temp<I>(io: &I, config: &ThermostatConfig) -> Option<f64>
where
    I: ThermostatIo + ?Sized,
{
    let reading = if !config.temp_sensor.is_empty() {
        io.temperature(&config.temp_sensor)
    } else if !config.climate_entity.is_empty() {
        io.climate_current_temperature(&config.climate_entity)
    } else {
        None
    };
    reading.filter(|t| t.is_finite())
}

fn read_target_temp<I>(io: &I, config: &ThermostatConfig) -> Option<f64>
where
    I: ThermostatIo + ?Sized,
{
    let target = match config.target_temp_mode {
        TargetTempMode::Internal => Some(config.target_temp),
        TargetTempMode::External if !config.target_temp_entity.is_empty() => {
            io.target_temperature(&config.target_temp_entity)
        }
        TargetTempMode::Climate if !config.climate_entity.is_empty() => {
            io.climate_target_temperature(&config.climate_entity)
        }
        _ => None,
    };
    target.filter(|t| t.is_finite())
}

fn write_output<I>(io: &mut I, config: &ThermostatConfig, value: f64)
where
    I: ThermostatIo + ?Sized,
{
    if config.output_entity.is_empty() {
        return;
    }
    if let Err(err) = io.set_output(&config.output_entity, value) {
        warn!(%err, "output write failed");
    }
}
