use clap::{Parser, Subcommand};
use pt_app::{
    AppError, AppResult, Coordinator, CycleData, HvacAction, SimulatedRoom, persist_integral,
    restore_from_store,
};
use pt_config::{ConfKey, OperatingMode, ThermostatConfig, runtime_configurable_keys};
use pt_controls::Gains;
use pt_core::{as_seconds, celsius, minutes};
use pt_store::IntegralStore;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pt-cli")]
#[command(
    about = "HVAC PI thermostat - configuration checks and closed-loop simulation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a thermostat configuration file (YAML or JSON)
    Validate {
        /// Path to the configuration file
        config_path: PathBuf,
    },
    /// Convert HVAC tuning to controller gains
    Gains {
        /// Proportional band in degrees
        #[arg(long)]
        band: f64,
        /// Integral time in minutes
        #[arg(long)]
        integral_time: f64,
    },
    /// List settings that a running controller picks up without a restart
    Keys,
    /// Run the controller against a simulated room and print CSV
    Simulate {
        /// Path to the configuration file
        config_path: PathBuf,
        /// Number of control cycles to run
        #[arg(long, default_value_t = 120)]
        cycles: u64,
        /// Initial room temperature in °C
        #[arg(long, default_value_t = 16.0)]
        initial_temp: f64,
        /// Ambient temperature in °C
        #[arg(long, default_value_t = 5.0)]
        ambient: f64,
        /// Room time constant toward ambient, in minutes
        #[arg(long, default_value_t = 60.0)]
        tau_minutes: f64,
        /// Sensor outage as START..END cycle range
        #[arg(long)]
        outage: Option<String>,
        /// Directory for persisted integral terms
        #[arg(long)]
        state_dir: Option<PathBuf>,
        /// Loop identifier used for persistence
        #[arg(long, default_value = "default")]
        loop_id: String,
        /// Override a setting, e.g. `--set proportional_band=2.5`
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
}

fn main() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Gains {
            band,
            integral_time,
        } => cmd_gains(band, integral_time),
        Commands::Keys => cmd_keys(),
        Commands::Simulate {
            config_path,
            cycles,
            initial_temp,
            ambient,
            tau_minutes,
            outage,
            state_dir,
            loop_id,
            overrides,
        } => cmd_simulate(SimulateArgs {
            config_path: &config_path,
            cycles,
            initial_temp,
            ambient,
            tau_minutes,
            outage: outage.as_deref(),
            state_dir: state_dir.as_deref(),
            loop_id: &loop_id,
            overrides: &overrides,
        }),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = pt_config::load(config_path)?;
    let gains = Gains::from_hvac(config.proportional_band, config.integral_time);
    println!("✓ Configuration is valid");
    println!("  Operating mode: {:?}", config.operating_mode);
    println!("  Target mode: {:?}", config.target_temp_mode);
    println!("  kp = {:.4}, ki = {:.6} per second", gains.kp, gains.ki);
    println!("  Update interval: {} s", config.update_interval);
    Ok(())
}

fn cmd_gains(band: f64, integral_time: f64) -> AppResult<()> {
    pt_core::ensure_positive(band, "proportional_band")
        .and_then(|_| pt_core::ensure_positive(integral_time, "integral_time"))
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let gains = Gains::from_hvac(band, integral_time);
    println!("kp = {:.6}", gains.kp);
    println!("ki = {:.9}", gains.ki);
    Ok(())
}

fn cmd_keys() -> AppResult<()> {
    for key in runtime_configurable_keys() {
        println!("{}", key.as_str());
    }
    Ok(())
}

struct SimulateArgs<'a> {
    config_path: &'a Path,
    cycles: u64,
    initial_temp: f64,
    ambient: f64,
    tau_minutes: f64,
    outage: Option<&'a str>,
    state_dir: Option<&'a Path>,
    loop_id: &'a str,
    overrides: &'a [String],
}

fn cmd_simulate(args: SimulateArgs<'_>) -> AppResult<()> {
    pt_core::ensure_positive(args.tau_minutes, "tau_minutes")
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    let mut config = pt_config::load(args.config_path)?;
    apply_overrides(&mut config, args.overrides)?;

    let mut coordinator = Coordinator::new(&config)?;
    let store = args
        .state_dir
        .map(|dir| IntegralStore::new(dir.to_path_buf()))
        .transpose()?;
    if let Some(store) = &store {
        restore_from_store(&mut coordinator, store, args.loop_id, &config);
    }

    let mut room = SimulatedRoom::new(celsius(args.initial_temp), celsius(args.ambient));
    room.tau_s = as_seconds(minutes(args.tau_minutes));
    room.target_c = Some(config.target_temp);
    room.hvac_action = match config.operating_mode {
        OperatingMode::Cool => HvacAction::Cooling,
        OperatingMode::Heat => HvacAction::Heating,
        OperatingMode::HeatCool if args.initial_temp > config.target_temp => HvacAction::Cooling,
        OperatingMode::HeatCool => HvacAction::Heating,
    };
    room.outage = args.outage.map(parse_outage).transpose()?;

    let dt = f64::from(config.update_interval);
    info!(cycles = args.cycles, loop_id = args.loop_id, dt, "simulation started");
    println!("cycle,time_s,temp_c,target_c,output,error,p_term,i_term,status");
    for cycle in 0..args.cycles {
        let data = coordinator.run_cycle(&mut room, &config, dt);
        print_row(cycle, cycle as f64 * dt, room.temperature_c(), &data);
        room.step(dt);
    }

    if let Some(store) = &store {
        let saved = persist_integral(&coordinator, store, args.loop_id)?;
        eprintln!("✓ Integral term {saved:.4} saved for loop {}", args.loop_id);
    }
    Ok(())
}

fn apply_overrides(config: &mut ThermostatConfig, overrides: &[String]) -> AppResult<()> {
    for item in overrides {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| AppError::InvalidInput(format!("expected KEY=VALUE, got '{item}'")))?;
        let key = ConfKey::parse(key.trim())
            .ok_or_else(|| AppError::InvalidInput(format!("unknown setting '{key}'")))?;
        if !config.set(key, &Value::String(value.trim().to_string())) {
            return Err(AppError::InvalidInput(format!(
                "cannot use '{value}' for {}",
                key.as_str()
            )));
        }
    }
    Ok(())
}

fn parse_outage(range: &str) -> AppResult<(u64, u64)> {
    let invalid = || AppError::InvalidInput(format!("expected START..END, got '{range}'"));
    let (start, end) = range.split_once("..").ok_or_else(invalid)?;
    let start = start.trim().parse().map_err(|_| invalid())?;
    let end = end.trim().parse().map_err(|_| invalid())?;
    Ok((start, end))
}

fn print_row(cycle: u64, time_s: f64, temp_c: f64, data: &CycleData) {
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_default();
    println!(
        "{cycle},{time_s:.0},{temp_c:.4},{},{},{},{},{},{:?}",
        fmt(data.target_temp),
        fmt(data.output),
        fmt(data.error),
        fmt(data.proportional_term),
        fmt(data.integral_term),
        data.status,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_outage_range() {
        assert_eq!(parse_outage("10..20").unwrap(), (10, 20));
        assert!(parse_outage("10-20").is_err());
        assert!(parse_outage("a..b").is_err());
    }

    #[test]
    fn overrides_use_config_coercion() {
        let mut config = ThermostatConfig::default();
        apply_overrides(
            &mut config,
            &["proportional_band=2.5".to_string(), "enabled=off".to_string()],
        )
        .unwrap();
        assert_eq!(config.proportional_band, 2.5);
        assert!(!config.enabled);

        assert!(apply_overrides(&mut config, &["bogus=1".to_string()]).is_err());
        assert!(apply_overrides(&mut config, &["proportional_band".to_string()]).is_err());
    }
}
