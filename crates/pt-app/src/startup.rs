//! Integral term startup policy and persistence.

use pt_config::{ITermStartupMode, ThermostatConfig};
use pt_store::IntegralStore;
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::error::AppResult;

/// Integral term to seed the controller with at startup, if any.
///
/// `Last` prefers the persisted value and falls back to the fixed value
/// when it is nonzero.
pub fn startup_integral(mode: ITermStartupMode, fixed: f64, persisted: Option<f64>) -> Option<f64> {
    match mode {
        ITermStartupMode::Zero => None,
        ITermStartupMode::Fixed => Some(fixed),
        ITermStartupMode::Last => persisted.or((fixed != 0.0).then_some(fixed)),
    }
}

/// Seed `coordinator` from the store according to the configured startup mode.
///
/// Returns the value that was restored. A store read failure is logged and
/// treated as "nothing persisted".
pub fn restore_from_store(
    coordinator: &mut Coordinator,
    store: &IntegralStore,
    loop_id: &str,
    config: &ThermostatConfig,
) -> Option<f64> {
    let persisted = match config.iterm_startup_mode {
        ITermStartupMode::Last => match store.load(loop_id) {
            Ok(record) => record.map(|r| r.integral_term),
            Err(err) => {
                warn!(%err, loop_id, "failed to load persisted integral term");
                None
            }
        },
        _ => None,
    };

    let value = startup_integral(
        config.iterm_startup_mode,
        config.iterm_startup_value,
        persisted,
    )?;
    coordinator.restore_integral_term(value);
    info!(
        loop_id,
        integral_term = value,
        mode = ?config.iterm_startup_mode,
        "integral term restored"
    );
    Some(value)
}

/// Persist the coordinator's current integral term.
pub fn persist_integral(
    coordinator: &Coordinator,
    store: &IntegralStore,
    loop_id: &str,
) -> AppResult<f64> {
    let record = store.save(loop_id, coordinator.integral_term())?;
    debug!(loop_id, integral_term = record.integral_term, "integral term persisted");
    Ok(record.integral_term)
}
