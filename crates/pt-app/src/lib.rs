//! Thermostat service layer.
//!
//! Wires configuration, the PI controller and integral persistence into a
//! per-interval control cycle driven through the [`ThermostatIo`] adapter.

pub mod coordinator;
pub mod error;
pub mod io;
pub mod sim;
pub mod startup;

pub use coordinator::{Coordinator, CycleData, CycleStatus, controller_parameters, grace_cycles};
pub use error::{AppError, AppResult};
pub use io::{HvacAction, HvacMode, IoError, ThermostatIo};
pub use sim::SimulatedRoom;
pub use startup::{persist_integral, restore_from_store, startup_integral};
