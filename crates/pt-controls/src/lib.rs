//! PI control core for HVAC thermostats.
//!
//! This crate is a pure, in-process computation unit: it never reads a
//! sensor, writes an actuator or looks at a wall clock. A cycle driver calls
//! [`PIController::update`] once per control interval and decides what to do
//! with the returned [`ControlResult`].
//!
//! # Architecture
//!
//! - [`gain`]: HVAC tuning (proportional band, integral time) to gains
//! - [`mode`]: heating/cooling sign convention
//! - [`sampled`]: sample-time gating with zero-order hold
//! - [`controller`]: the PI state machine, mutators and integral persistence
//!
//! A controller instance is owned by one control loop. There is no internal
//! synchronization; share it behind a mutex if several threads drive it.

pub mod controller;
pub mod error;
pub mod gain;
pub mod mode;
pub mod sampled;

pub use controller::{ControlResult, ControllerParameters, PIController};
pub use error::{ControlError, ControlsResult};
pub use gain::{Gains, to_gains};
pub use mode::ControlMode;
pub use sampled::SampleGate;
