//! pt-core: shared foundation for the PI thermostat crates.
//!
//! Contains:
//! - units (uom SI types + constructors for HVAC tuning quantities)
//! - numeric (Real + finiteness/range checks + clamp)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{PtError, PtResult};
pub use numeric::*;
pub use units::*;
