//! pt-store: durable storage for controller integral terms.
//!
//! One JSON record per control loop, so a restarted loop can resume with its
//! accumulated integral action instead of starting from zero.

pub mod store;

pub use store::{IntegralRecord, IntegralStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid loop id: {loop_id:?}")]
    InvalidLoopId { loop_id: String },

    #[error("Refusing to store non-finite integral term {value} for {loop_id}")]
    NonFinite { loop_id: String, value: f64 },
}
