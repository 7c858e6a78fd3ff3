//! Sensor backend error kinds

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    /// The backend could not be opened at all; callers degrade to OS counters
    #[error("sensor backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A refresh or enumeration failed; transient, retried next cycle
    #[error("sensor read failed: {0}")]
    ReadFailure(String),

    /// The backend was used before `open()` or after `close()`
    #[error("sensor backend is not open")]
    NotOpen,
}
