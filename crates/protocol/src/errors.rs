use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("no telemetry found in the store")]
    NoData,
    #[error("connection to the telemetry store failed: {0}")]
    Transport(String),
    #[error("could not reset the system: {0}")]
    ResetFailed(String),
}
