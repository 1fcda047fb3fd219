mod chart;
mod connection;
mod errors;
mod telemetry;
mod trajectory;
mod validate;

pub use chart::{project, PlotDataset};
pub use connection::ConnectionState;
pub use errors::TelemetryError;
pub use telemetry::*;
pub use trajectory::{TrajectoryBuffer, DEFAULT_TRAJECTORY_CAPACITY};
pub use validate::{validate, validate_at};

