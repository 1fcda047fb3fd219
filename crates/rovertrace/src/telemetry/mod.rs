use bevy::prelude::*;
use rovertrace_protocol::{
    ConnectionState, TelemetryRecord, TrajectoryBuffer, DEFAULT_TRAJECTORY_CAPACITY,
};

use crate::{
    constants::{DEFAULT_CHART_HEIGHT, TELEMETRY_PATH},
    reset::{self, ResetNotice, ResetRequest},
    screen::Screen,
    subscription::SubscriptionManager,
};

pub mod ingest;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelemetrySource {
    Memory,
    Firebase { url: String },
}

#[derive(Resource, Clone, Debug)]
pub struct TelemetrySettings {
    pub source: TelemetrySource,
    /// Store path holding the latest record.
    pub path: String,
    /// Number of positions kept for the trajectory chart.
    pub history: usize,
    /// Feed a simulated rover into the in-memory store.
    pub demo: bool,
    pub chart_height: f32,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        let source = match std::env::var("ROVERTRACE_SOURCE")
            .unwrap_or_else(|_| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "firebase" => std::env::var("ROVERTRACE_DATABASE_URL")
                .ok()
                .map(|url| TelemetrySource::Firebase { url })
                .unwrap_or(TelemetrySource::Memory),
            _ => TelemetrySource::Memory,
        };
        let path = std::env::var("ROVERTRACE_TELEMETRY_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| TELEMETRY_PATH.to_string());
        let history = std::env::var("ROVERTRACE_HISTORY")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_TRAJECTORY_CAPACITY);
        let demo = std::env::var("ROVERTRACE_DEMO")
            .map(|value| matches!(value.as_str(), "1" | "true" | "on"))
            .unwrap_or(false);
        let chart_height = std::env::var("ROVERTRACE_CHART_HEIGHT")
            .ok()
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(DEFAULT_CHART_HEIGHT);
        Self {
            source,
            path,
            history,
            demo,
            chart_height,
        }
    }
}

/// The latest validated record, shown as the live readout.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct CurrentRecord(pub TelemetryRecord);

/// Mutable view over the screen-local telemetry, so ingest and reset can
/// update the three pieces together.
pub struct LocalTelemetry<'a> {
    pub current: &'a mut TelemetryRecord,
    pub trajectory: &'a mut TrajectoryBuffer,
    pub connection: &'a mut ConnectionState,
}

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TelemetrySet {
    /// User commands (reset dialog) are turned into store requests.
    Commands,
    /// The store queue is drained into local state.
    Ingest,
    /// Derived data (chart series) is refreshed.
    Derive,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<TelemetrySettings>()
        .init_resource::<SubscriptionManager>()
        .add_event::<ResetRequest>()
        .add_event::<ResetNotice>()
        .configure_sets(
            Update,
            (
                TelemetrySet::Commands,
                TelemetrySet::Ingest,
                TelemetrySet::Derive,
            )
                .chain()
                .run_if(in_state(Screen::Mapping)),
        )
        .add_systems(
            Update,
            reset::handle_reset_requests.in_set(TelemetrySet::Commands),
        )
        .add_systems(
            Update,
            ingest::process_store_events.in_set(TelemetrySet::Ingest),
        );
}
