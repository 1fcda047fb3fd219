use chrono::Utc;
use serde::Serialize;

/// One update published by the rover under the telemetry path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub position: Pose,
    pub sensors: SensorState,
    pub environment: Environment,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Planar pose of the rover (centimetres, degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

/// Line sensors and the forward range finder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorState {
    pub left: bool,
    pub right: bool,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Environment {
    pub temperature: f64,
    pub humidity: f64,
}

/// A sample kept in the trajectory history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Pose> for Position {
    fn from(pose: Pose) -> Self {
        Self {
            x: pose.x,
            y: pose.y,
        }
    }
}

impl TelemetryRecord {
    /// The record shown right after the store has been wiped.
    pub fn baseline(now_ms: i64) -> Self {
        Self {
            timestamp: now_ms,
            ..Default::default()
        }
    }

    pub fn trajectory_point(&self) -> Position {
        self.position.into()
    }
}

/// Wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_zeroed_except_timestamp() {
        let record = TelemetryRecord::baseline(1_700_000_000_000);
        assert_eq!(record.position, Pose::default());
        assert!(!record.sensors.left && !record.sensors.right);
        assert_eq!(record.sensors.distance, 0.0);
        assert_eq!(record.environment, Environment::default());
        assert_eq!(record.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn now_is_epoch_milliseconds() {
        // 2020-01-01T00:00:00Z
        assert!(now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn trajectory_point_drops_the_angle() {
        let record = TelemetryRecord {
            position: Pose {
                x: 3.0,
                y: -4.5,
                angle: 90.0,
            },
            ..Default::default()
        };
        assert_eq!(record.trajectory_point(), Position::new(3.0, -4.5));
    }
}
