//! Simulated rover that publishes into the in-memory store, so the app can
//! be driven without hardware.

use std::f64::consts::TAU;
use std::time::Duration;

use bevy::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rovertrace_protocol::{now_millis, Environment, Pose, SensorState, TelemetryRecord};

use crate::{store::LocalStore, telemetry::TelemetrySettings};

const PUBLISH_INTERVAL: Duration = Duration::from_millis(250);
/// Phase advance per published sample.
const STEP: f64 = 0.05;
const TRACK_RADIUS_X: f64 = 120.0;
const TRACK_RADIUS_Y: f64 = 60.0;

#[derive(Resource)]
pub struct DemoRover {
    rng: SmallRng,
    timer: Timer,
    phase: f64,
}

impl Default for DemoRover {
    fn default() -> Self {
        Self::seeded(42)
    }
}

impl DemoRover {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            timer: Timer::new(PUBLISH_INTERVAL, TimerMode::Repeating),
            phase: 0.0,
        }
    }

    /// Next point on an oval track.
    pub fn sample(&mut self, timestamp: i64) -> TelemetryRecord {
        self.phase = (self.phase + STEP) % TAU;
        let (sin, cos) = self.phase.sin_cos();
        // heading is the tangent of the oval
        let angle = (TRACK_RADIUS_Y * cos)
            .atan2(-TRACK_RADIUS_X * sin)
            .to_degrees()
            .rem_euclid(360.0);
        let drift = self.rng.gen_range(-0.3..0.3);

        TelemetryRecord {
            position: Pose {
                x: TRACK_RADIUS_X * cos,
                y: TRACK_RADIUS_Y * sin,
                angle,
            },
            sensors: SensorState {
                left: drift < -0.1,
                right: drift > 0.1,
                distance: self.rng.gen_range(10.0..80.0),
            },
            environment: Environment {
                temperature: 22.0 + self.rng.gen_range(-0.5..0.5),
                humidity: 45.0 + self.rng.gen_range(-2.0..2.0),
            },
            timestamp,
        }
    }
}

pub fn plugin(app: &mut App) {
    let Some(settings) = app.world().get_resource::<TelemetrySettings>() else {
        return;
    };
    if !settings.demo {
        return;
    }
    if app.world().get_resource::<LocalStore>().is_none() {
        warn!("Demo rover needs the in-memory store; it is disabled for this source");
        return;
    }
    info!("Demo rover publishing to '{}'", settings.path);
    app.init_resource::<DemoRover>()
        .add_systems(Update, drive_demo_rover);
}

fn drive_demo_rover(
    time: Res<Time>,
    mut rover: ResMut<DemoRover>,
    store: Res<LocalStore>,
    settings: Res<TelemetrySettings>,
) {
    if rover.timer.tick(time.delta()).just_finished() {
        publish(&mut rover, &store, &settings.path, now_millis());
    }
}

fn publish(rover: &mut DemoRover, store: &LocalStore, path: &str, timestamp: i64) {
    let sample = rover.sample(timestamp);
    match serde_json::to_value(sample) {
        Ok(value) => store.0.set(path, value),
        Err(err) => error!("Failed to encode demo sample: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rovertrace_protocol::validate;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn samples_stay_on_track() {
        let mut rover = DemoRover::seeded(7);
        for step in 0..200 {
            let record = rover.sample(step);
            assert_eq!(record.timestamp, step);
            assert!(record.position.x.abs() <= TRACK_RADIUS_X + 1e-9);
            assert!(record.position.y.abs() <= TRACK_RADIUS_Y + 1e-9);
            assert!((0.0..360.0).contains(&record.position.angle));
            assert!((10.0..80.0).contains(&record.sensors.distance));
            assert!(!(record.sensors.left && record.sensors.right));
        }
    }

    #[test]
    fn publish_writes_latest_record() {
        let store = LocalStore(Arc::new(MemoryStore::default()));
        let mut rover = DemoRover::seeded(1);

        publish(&mut rover, &store, "lastData", 1_000);
        publish(&mut rover, &store, "lastData", 2_000);

        let stored = store.0.get("lastData");
        assert_eq!(stored["timestamp"], json!(2_000));

        // the encoded sample is read back without any defaulting
        let mut replay = DemoRover::seeded(1);
        replay.sample(1_000);
        let expected = replay.sample(2_000);
        let decoded = validate(&stored).unwrap();
        assert!((decoded.position.x - expected.position.x).abs() < 1e-9);
        assert!((decoded.position.y - expected.position.y).abs() < 1e-9);
        assert!((decoded.sensors.distance - expected.sensors.distance).abs() < 1e-9);
        assert_eq!(decoded.sensors.left, expected.sensors.left);
        assert_eq!(decoded.sensors.right, expected.sensors.right);
        assert_eq!(decoded.timestamp, 2_000);
    }
}
