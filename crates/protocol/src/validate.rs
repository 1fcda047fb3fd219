//! Normalisation of raw store payloads into [`TelemetryRecord`]s.
//!
//! Every leaf is read independently: a value of the expected JSON type is
//! copied as-is, anything else falls back to zero / `false`. Only a `null`
//! payload is reported, as [`TelemetryError::NoData`].

use serde_json::{Map, Value};

use crate::{
    errors::TelemetryError,
    telemetry::{now_millis, Environment, Pose, SensorState, TelemetryRecord},
};

/// Validate a payload, stamping it with the current time when it has none.
pub fn validate(payload: &Value) -> Result<TelemetryRecord, TelemetryError> {
    validate_at(payload, now_millis())
}

/// Same as [`validate`] with an explicit fallback timestamp.
pub fn validate_at(payload: &Value, now_ms: i64) -> Result<TelemetryRecord, TelemetryError> {
    if payload.is_null() {
        return Err(TelemetryError::NoData);
    }
    if !payload.is_object() {
        log::debug!("telemetry payload is not an object, every field defaulted");
    }

    let position = section(payload, "position");
    let sensors = section(payload, "sensors");
    let environment = section(payload, "environment");

    Ok(TelemetryRecord {
        position: Pose {
            x: number(position, "x"),
            y: number(position, "y"),
            angle: number(position, "angle"),
        },
        sensors: SensorState {
            left: flag(sensors, "left"),
            right: flag(sensors, "right"),
            distance: number(sensors, "distance"),
        },
        environment: Environment {
            temperature: number(environment, "temperature"),
            humidity: number(environment, "humidity"),
        },
        timestamp: timestamp(payload).unwrap_or(now_ms),
    })
}

fn section<'a>(payload: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    payload.get(key)?.as_object()
}

fn number(section: Option<&Map<String, Value>>, key: &str) -> f64 {
    section
        .and_then(|fields| fields.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn flag(section: Option<&Map<String, Value>>, key: &str) -> bool {
    section
        .and_then(|fields| fields.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn timestamp(payload: &Value) -> Option<i64> {
    let Value::Number(number) = payload.get("timestamp")? else {
        return None;
    };
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|value| value as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Position;
    use serde_json::json;

    const NOW: i64 = 1_717_171_717_000;

    #[test]
    fn null_payload_is_no_data() {
        assert_eq!(validate_at(&Value::Null, NOW), Err(TelemetryError::NoData));
    }

    #[test]
    fn missing_right_sensor_defaults_to_false() {
        let payload = json!({
            "position": { "x": 12.5, "y": -3.0, "angle": 45.0 },
            "sensors": { "left": true, "distance": 18.2 },
            "environment": { "temperature": 23.4, "humidity": 51.0 },
            "timestamp": 1_700_000_000_123_i64,
        });

        let record = validate_at(&payload, NOW).unwrap();
        assert!(!record.sensors.right);
        assert!(record.sensors.left);
        assert_eq!(record.sensors.distance, 18.2);
        assert_eq!(
            record.position,
            Pose {
                x: 12.5,
                y: -3.0,
                angle: 45.0
            }
        );
        assert_eq!(record.environment.temperature, 23.4);
        assert_eq!(record.environment.humidity, 51.0);
        assert_eq!(record.timestamp, 1_700_000_000_123);
    }

    #[test]
    fn sparse_payload_is_fully_defaulted() {
        let record = validate_at(&json!({ "sensors": { "left": true } }), NOW).unwrap();
        assert_eq!(
            record,
            TelemetryRecord {
                position: Pose::default(),
                sensors: SensorState {
                    left: true,
                    right: false,
                    distance: 0.0,
                },
                environment: Environment::default(),
                timestamp: NOW,
            }
        );
    }

    #[test]
    fn wrongly_typed_fields_fall_back_to_zero() {
        let payload = json!({
            "position": { "x": "12", "y": 4, "angle": null },
            "sensors": { "left": 1, "right": "yes", "distance": true },
            "environment": [20.0, 40.0],
            "timestamp": "yesterday",
        });

        let record = validate_at(&payload, NOW).unwrap();
        assert_eq!(record.trajectory_point(), Position::new(0.0, 4.0));
        assert_eq!(record.position.angle, 0.0);
        assert!(!record.sensors.left);
        assert!(!record.sensors.right);
        assert_eq!(record.sensors.distance, 0.0);
        assert_eq!(record.environment, Environment::default());
        assert_eq!(record.timestamp, NOW);
    }

    #[test]
    fn fractional_timestamp_is_truncated() {
        let record = validate_at(&json!({ "timestamp": 1500.9 }), NOW).unwrap();
        assert_eq!(record.timestamp, 1500);
    }

    #[test]
    fn non_object_payload_is_not_an_error() {
        let record = validate_at(&json!(42), NOW).unwrap();
        assert_eq!(record, TelemetryRecord::baseline(NOW));
    }
}
