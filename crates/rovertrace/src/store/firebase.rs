use std::{
    collections::HashMap,
    io::{BufRead, BufReader},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread,
    time::Duration,
};

use bevy::log::{debug, info};
use reqwest::{blocking::Client, header::ACCEPT};
use serde::Deserialize;
use serde_json::Value;

use super::{
    sse::{SseDecoder, SseMessage},
    tree::{segments, set_at},
    Delivery, EventSink, RequestId, StoreError, SubscriptionId, TelemetryStore,
};

const DELETE_TIMEOUT: Duration = Duration::from_secs(15);

/// Realtime Database over its REST interface.
///
/// Subscriptions are `text/event-stream` GETs read on a worker thread each;
/// `put`/`patch` events are merged into a cached copy of the subscribed
/// value, which is then delivered whole.
pub struct FirebaseStore {
    base_url: String,
    client: Client,
    streams: Mutex<HashMap<SubscriptionId, Arc<AtomicBool>>>,
}

impl FirebaseStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }
        // streams stay open indefinitely
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
            streams: Mutex::new(HashMap::new()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }
}

impl TelemetryStore for FirebaseStore {
    fn subscribe(
        &self,
        path: &str,
        subscription: SubscriptionId,
        sink: EventSink,
    ) -> Result<(), StoreError> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let client = self.client.clone();
        let url = self.endpoint(path);
        let flag = cancelled.clone();

        thread::Builder::new()
            .name(format!("rovertrace-stream-{subscription}"))
            .spawn(move || run_stream(&client, &url, subscription, &sink, &flag))
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription, cancelled);
        Ok(())
    }

    /// Flags the stream thread to stop. A blocked read cannot be interrupted,
    /// so the connection closes on the next line the server sends (at most one
    /// keep-alive interval); nothing is delivered for it after this call.
    fn unsubscribe(&self, subscription: SubscriptionId) {
        let removed = self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&subscription);
        if let Some(cancelled) = removed {
            cancelled.store(true, Ordering::Release);
        }
    }

    fn delete(&self, path: &str, request: RequestId, sink: EventSink) {
        let client = self.client.clone();
        let url = self.endpoint(path);
        let fallback = sink.clone();

        let spawned = thread::Builder::new()
            .name(format!("rovertrace-delete-{request}"))
            .spawn(move || {
                let result = client
                    .delete(&url)
                    .timeout(DELETE_TIMEOUT)
                    .send()
                    .map_err(|err| err.to_string())
                    .and_then(|response| {
                        if response.status().is_success() {
                            Ok(())
                        } else {
                            Err(format!("delete rejected with {}", response.status()))
                        }
                    });
                sink.deleted(request, result);
            });

        if let Err(err) = spawned {
            fallback.deleted(request, Err(err.to_string()));
        }
    }
}

fn run_stream(
    client: &Client,
    url: &str,
    subscription: SubscriptionId,
    sink: &EventSink,
    cancelled: &AtomicBool,
) {
    let result = stream_values(client, url, subscription, sink, cancelled);
    if cancelled.load(Ordering::Acquire) {
        debug!("Telemetry stream {} released", subscription);
        return;
    }
    let message = match result {
        Ok(()) => "telemetry stream closed by the server".to_string(),
        Err(message) => message,
    };
    sink.deliver(subscription, Delivery::Failed(message));
}

fn stream_values(
    client: &Client,
    url: &str,
    subscription: SubscriptionId,
    sink: &EventSink,
    cancelled: &AtomicBool,
) -> Result<(), String> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("stream request rejected with {}", response.status()));
    }
    info!("Telemetry stream {} connected", subscription);

    let mut decoder = SseDecoder::default();
    let mut cache = Value::Null;
    for line in BufReader::new(response).lines() {
        if cancelled.load(Ordering::Acquire) {
            return Ok(());
        }
        let line = line.map_err(|err| err.to_string())?;
        let Some(message) = decoder.feed(&line) else {
            continue;
        };
        if apply_message(&mut cache, &message)?
            && !sink.deliver(subscription, Delivery::Value(cache.clone()))
        {
            return Ok(());
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct StreamUpdate {
    path: String,
    data: Value,
}

/// Merge one stream event into `cache`. Returns whether the value changed.
fn apply_message(cache: &mut Value, message: &SseMessage) -> Result<bool, String> {
    match message.event.as_str() {
        "put" | "patch" => {
            let update: StreamUpdate = serde_json::from_str(&message.data)
                .map_err(|err| format!("malformed stream event: {err}"))?;
            let at = segments(&update.path);
            if message.event == "put" {
                set_at(cache, &at, update.data);
                return Ok(true);
            }
            let Value::Object(fields) = update.data else {
                return Err("patch event without an object body".to_string());
            };
            for (key, value) in fields {
                let mut path = at.clone();
                path.push(key.as_str());
                set_at(cache, &path, value);
            }
            Ok(true)
        }
        "keep-alive" => Ok(false),
        "cancel" => Err("stream cancelled by the server".to_string()),
        "auth_revoked" => Err("stream credentials revoked".to_string()),
        other => {
            debug!("Ignoring stream event '{}'", other);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(event: &str, data: Value) -> SseMessage {
        SseMessage {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn unsubscribe_flags_only_that_stream() {
        let store = FirebaseStore::new("http://localhost:9000").unwrap();
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));
        {
            let mut streams = store.streams.lock().unwrap();
            streams.insert(1, first.clone());
            streams.insert(2, second.clone());
        }

        store.unsubscribe(1);
        store.unsubscribe(1);

        assert!(first.load(Ordering::Acquire));
        assert!(!second.load(Ordering::Acquire));
        assert_eq!(store.streams.lock().unwrap().len(), 1);
    }

    #[test]
    fn endpoints_follow_rest_layout() {
        let store = FirebaseStore::new("https://rover-default-rtdb.firebaseio.com/").unwrap();
        assert_eq!(
            store.endpoint("lastData"),
            "https://rover-default-rtdb.firebaseio.com/lastData.json"
        );
        assert_eq!(
            store.endpoint("/"),
            "https://rover-default-rtdb.firebaseio.com/.json"
        );
    }

    #[test]
    fn rejects_urls_without_scheme() {
        assert!(matches!(
            FirebaseStore::new("rover.firebaseio.com"),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn put_and_patch_are_merged_into_the_cache() {
        let mut cache = Value::Null;

        let initial = json!({ "path": "/", "data": { "position": { "x": 1.0, "y": 2.0 } } });
        assert_eq!(apply_message(&mut cache, &message("put", initial)), Ok(true));

        let put = json!({ "path": "/position/y", "data": 5.0 });
        assert_eq!(apply_message(&mut cache, &message("put", put)), Ok(true));

        let patch = json!({ "path": "/sensors", "data": { "left": true, "distance": 9.5 } });
        assert_eq!(apply_message(&mut cache, &message("patch", patch)), Ok(true));

        assert_eq!(
            cache,
            json!({
                "position": { "x": 1.0, "y": 5.0 },
                "sensors": { "left": true, "distance": 9.5 },
            })
        );
    }

    #[test]
    fn keep_alive_changes_nothing_and_cancel_fails() {
        let mut cache = json!({ "timestamp": 1 });
        assert_eq!(
            apply_message(&mut cache, &message("keep-alive", Value::Null)),
            Ok(false)
        );
        assert!(apply_message(&mut cache, &message("cancel", Value::Null)).is_err());
        assert_eq!(cache, json!({ "timestamp": 1 }));
    }

    #[test]
    fn root_put_of_null_clears_the_cache() {
        let mut cache = json!({ "timestamp": 1 });
        let put = json!({ "path": "/", "data": null });
        assert_eq!(apply_message(&mut cache, &message("put", put)), Ok(true));
        assert!(cache.is_null());
    }
}
