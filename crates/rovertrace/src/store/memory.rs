use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;

use super::{
    tree::{segments, set_at, value_at},
    Delivery, EventSink, RequestId, StoreError, SubscriptionId, TelemetryStore,
};

/// In-process JSON tree with Realtime-Database semantics.
///
/// Subscribers get the current value on subscribe and on every change under
/// their path. Notifications are sent synchronously from the writer.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryTree>,
}

#[derive(Default)]
struct MemoryTree {
    root: Value,
    subscribers: HashMap<SubscriptionId, Subscriber>,
    delete_failure: Option<String>,
}

struct Subscriber {
    path: String,
    sink: EventSink,
}

impl MemoryStore {
    pub fn get(&self, path: &str) -> Value {
        value_at(&self.lock().root, &segments(path)).clone()
    }

    /// Write `value` at `path` and notify affected subscribers.
    pub fn set(&self, path: &str, value: Value) {
        let mut tree = self.lock();
        tree.write(path, value);
    }

    /// Make the next delete fail with `reason` instead of touching the tree.
    pub fn fail_next_delete(&self, reason: impl Into<String>) {
        self.lock().delete_failure = Some(reason.into());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTree> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryTree {
    fn write(&mut self, path: &str, value: Value) {
        let before: Vec<(SubscriptionId, Value)> = self
            .subscribers
            .iter()
            .map(|(id, sub)| (*id, value_at(&self.root, &segments(&sub.path)).clone()))
            .collect();

        set_at(&mut self.root, &segments(path), value);

        for (id, previous) in before {
            let Some(sub) = self.subscribers.get(&id) else {
                continue;
            };
            let current = value_at(&self.root, &segments(&sub.path));
            if *current != previous {
                sub.sink.deliver(id, Delivery::Value(current.clone()));
            }
        }
    }
}

impl TelemetryStore for MemoryStore {
    fn subscribe(
        &self,
        path: &str,
        subscription: SubscriptionId,
        sink: EventSink,
    ) -> Result<(), StoreError> {
        let mut tree = self.lock();
        let current = value_at(&tree.root, &segments(path)).clone();
        if !sink.deliver(subscription, Delivery::Value(current)) {
            return Err(StoreError::Unavailable("event queue closed".to_string()));
        }
        tree.subscribers.insert(
            subscription,
            Subscriber {
                path: path.to_string(),
                sink,
            },
        );
        Ok(())
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.lock().subscribers.remove(&subscription);
    }

    fn delete(&self, path: &str, request: RequestId, sink: EventSink) {
        let mut tree = self.lock();
        if let Some(reason) = tree.delete_failure.take() {
            sink.deleted(request, Err(reason));
            return;
        }
        tree.write(path, Value::Null);
        sink.deleted(request, Ok(()));
    }
}
