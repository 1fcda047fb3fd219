//! Real-time store clients.
//!
//! A store never touches screen state directly. Everything it produces is
//! pushed as a [`StoreEvent`] onto the single [`StoreQueue`], which the
//! ingest system drains once per frame in arrival order.

use std::sync::Arc;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use serde_json::Value;
use thiserror::Error;

use crate::telemetry::{TelemetrySettings, TelemetrySource};

mod firebase;
mod memory;
mod sse;
pub(crate) mod tree;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

/// Identifies one subscription for its whole lifetime. Never reused.
pub type SubscriptionId = u64;
/// Identifies one delete request issued by a reset.
pub type RequestId = u64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid database url '{0}'")]
    InvalidUrl(String),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Subscription(SubscriptionEvent),
    Deleted(DeleteCompletion),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionEvent {
    pub subscription: SubscriptionId,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Current value at the subscribed path (`Null` when absent).
    Value(Value),
    /// The subscription itself failed.
    Failed(String),
}

impl Delivery {
    pub fn is_null_value(&self) -> bool {
        matches!(self, Delivery::Value(Value::Null))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCompletion {
    pub request: RequestId,
    pub result: Result<(), String>,
}

/// Producer side of the [`StoreQueue`] handed to store clients.
#[derive(Clone, Debug)]
pub struct EventSink {
    sender: Sender<StoreEvent>,
}

impl EventSink {
    pub fn deliver(&self, subscription: SubscriptionId, delivery: Delivery) -> bool {
        self.send(StoreEvent::Subscription(SubscriptionEvent {
            subscription,
            delivery,
        }))
    }

    pub fn deleted(&self, request: RequestId, result: Result<(), String>) -> bool {
        self.send(StoreEvent::Deleted(DeleteCompletion { request, result }))
    }

    /// Returns false once the app side of the queue is gone.
    fn send(&self, event: StoreEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// The single FIFO every store callback goes through.
#[derive(Resource)]
pub struct StoreQueue {
    sender: Sender<StoreEvent>,
    receiver: Receiver<StoreEvent>,
}

impl Default for StoreQueue {
    fn default() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }
}

impl StoreQueue {
    pub fn sink(&self) -> EventSink {
        EventSink {
            sender: self.sender.clone(),
        }
    }

    /// Pending events, oldest first, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = StoreEvent> + '_ {
        self.receiver.try_iter()
    }
}

/// Client of the shared real-time store.
///
/// `subscribe` must deliver the current value at `path` as soon as it is
/// known and then every change. `delete` completes asynchronously through
/// [`EventSink::deleted`].
pub trait TelemetryStore: Send + Sync {
    fn subscribe(
        &self,
        path: &str,
        subscription: SubscriptionId,
        sink: EventSink,
    ) -> Result<(), StoreError>;

    fn unsubscribe(&self, subscription: SubscriptionId);

    fn delete(&self, path: &str, request: RequestId, sink: EventSink);
}

#[derive(Resource, Clone)]
pub struct StoreClient(pub Arc<dyn TelemetryStore>);

impl StoreClient {
    pub fn store(&self) -> &dyn TelemetryStore {
        self.0.as_ref()
    }
}

/// Set when the store is in-process, so local producers can write to it.
#[derive(Resource, Clone)]
pub struct LocalStore(pub Arc<MemoryStore>);

pub fn plugin(app: &mut App) {
    app.init_resource::<StoreQueue>()
        .init_resource::<TelemetrySettings>();

    let settings = app.world().resource::<TelemetrySettings>().clone();

    match &settings.source {
        TelemetrySource::Firebase { url } => match FirebaseStore::new(url) {
            Ok(store) => {
                info!("Streaming telemetry from {}", url);
                app.insert_resource(StoreClient(Arc::new(store)));
                return;
            }
            Err(err) => {
                error!("Failed to create store client for {}: {}", url, err);
                warn!("Falling back to the in-memory store");
            }
        },
        TelemetrySource::Memory => {
            info!("Using the in-memory telemetry store");
        }
    }

    let memory = Arc::new(MemoryStore::default());
    app.insert_resource(LocalStore(memory.clone()))
        .insert_resource(StoreClient(memory));
}
