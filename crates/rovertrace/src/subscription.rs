use bevy::prelude::*;

use crate::store::{EventSink, StoreError, SubscriptionId, TelemetryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSubscription {
    pub id: SubscriptionId,
    pub path: String,
}

/// Owns the one live subscription to the telemetry path.
///
/// Every subscription gets a fresh id and store callbacks are tagged with
/// it. Anything tagged with an id other than the active one was produced
/// for a released subscription and must be dropped by the consumer, which
/// is what makes release effective even for callbacks already queued.
#[derive(Resource, Default, Debug)]
pub struct SubscriptionManager {
    last_id: SubscriptionId,
    active: Option<ActiveSubscription>,
}

impl SubscriptionManager {
    /// Open a subscription to `path`, releasing any previous one first.
    pub fn activate(
        &mut self,
        store: &dyn TelemetryStore,
        path: &str,
        sink: EventSink,
    ) -> Result<SubscriptionId, StoreError> {
        self.release(store);

        self.last_id += 1;
        let id = self.last_id;
        store.subscribe(path, id, sink)?;
        info!("Subscribed to '{}' (subscription {})", path, id);

        self.active = Some(ActiveSubscription {
            id,
            path: path.to_string(),
        });
        Ok(id)
    }

    pub fn release(&mut self, store: &dyn TelemetryStore) {
        if let Some(active) = self.active.take() {
            store.unsubscribe(active.id);
            info!(
                "Released subscription {} to '{}'",
                active.id, active.path
            );
        }
    }

    /// Whether events tagged with `id` may still be applied.
    pub fn accepts(&self, id: SubscriptionId) -> bool {
        self.active.as_ref().is_some_and(|active| active.id == id)
    }

    pub fn active(&self) -> Option<&ActiveSubscription> {
        self.active.as_ref()
    }
}
