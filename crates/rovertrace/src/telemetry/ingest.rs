use bevy::prelude::*;
use rovertrace_protocol::{
    now_millis, validate, ConnectionState, TelemetryError, TelemetryRecord, TrajectoryBuffer,
};

use crate::{
    reset::{ResetCoordinator, ResetNotice},
    store::{Delivery, StoreEvent, StoreQueue, SubscriptionEvent},
    subscription::SubscriptionManager,
};

use super::{CurrentRecord, LocalTelemetry};

/// Drain the store queue into the mapping screen state, oldest event first.
///
/// While a reset is in flight, telemetry is held back and replayed after the
/// reset outcome has been applied. After a successful reset the `null` values
/// produced by the delete itself are dropped, whether they were held back or
/// arrive after the completion.
pub(crate) fn process_store_events(
    queue: Res<StoreQueue>,
    manager: Res<SubscriptionManager>,
    mut coordinator: ResMut<ResetCoordinator>,
    mut current: ResMut<CurrentRecord>,
    mut trajectory: ResMut<TrajectoryBuffer>,
    mut connection: ResMut<ConnectionState>,
    mut notices: EventWriter<ResetNotice>,
) {
    let mut local = LocalTelemetry {
        current: &mut current.0,
        trajectory: &mut trajectory,
        connection: &mut connection,
    };

    for event in queue.drain() {
        match event {
            StoreEvent::Subscription(event) if coordinator.is_pending() => {
                coordinator.defer(event);
            }
            StoreEvent::Subscription(event) => {
                apply_subscription_event(&manager, &mut coordinator, event, &mut local)
            }
            StoreEvent::Deleted(completion) => {
                let request = completion.request;
                let Some(notice) = coordinator.complete(completion, &mut local, now_millis())
                else {
                    debug!("Ignoring completion of stale delete request {}", request);
                    continue;
                };

                for event in coordinator.take_deferred() {
                    apply_subscription_event(&manager, &mut coordinator, event, &mut local);
                }
                notices.send(notice);
            }
        }
    }
}

pub(crate) fn apply_subscription_event(
    manager: &SubscriptionManager,
    coordinator: &mut ResetCoordinator,
    event: SubscriptionEvent,
    local: &mut LocalTelemetry<'_>,
) {
    if !manager.accepts(event.subscription) {
        debug!(
            "Discarding event from released subscription {}",
            event.subscription
        );
        return;
    }
    if coordinator.absorbs_echo(&event.delivery) {
        debug!("Store is empty after the reset, waiting for the rover");
        return;
    }
    let outcome = match event.delivery {
        Delivery::Value(value) => validate(&value),
        Delivery::Failed(message) => Err(TelemetryError::Transport(message)),
    };
    apply_delivery(outcome, local);
}

/// Success updates the readout and the trail; failure only flips the
/// connection state so the last good values stay visible.
pub fn apply_delivery(
    outcome: Result<TelemetryRecord, TelemetryError>,
    local: &mut LocalTelemetry<'_>,
) {
    match outcome {
        Ok(record) => {
            *local.current = record;
            local.trajectory.append(record.trajectory_point());
            local.connection.record_received();
        }
        Err(err) => {
            warn!("Telemetry unavailable: {}", err);
            local.connection.fail(&err);
        }
    }
}
