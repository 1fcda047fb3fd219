//! The destructive "reset system" command.
//!
//! Remote first, local second: the store root is deleted, and only once the
//! store confirms the delete are the trajectory and the live readout
//! cleared. A failed delete puts the connection state back to what it was
//! and touches nothing else.

use bevy::prelude::*;
use rovertrace_protocol::{ConnectionState, TelemetryRecord};

use crate::{
    constants::STORE_ROOT,
    store::{
        DeleteCompletion, Delivery, EventSink, RequestId, StoreClient, StoreQueue,
        SubscriptionEvent, TelemetryStore,
    },
    telemetry::LocalTelemetry,
};

/// Raised by the UI: the reset button and the two dialog buttons.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequest {
    Open,
    Cancel,
    Confirm,
}

/// Outcome of a confirmed reset, for the notification layer.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum ResetNotice {
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResetPhase {
    #[default]
    Idle,
    /// The confirm/cancel dialog is open.
    Confirming,
    /// The delete is in flight; `previous` is restored if it fails.
    Pending {
        request: RequestId,
        previous: ConnectionState,
    },
}

#[derive(Resource, Debug, Default)]
pub struct ResetCoordinator {
    phase: ResetPhase,
    last_request: RequestId,
    /// Telemetry that arrived while the delete was in flight.
    deferred: Vec<SubscriptionEvent>,
    /// Set by a successful wipe, cleared by the first real delivery.
    awaiting_record: bool,
}

impl ResetCoordinator {
    pub fn phase(&self) -> &ResetPhase {
        &self.phase
    }

    pub fn is_confirming(&self) -> bool {
        self.phase == ResetPhase::Confirming
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, ResetPhase::Pending { .. })
    }

    /// Open the confirmation dialog. Ignored while a reset is in progress.
    pub fn open(&mut self) -> bool {
        if self.phase != ResetPhase::Idle {
            return false;
        }
        self.phase = ResetPhase::Confirming;
        true
    }

    pub fn cancel(&mut self) {
        if self.is_confirming() {
            self.phase = ResetPhase::Idle;
        }
    }

    /// Start the reset. Only valid while the dialog is open.
    pub fn confirm(
        &mut self,
        connection: &mut ConnectionState,
        store: &dyn TelemetryStore,
        sink: EventSink,
    ) -> Option<RequestId> {
        if !self.is_confirming() {
            warn!("Reset confirmed without an open dialog, ignoring");
            return None;
        }

        self.awaiting_record = false;
        let previous = connection.begin_reset();
        self.last_request += 1;
        let request = self.last_request;
        self.phase = ResetPhase::Pending { request, previous };

        // the phase must be set first: in-process stores complete synchronously
        store.delete(STORE_ROOT, request, sink);
        Some(request)
    }

    pub fn defer(&mut self, event: SubscriptionEvent) {
        self.deferred.push(event);
    }

    /// Whether `delivery` is the `null` echo of a completed wipe.
    ///
    /// The store reports the deleted tree as an empty value, and on a remote
    /// store that report may arrive before or after the delete completion.
    /// Until a record or a transport failure comes in, empty values leave the
    /// connection in `Loading`.
    pub fn absorbs_echo(&mut self, delivery: &Delivery) -> bool {
        if !self.awaiting_record {
            return false;
        }
        if delivery.is_null_value() {
            return true;
        }
        self.awaiting_record = false;
        false
    }

    pub fn take_deferred(&mut self) -> Vec<SubscriptionEvent> {
        std::mem::take(&mut self.deferred)
    }

    /// Apply the store's answer to the pending delete.
    ///
    /// Returns `None` when `completion` does not belong to the pending reset.
    pub fn complete(
        &mut self,
        completion: DeleteCompletion,
        local: &mut LocalTelemetry<'_>,
        now_ms: i64,
    ) -> Option<ResetNotice> {
        match &self.phase {
            ResetPhase::Pending { request, .. } if *request == completion.request => {}
            _ => return None,
        }
        let ResetPhase::Pending { previous, .. } = std::mem::take(&mut self.phase) else {
            return None;
        };

        match completion.result {
            Ok(()) => {
                local.trajectory.reset();
                *local.current = TelemetryRecord::baseline(now_ms);
                *local.connection = ConnectionState::Loading;
                self.awaiting_record = true;
                info!("Store wiped, local telemetry reset");
                Some(ResetNotice::Completed)
            }
            Err(reason) => {
                local.connection.restore(previous);
                error!("Reset failed, keeping local telemetry: {}", reason);
                Some(ResetNotice::Failed(reason))
            }
        }
    }
}

pub(crate) fn handle_reset_requests(
    mut requests: EventReader<ResetRequest>,
    mut coordinator: ResMut<ResetCoordinator>,
    mut connection: ResMut<ConnectionState>,
    store: Res<StoreClient>,
    queue: Res<StoreQueue>,
) {
    for request in requests.read() {
        match request {
            ResetRequest::Open => {
                if !coordinator.open() {
                    debug!("Reset dialog already open or reset in flight");
                }
            }
            ResetRequest::Cancel => coordinator.cancel(),
            ResetRequest::Confirm => {
                if let Some(request) =
                    coordinator.confirm(&mut connection, store.store(), queue.sink())
                {
                    info!("Deleting the telemetry store (request {})", request);
                }
            }
        }
    }
}
