use bevy::prelude::*;
use eyre::WrapErr;
use rovertrace_protocol::{ConnectionState, TelemetryError, TrajectoryBuffer};
use strum::{Display, EnumIter};

use crate::{
    reset::ResetCoordinator,
    store::{StoreClient, StoreQueue},
    subscription::SubscriptionManager,
    telemetry::{CurrentRecord, TelemetrySettings},
    ui::{toasts::error_to_toast, trajectory_chart::ChartCache},
};

#[derive(States, Default, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Screen {
    #[default]
    Mapping,
    Overview,
}

pub fn plugin(app: &mut App) {
    app.init_state::<Screen>()
        .add_systems(
            OnEnter(Screen::Mapping),
            (mount_mapping_screen, open_subscription.pipe(error_to_toast)).chain(),
        )
        .add_systems(OnExit(Screen::Mapping), unmount_mapping_screen);
}

/// Create the screen-local telemetry state.
pub(crate) fn mount_mapping_screen(mut commands: Commands, settings: Res<TelemetrySettings>) {
    commands.insert_resource(TrajectoryBuffer::new(settings.history));
    commands.insert_resource(CurrentRecord::default());
    commands.insert_resource(ConnectionState::Loading);
    commands.insert_resource(ResetCoordinator::default());
    commands.insert_resource(ChartCache::default());
}

pub(crate) fn open_subscription(
    settings: Res<TelemetrySettings>,
    store: Res<StoreClient>,
    queue: Res<StoreQueue>,
    mut manager: ResMut<SubscriptionManager>,
    mut connection: ResMut<ConnectionState>,
) -> eyre::Result<()> {
    manager
        .activate(store.store(), &settings.path, queue.sink())
        .map(|_| ())
        .map_err(|err| {
            connection.fail(&TelemetryError::Transport(err.to_string()));
            err
        })
        .wrap_err_with(|| format!("failed to subscribe to '{}'", settings.path))
}

/// Release the subscription before the state it feeds goes away.
pub(crate) fn unmount_mapping_screen(
    mut commands: Commands,
    store: Res<StoreClient>,
    queue: Res<StoreQueue>,
    mut manager: ResMut<SubscriptionManager>,
) {
    manager.release(store.store());

    let discarded = queue.drain().count();
    if discarded > 0 {
        debug!("Discarded {} queued store events on unmount", discarded);
    }

    commands.remove_resource::<TrajectoryBuffer>();
    commands.remove_resource::<CurrentRecord>();
    commands.remove_resource::<ConnectionState>();
    commands.remove_resource::<ResetCoordinator>();
    commands.remove_resource::<ChartCache>();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn mount_schedule() -> Schedule {
        let mut mount = Schedule::default();
        mount.add_systems(
            (mount_mapping_screen, open_subscription.pipe(error_to_toast)).chain(),
        );
        mount
    }

    fn world_with(store: Arc<MemoryStore>) -> World {
        let mut world = World::new();
        world.insert_resource(TelemetrySettings {
            history: 50,
            ..TelemetrySettings::default()
        });
        world.insert_resource(StoreQueue::default());
        world.insert_resource(StoreClient(store));
        world.insert_resource(SubscriptionManager::default());
        world
    }

    #[test]
    fn mount_then_unmount_releases_everything() {
        let store = Arc::new(MemoryStore::default());
        store.set("lastData", json!({ "timestamp": 1 }));
        let mut world = world_with(store.clone());

        let mut mount = mount_schedule();
        mount.run(&mut world);

        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(world.resource::<TrajectoryBuffer>().capacity(), 50);
        assert!(world.resource::<ConnectionState>().is_loading());
        assert!(world.contains_resource::<ResetCoordinator>());

        let mut unmount = Schedule::default();
        unmount.add_systems(unmount_mapping_screen);
        unmount.run(&mut world);

        assert_eq!(store.subscriber_count(), 0);
        assert!(world.resource::<SubscriptionManager>().active().is_none());
        assert!(!world.contains_resource::<TrajectoryBuffer>());
        assert!(!world.contains_resource::<ConnectionState>());
        // the initial value queued by the subscribe is gone as well
        assert_eq!(world.resource::<StoreQueue>().drain().count(), 0);
    }

    #[test]
    fn remount_keeps_a_single_subscription() {
        let store = Arc::new(MemoryStore::default());
        let mut world = world_with(store.clone());

        let mut mount = mount_schedule();
        mount.run(&mut world);
        mount.run(&mut world);

        assert_eq!(store.subscriber_count(), 1);
    }
}
