use std::time::Duration;

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use egui::FontId;
use egui_notify::Toasts;

use crate::reset::ResetNotice;

#[derive(Resource, Default)]
pub struct EguiToasts(pub Toasts);

const TOAST_VERTICAL_MARGIN: f32 = 30.0;
const DEFAULT_TOAST_FONT_SIZE: f32 = 18.0;
const TOAST_DURATION: Duration = Duration::from_secs(8);

pub(crate) fn plugin(app: &mut App) {
    app.insert_resource(EguiToasts(
        Toasts::default().with_margin([0., TOAST_VERTICAL_MARGIN].into()),
    ))
    .add_systems(Update, (notify_reset_outcome, update_toasts).chain());
}

fn update_toasts(mut toasts: ResMut<EguiToasts>, mut contexts: EguiContexts) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    toasts.0.show(ctx);
}

/// Terminal adapter for systems returning `eyre::Result`: the error is logged
/// and, when the UI is up, shown as a toast.
pub(crate) fn error_to_toast(
    In(result): In<eyre::Result<()>>,
    toasts: Option<ResMut<EguiToasts>>,
) {
    let Err(err) = result else {
        return;
    };
    error!("{:#}", err);
    if let Some(mut toasts) = toasts {
        toasts
            .0
            .error(format!("{:#}", err))
            .duration(Some(TOAST_DURATION))
            .font(FontId::proportional(DEFAULT_TOAST_FONT_SIZE));
    }
}

/// Reset outcomes are dismissible notifications, never a blocking view.
fn notify_reset_outcome(mut notices: EventReader<ResetNotice>, mut toasts: ResMut<EguiToasts>) {
    for notice in notices.read() {
        let toast = match notice {
            ResetNotice::Completed => toasts.0.success("System reset: all data deleted"),
            ResetNotice::Failed(reason) => toasts
                .0
                .error(format!("Could not reset the system: {}", reason)),
        };
        toast
            .duration(Some(TOAST_DURATION))
            .closable(true)
            .font(FontId::proportional(DEFAULT_TOAST_FONT_SIZE));
    }
}
