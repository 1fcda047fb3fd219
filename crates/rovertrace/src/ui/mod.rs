use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin};
use strum::IntoEnumIterator;

use crate::{screen::Screen, telemetry::TelemetrySet};

pub mod mapping_screen;
pub mod toasts;
pub mod trajectory_chart;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
        app.add_plugins(EguiPlugin);
    }

    app.add_plugins(toasts::plugin)
        .add_systems(Update, screen_tabs_ui)
        .add_systems(
            Update,
            trajectory_chart::refresh_chart_cache.in_set(TelemetrySet::Derive),
        )
        .add_systems(
            Update,
            mapping_screen::mapping_screen_ui
                .after(TelemetrySet::Derive)
                .after(screen_tabs_ui)
                .run_if(in_state(Screen::Mapping)),
        )
        .add_systems(
            Update,
            overview_ui
                .after(screen_tabs_ui)
                .run_if(in_state(Screen::Overview)),
        );
}

fn screen_tabs_ui(
    mut contexts: EguiContexts,
    screen: Res<State<Screen>>,
    mut next: ResMut<NextState<Screen>>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    egui::TopBottomPanel::top("screen_tabs").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for tab in Screen::iter() {
                if ui
                    .selectable_label(*screen.get() == tab, tab.to_string())
                    .clicked()
                    && *screen.get() != tab
                {
                    next.set(tab);
                }
            }
        });
    });
}

fn overview_ui(mut contexts: EguiContexts) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Line follower rover");
            ui.label("Open the Mapping tab to follow the live trajectory.");
        });
    });
}
