use bevy::prelude::*;
use bevy_egui::EguiContexts;
use egui::RichText;
use rovertrace_protocol::{ConnectionState, TelemetryRecord};

use super::trajectory_chart::{trajectory_chart, ChartCache, ChartStyle};
use crate::{
    constants::{
        ACCENT_COLOUR, CHART_MARGIN, ERROR_COLOUR, RESET_COLOUR, SENSOR_OFF_COLOUR,
        SENSOR_ON_COLOUR,
    },
    reset::{ResetCoordinator, ResetRequest},
    telemetry::{CurrentRecord, TelemetrySettings},
    util::{format_clock, format_timestamp},
};

pub(crate) fn mapping_screen_ui(
    mut contexts: EguiContexts,
    settings: Res<TelemetrySettings>,
    current: Res<CurrentRecord>,
    connection: Res<ConnectionState>,
    coordinator: Res<ResetCoordinator>,
    chart: Res<ChartCache>,
    mut requests: EventWriter<ResetRequest>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };
    let record = &current.0;

    egui::CentralPanel::default().show(ctx, |ui| match &*connection {
        ConnectionState::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label(RichText::new("Loading trajectory data...").size(18.0));
            });
        }
        ConnectionState::Error(message) => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(
                    RichText::new(format!("⚠ {}", message))
                        .color(ERROR_COLOUR)
                        .size(18.0)
                        .strong(),
                );
                ui.label(
                    RichText::new(format!("Last update: {}", format_clock(record.timestamp)))
                        .color(ERROR_COLOUR),
                );
            });
        }
        ConnectionState::Ready => {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| ui.heading("Trajectory map"));
                ui.add_space(8.0);
                readout(ui, record);

                let style = ChartStyle {
                    width: (ui.available_width() - CHART_MARGIN).max(CHART_MARGIN),
                    height: settings.chart_height,
                };
                ui.vertical_centered(|ui| trajectory_chart(ui, chart.dataset(), &style));

                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    let button = egui::Button::new(
                        RichText::new("RESET SYSTEM").strong().color(egui::Color32::WHITE),
                    )
                    .fill(RESET_COLOUR)
                    .min_size(egui::vec2(220.0, 36.0));
                    if ui
                        .add_enabled(!coordinator.is_pending(), button)
                        .clicked()
                    {
                        requests.send(ResetRequest::Open);
                    }
                });
            });
        }
    });

    if coordinator.is_confirming() {
        confirm_dialog(ctx, &mut requests);
    }
}

fn readout(ui: &mut egui::Ui, record: &TelemetryRecord) {
    ui.label(RichText::new("Current data").color(ACCENT_COLOUR).strong());
    egui::Grid::new("current_data")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            row(ui, "Position X", format!("{:.1} cm", record.position.x));
            row(ui, "Position Y", format!("{:.1} cm", record.position.y));
            row(ui, "Angle", format!("{:.1}°", record.position.angle));
            sensor_row(ui, "Left sensor", record.sensors.left);
            sensor_row(ui, "Right sensor", record.sensors.right);
            row(ui, "Distance", format!("{:.1} cm", record.sensors.distance));
            row(
                ui,
                "Temperature",
                format!("{:.1} °C", record.environment.temperature),
            );
            row(ui, "Humidity", format!("{:.1} %", record.environment.humidity));
        });

    ui.label(RichText::new("Last update").color(ACCENT_COLOUR).strong());
    ui.label(format_timestamp(record.timestamp));
}

fn row(ui: &mut egui::Ui, label: &str, value: String) {
    ui.label(label);
    ui.label(RichText::new(value).strong());
    ui.end_row();
}

fn sensor_row(ui: &mut egui::Ui, label: &str, detected: bool) {
    let (text, colour) = if detected {
        ("DETECTED", SENSOR_ON_COLOUR)
    } else {
        ("CLEAR", SENSOR_OFF_COLOUR)
    };
    ui.label(label);
    ui.label(RichText::new(text).color(colour).strong());
    ui.end_row();
}

/// Two-button gate in front of the destructive reset.
fn confirm_dialog(ctx: &egui::Context, requests: &mut EventWriter<ResetRequest>) {
    egui::Window::new("Reset system")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("Are you sure you want to delete all data and restart the run?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    requests.send(ResetRequest::Cancel);
                }
                let confirm = egui::Button::new(
                    RichText::new("Reset").color(egui::Color32::WHITE),
                )
                .fill(RESET_COLOUR);
                if ui.add(confirm).clicked() {
                    requests.send(ResetRequest::Confirm);
                }
            });
        });
}
