use bevy::log::{LogPlugin, DEFAULT_FILTER};
use bevy::prelude::*;
use eyre::Result;

use rovertrace::{util, RoverTracePlugin};

const EXTRA_LOG_FILTER: [&str; 2] = ["wgpu=error", "naga=warn"];

fn main() -> Result<()> {
    util::initialise()?;

    let primary_window = Window {
        mode: bevy::window::WindowMode::Windowed,
        title: "Rover Trace".to_string(),
        resizable: true,
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    let mut filter = vec![DEFAULT_FILTER];
    filter.extend(EXTRA_LOG_FILTER);

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(primary_window),
                    ..default()
                })
                .set(LogPlugin {
                    filter: filter.join(","),
                    ..default()
                }),
        )
        .add_plugins(RoverTracePlugin::default())
        .run();

    Ok(())
}
