use bevy::{app::PluginGroupBuilder, prelude::*};

pub mod constants;
pub mod demo;
pub mod reset;
pub mod screen;
pub mod store;
pub mod subscription;
pub mod telemetry;
pub mod ui;
pub mod util;

pub mod reexport {
    pub use bevy_egui;
    pub use rovertrace_protocol;
}

pub struct RoverTracePlugin {
    pub with_ui: bool,
    /// Allow the simulated rover when `ROVERTRACE_DEMO` asks for it.
    pub demo: bool,
}

impl Default for RoverTracePlugin {
    fn default() -> Self {
        Self {
            with_ui: true,
            demo: true,
        }
    }
}

impl PluginGroup for RoverTracePlugin {
    fn build(self) -> PluginGroupBuilder {
        let mut group = PluginGroupBuilder::start::<Self>();

        // settings and the store must exist before the screen mounts
        group = group
            .add(telemetry::plugin)
            .add(store::plugin)
            .add(screen::plugin);

        if self.with_ui {
            group = group.add(ui::plugin);
        }
        if self.demo {
            group = group.add(demo::plugin);
        }

        group
    }
}
