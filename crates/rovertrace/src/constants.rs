use egui::Color32;

/// Store path the rover publishes its latest record to.
pub const TELEMETRY_PATH: &str = "lastData";
/// A reset wipes the whole tree, not just the latest record.
pub const STORE_ROOT: &str = "/";

pub const DEFAULT_CHART_HEIGHT: f32 = 220.0;
/// Horizontal room left around the chart.
pub const CHART_MARGIN: f32 = 40.0;

pub const HISTORY_COLOUR: Color32 = Color32::from_rgb(255, 255, 0);
pub const HIGHLIGHT_COLOUR: Color32 = Color32::from_rgb(0, 255, 255);
pub const BASELINE_COLOUR: Color32 = Color32::from_rgb(0, 255, 0);
pub const ACCENT_COLOUR: Color32 = Color32::from_rgb(0, 255, 0);
pub const ERROR_COLOUR: Color32 = Color32::from_rgb(255, 85, 85);
pub const RESET_COLOUR: Color32 = Color32::from_rgb(255, 59, 48);
pub const SENSOR_ON_COLOUR: Color32 = Color32::from_rgb(76, 175, 80);
pub const SENSOR_OFF_COLOUR: Color32 = Color32::from_rgb(244, 67, 54);
