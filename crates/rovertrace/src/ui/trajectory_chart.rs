use bevy::prelude::*;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use rovertrace_protocol::{project, PlotDataset, Position, TrajectoryBuffer};

use crate::{
    constants::{BASELINE_COLOUR, HIGHLIGHT_COLOUR, HISTORY_COLOUR},
    telemetry::CurrentRecord,
};

/// Last projected dataset, rebuilt only when its inputs change.
#[derive(Resource, Debug, Clone)]
pub struct ChartCache {
    revision: Option<u64>,
    current: Position,
    dataset: PlotDataset,
}

impl Default for ChartCache {
    fn default() -> Self {
        Self {
            revision: None,
            current: Position::default(),
            dataset: project(&[], Position::default()),
        }
    }
}

impl ChartCache {
    pub fn dataset(&self) -> &PlotDataset {
        &self.dataset
    }

    /// Re-project if the trail or the live point moved. Returns whether it did.
    pub fn refresh(&mut self, trajectory: &TrajectoryBuffer, current: Position) -> bool {
        if self.revision == Some(trajectory.revision()) && self.current == current {
            return false;
        }
        self.dataset = project(trajectory.snapshot(), current);
        self.revision = Some(trajectory.revision());
        self.current = current;
        true
    }
}

pub(crate) fn refresh_chart_cache(
    trajectory: Res<TrajectoryBuffer>,
    current: Res<CurrentRecord>,
    mut cache: ResMut<ChartCache>,
) {
    let live = current.0.trajectory_point();
    // skip the write so change detection stays quiet
    if cache.revision == Some(trajectory.revision()) && cache.current == live {
        return;
    }
    cache.refresh(&trajectory, live);
}

/// Static look of the chart.
pub struct ChartStyle {
    pub width: f32,
    pub height: f32,
}

pub fn trajectory_chart(ui: &mut egui::Ui, dataset: &PlotDataset, style: &ChartStyle) {
    Plot::new("trajectory_chart")
        .width(style.width)
        .height(style.height)
        .legend(Legend::default())
        .x_axis_label("Point")
        .y_axis_label("Y (cm)")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(series_points(&dataset.history))
                    .color(HISTORY_COLOUR)
                    .width(2.0)
                    .name("history"),
            );
            plot_ui.points(
                Points::new(series_points(&dataset.history))
                    .color(HISTORY_COLOUR)
                    .radius(2.0),
            );
            plot_ui.points(
                Points::new(series_points(&dataset.highlight))
                    .color(HIGHLIGHT_COLOUR)
                    .radius(5.0)
                    .name("latest"),
            );
            plot_ui.line(
                Line::new(series_points(&dataset.baseline))
                    .color(BASELINE_COLOUR)
                    .width(2.0)
                    .name("baseline"),
            );
        });
}

/// Index-keyed points, skipping gaps.
fn series_points(series: &[Option<f64>]) -> PlotPoints {
    series
        .iter()
        .enumerate()
        .filter_map(|(index, value)| value.map(|y| [index as f64, y]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_only_when_inputs_change() {
        let mut cache = ChartCache::default();
        let mut trajectory = TrajectoryBuffer::default();
        trajectory.append(Position::new(0.0, 1.0));

        assert!(cache.refresh(&trajectory, Position::new(0.0, 1.0)));
        assert!(!cache.refresh(&trajectory, Position::new(0.0, 1.0)));
        assert_eq!(cache.dataset().highlight, vec![Some(1.0)]);

        trajectory.append(Position::new(0.0, 2.0));
        assert!(cache.refresh(&trajectory, Position::new(0.0, 2.0)));
        assert_eq!(cache.dataset().highlight, vec![None, Some(2.0)]);
    }

    #[test]
    fn gaps_are_not_plotted() {
        let points = series_points(&[None, Some(3.0), None, Some(4.0)]);
        let points: Vec<_> = points.points().iter().map(|p| [p.x, p.y]).collect();
        assert_eq!(points, vec![[1.0, 3.0], [3.0, 4.0]]);
    }
}
