use crate::telemetry::Position;

/// Three parallel, equally long series fed to the trajectory chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotDataset {
    /// `y` of every retained position.
    pub history: Vec<Option<f64>>,
    /// Empty except for the last slot, which holds the live `y`.
    pub highlight: Vec<Option<f64>>,
    /// Constant zero reference line, drawn without markers.
    pub baseline: Vec<Option<f64>>,
}

impl PlotDataset {
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Build the chart series for `history` with `current` as the live point.
///
/// An empty history yields a single zero in every series so the chart always
/// has valid geometry; `current` is ignored in that case.
pub fn project(history: &[Position], current: Position) -> PlotDataset {
    if history.is_empty() {
        return PlotDataset {
            history: vec![Some(0.0)],
            highlight: vec![Some(0.0)],
            baseline: vec![Some(0.0)],
        };
    }

    let len = history.len();
    let mut highlight = vec![None; len];
    highlight[len - 1] = Some(current.y);

    PlotDataset {
        history: history.iter().map(|point| Some(point.y)).collect(),
        highlight,
        baseline: vec![Some(0.0); len],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_degenerates_to_single_zero() {
        let dataset = project(&[], Position::new(4.0, 9.0));
        assert_eq!(dataset.history, vec![Some(0.0)]);
        assert_eq!(dataset.highlight, vec![Some(0.0)]);
        assert_eq!(dataset.baseline, vec![Some(0.0)]);
    }

    #[test]
    fn highlight_only_marks_the_live_point() {
        let history: Vec<_> = (0..5).map(|i| Position::new(i as f64, i as f64)).collect();
        let dataset = project(&history, Position::new(0.0, 7.5));

        assert_eq!(dataset.highlight, vec![None, None, None, None, Some(7.5)]);
        assert_eq!(
            dataset.history,
            vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
        assert_eq!(dataset.baseline, vec![Some(0.0); 5]);
    }

    #[test]
    fn series_share_the_history_length() {
        let history: Vec<_> = (0..200).map(|i| Position::new(0.0, i as f64)).collect();
        let dataset = project(&history, Position::new(0.0, 1.0));
        assert_eq!(dataset.len(), 200);
        assert_eq!(dataset.highlight.len(), 200);
        assert_eq!(dataset.baseline.len(), 200);
    }

    #[test]
    fn projection_is_deterministic() {
        let history = [Position::new(1.0, 2.0), Position::new(3.0, 4.0)];
        let current = Position::new(3.0, 4.5);
        assert_eq!(project(&history, current), project(&history, current));
    }
}
