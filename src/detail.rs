use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;

use crate::aggregate::{aggregate_with_bin_size, bin_size_for, AggregationResult};
use crate::error::{Result, TraceError};
use crate::store::SeriesStore;
use crate::types::{SeriesGap, SeriesId, ViewMode, ZoomWindow};
use crate::visibility::VisibilityModel;

pub const DEFAULT_DETAIL_BINS: usize = 5000;

pub const MESSAGE_NO_SUBSETTING: &str =
    "No subsetting performed - each point corresponds to one measurement.";

/// One complete detail render. Never patched, always replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailFrame {
    pub zoom: ZoomWindow,
    pub mode: ViewMode,
    /// First data index of the window
    pub start_index: usize,
    /// One past the last data index of the window
    pub end_index: usize,
    /// Samples per plotted point, shared by all series of the frame
    pub bin_size: usize,
    /// Visible series in display order
    pub series: IndexMap<SeriesId, AggregationResult>,
    pub gaps: Vec<SeriesGap>,
}

impl DetailFrame {
    pub fn get(&self, id: &str) -> Option<&AggregationResult> {
        self.series.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn fidelity_notice(&self) -> String {
        fidelity_notice(self.bin_size)
    }
}

pub fn fidelity_notice(bin_size: usize) -> String {
    if bin_size <= 1 {
        MESSAGE_NO_SUBSETTING.to_string()
    } else {
        format!("Subsetting active - one point corresponds to {bin_size} measurements.")
    }
}

pub fn y_axis_label(mode: ViewMode, in_pa: bool) -> String {
    let prefix = if mode.is_normalized() { "Norm. " } else { "" };
    let suffix = if in_pa { " [pA]" } else { "" };
    format!("{prefix}Signal intensity{suffix}")
}

/// Re-aggregates the zoomed slice of each visible series to a bounded point count
#[derive(Debug, Clone)]
pub struct DetailRenderer {
    target_bins: usize,
}

impl Default for DetailRenderer {
    fn default() -> Self {
        Self {
            target_bins: DEFAULT_DETAIL_BINS,
        }
    }
}

impl DetailRenderer {
    pub fn new(target_bins: usize) -> Result<Self> {
        if target_bins == 0 {
            return Err(TraceError::InvalidParameter(
                "detail bin count must be at least 1".to_string(),
            ));
        }
        Ok(Self { target_bins })
    }

    pub fn target_bins(&self) -> usize {
        self.target_bins
    }

    /// Render the zoom window of every visible series.
    ///
    /// The window is resolved against the longest series, and one bin size is
    /// chosen for the whole window so all series share the same bin grid.
    /// Hidden series are skipped before any slicing or aggregation. Series
    /// with no samples inside the window are reported as gaps.
    pub fn render(
        &self,
        store: &SeriesStore,
        zoom: ZoomWindow,
        visibility: &VisibilityModel,
        mode: ViewMode,
    ) -> DetailFrame {
        let window = zoom.index_range(store.max_len());
        // target_bins is never zero, checked in new()
        let bin_size = bin_size_for(window.len(), self.target_bins).unwrap_or(1);

        let mut series = IndexMap::new();
        let mut gaps = Vec::new();

        for s in store.iter().filter(|s| visibility.is_visible(s.id().as_str())) {
            let values = s.values(mode);
            let start = window.start.min(values.len());
            let end = window.end.min(values.len());

            if start >= end {
                let reason = if values.is_empty() {
                    "series contains no samples".to_string()
                } else {
                    format!(
                        "series ends at index {} before the zoom window starts",
                        values.len()
                    )
                };
                warn!("Skipping '{}': {}", s.id(), reason);
                gaps.push(SeriesGap {
                    id: s.id().clone(),
                    reason,
                });
                continue;
            }

            let result = aggregate_with_bin_size(&values[start..end], bin_size).shifted(start);
            series.insert(s.id().clone(), result);
        }

        debug!(
            "Detail render {}..{} ({} series, bin size {})",
            window.start,
            window.end,
            series.len(),
            bin_size
        );

        DetailFrame {
            zoom,
            mode,
            start_index: window.start,
            end_index: window.end,
            bin_size,
            series,
            gaps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SeriesStore {
        SeriesStore::from_series(vec![
            ("read_A", (0..20_000).map(|i| (i % 100) as f64).collect::<Vec<_>>()),
            ("read_B", (0..8_000).map(|i| i as f64).collect::<Vec<_>>()),
        ])
        .unwrap()
    }

    #[test]
    fn test_hidden_series_excluded() {
        let store = store();
        let mut visibility = VisibilityModel::new();
        visibility.set(&SeriesId::from("read_A"), false);

        let frame = DetailRenderer::default().render(
            &store,
            ZoomWindow::full(),
            &visibility,
            ViewMode::Raw,
        );

        assert!(frame.get("read_A").is_none());
        assert!(frame.get("read_B").is_some());
        assert_eq!(frame.series.len(), 1);
        assert!(frame.gaps.is_empty());
    }

    #[test]
    fn test_render_is_idempotent() {
        let store = store();
        let renderer = DetailRenderer::new(1000).unwrap();
        let zoom = ZoomWindow::new(0.1, 0.7).unwrap();
        let visibility = VisibilityModel::new();

        let first = renderer.render(&store, zoom, &visibility, ViewMode::Normalized);
        let second = renderer.render(&store, zoom, &visibility, ViewMode::Normalized);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zoomed_indices_are_absolute() {
        let store = store();
        let renderer = DetailRenderer::new(100).unwrap();
        let zoom = ZoomWindow::new(0.25, 0.5).unwrap();

        let frame = renderer.render(&store, zoom, &VisibilityModel::new(), ViewMode::Raw);

        assert_eq!(frame.start_index, 5000);
        assert_eq!(frame.end_index, 10_000);
        assert_eq!(frame.bin_size, 50);

        let a = frame.get("read_A").unwrap();
        assert_eq!(a.x.first(), Some(&5000));
        assert_eq!(a.len(), 100);

        // read_B stops at 8000, same grid, fewer bins
        let b = frame.get("read_B").unwrap();
        assert_eq!(b.x.first(), Some(&5000));
        assert_eq!(b.x.last(), Some(&7950));
        assert_eq!(b.len(), 60);
        assert_eq!(b.y[0], 5024.5);
    }

    #[test]
    fn test_short_series_outside_window_is_a_gap() {
        let store = store();
        let zoom = ZoomWindow::new(0.9, 1.0).unwrap();
        let frame =
            DetailRenderer::default().render(&store, zoom, &VisibilityModel::new(), ViewMode::Raw);

        assert!(frame.get("read_B").is_none());
        assert_eq!(frame.gaps.len(), 1);
        assert_eq!(frame.gaps[0].id.as_str(), "read_B");
        assert_eq!(frame.bin_size, 1);
    }

    #[test]
    fn test_render_cost_is_bounded() {
        let big: Vec<f64> = (0..1_000_000).map(|i| (i as f64).sin()).collect();
        let store = SeriesStore::from_series(vec![("big", big)]).unwrap();
        let frame = DetailRenderer::default().render(
            &store,
            ZoomWindow::full(),
            &VisibilityModel::new(),
            ViewMode::Raw,
        );

        assert_eq!(frame.bin_size, 200);
        assert_eq!(frame.get("big").unwrap().len(), DEFAULT_DETAIL_BINS);
    }

    #[test]
    fn test_fidelity_notice_and_label() {
        assert_eq!(fidelity_notice(1), MESSAGE_NO_SUBSETTING);
        assert_eq!(
            fidelity_notice(200),
            "Subsetting active - one point corresponds to 200 measurements."
        );
        assert_eq!(y_axis_label(ViewMode::Raw, false), "Signal intensity");
        assert_eq!(y_axis_label(ViewMode::Normalized, true), "Norm. Signal intensity [pA]");
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(matches!(
            DetailRenderer::new(0),
            Err(TraceError::InvalidParameter(_))
        ));
    }
}
