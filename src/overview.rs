//! Coarse full-range view used to pick the detail zoom.
//!
//! The overview always aggregates the entire data range into a fixed number of
//! bins. It also tracks the pointer drag that selects a new zoom and the last
//! committed zoom, which it draws as two greyed-out flanks.

use log::{debug, info};

use crate::aggregate::{aggregate_with_bin_size, bin_size_for, nan_extent, AggregationResult};
use crate::coords::{data_to_pixel, pixel_to_data, AxisMap};
use crate::error::{Result, TraceError};
use crate::store::SeriesStore;
use crate::types::{PixelRect, PixelSelection, SeriesGap, SeriesId, ViewMode, ZoomWindow};
use crate::visibility::VisibilityModel;

pub const DEFAULT_OVERVIEW_BINS: usize = 1000;

/// Narrower drags than this are treated as a click and re-centered
pub const DEFAULT_MIN_SELECTION_PX: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverviewState {
    Idle,
    Selecting(PixelSelection),
    Committed(ZoomWindow),
}

/// Aggregated full-range data of one visible series
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewSeries {
    pub id: SeriesId,
    pub color: &'static str,
    pub data: AggregationResult,
}

/// Pixel-space line of one series, broken into segments at NaN bins
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub id: SeriesId,
    pub color: &'static str,
    pub segments: Vec<Vec<(f64, f64)>>,
}

/// Zoom decorations drawn on top of the overview lines
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverviewOverlay {
    /// Grey regions left and right of the committed zoom
    pub shaded: Vec<PixelRect>,
    /// Dashed rectangle of the drag in progress
    pub selection: Option<PixelRect>,
}

#[derive(Debug, Clone)]
pub struct OverviewController {
    bins: usize,
    min_selection_px: i32,
    width: u32,
    height: u32,
    series: Vec<OverviewSeries>,
    gaps: Vec<SeriesGap>,
    n_max: usize,
    bin_size: usize,
    y_lims: Option<(f64, f64)>,
    drag: Option<PixelSelection>,
    committed: Option<ZoomWindow>,
}

impl OverviewController {
    pub fn new(bins: usize, width: u32, height: u32) -> Result<Self> {
        if bins == 0 {
            return Err(TraceError::InvalidParameter(
                "overview bin count must be at least 1".to_string(),
            ));
        }
        check_surface(width, height)?;
        Ok(Self {
            bins,
            min_selection_px: DEFAULT_MIN_SELECTION_PX,
            width,
            height,
            series: Vec::new(),
            gaps: Vec::new(),
            n_max: 0,
            bin_size: 1,
            y_lims: None,
            drag: None,
            committed: None,
        })
    }

    pub fn with_min_selection(mut self, min_selection_px: i32) -> Self {
        self.min_selection_px = min_selection_px.max(1);
        self
    }

    /// Recompute the coarse aggregation of every visible series.
    ///
    /// Called on load, visibility toggles and raw/normalized switches. The
    /// result does not depend on the current zoom.
    pub fn rebuild(&mut self, store: &SeriesStore, visibility: &VisibilityModel, mode: ViewMode) {
        let n_max = store.max_len();
        // bins is never zero, checked in new()
        let bin_size = bin_size_for(n_max, self.bins).unwrap_or(1);

        let mut series = Vec::new();
        let mut gaps = Vec::new();
        let mut y_lims: Option<(f64, f64)> = None;

        for s in store.iter().filter(|s| visibility.is_visible(s.id().as_str())) {
            let values = s.values(mode);
            if values.is_empty() {
                gaps.push(SeriesGap {
                    id: s.id().clone(),
                    reason: "series contains no samples".to_string(),
                });
                continue;
            }
            if let Some((lo, hi)) = nan_extent(values) {
                y_lims = Some(match y_lims {
                    None => (lo, hi),
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                });
            }
            series.push(OverviewSeries {
                id: s.id().clone(),
                color: s.color(),
                data: aggregate_with_bin_size(values, bin_size),
            });
        }

        debug!(
            "Overview rebuilt: {} series, N_max {}, bin size {}",
            series.len(),
            n_max,
            bin_size
        );

        self.series = series;
        self.gaps = gaps;
        self.n_max = n_max;
        self.bin_size = bin_size;
        self.y_lims = y_lims;
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_surface(width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn state(&self) -> OverviewState {
        match (self.drag, self.committed) {
            (Some(selection), _) => OverviewState::Selecting(selection),
            (None, Some(zoom)) => OverviewState::Committed(zoom),
            (None, None) => OverviewState::Idle,
        }
    }

    pub fn pointer_down(&mut self, px: i32) {
        self.drag = Some(PixelSelection::new(px));
    }

    /// Track the drag extent. Returns true if a redraw is needed.
    pub fn pointer_move(&mut self, px: i32) -> bool {
        match self.drag.as_mut() {
            Some(selection) => {
                selection.current_px = px;
                true
            }
            None => false,
        }
    }

    /// Finish a drag. Returns the new zoom, or None if no drag was in progress.
    pub fn pointer_up(&mut self, px: i32) -> Result<Option<ZoomWindow>> {
        match self.drag.take() {
            Some(selection) => self.commit_pixels(selection.anchor_px, px).map(Some),
            None => Ok(None),
        }
    }

    /// Commit a pixel span as the new zoom.
    ///
    /// A zero-width span grows by one pixel on each side, spans narrower than
    /// the minimum selection shrink to two pixels around their midpoint,
    /// rounded down to a whole pixel. The result is clamped to the overview
    /// surface. Any `i32` pixel is accepted.
    pub fn commit_pixels(&mut self, p1: i32, p2: i32) -> Result<ZoomWindow> {
        let (mut lo, mut hi) = (i64::from(p1.min(p2)), i64::from(p1.max(p2)));
        if hi == lo {
            lo -= 1;
            hi += 1;
        } else if hi - lo < i64::from(self.min_selection_px) {
            let mid = lo + (hi - lo) / 2;
            lo = mid - 1;
            hi = mid + 1;
        }

        let width = self.width as f64;
        let lo = (lo as f64).clamp(0.0, width);
        let hi = (hi as f64).clamp(0.0, width);

        let zoom = ZoomWindow::new(
            pixel_to_data(lo, 0.0, 1.0, 0.0, width),
            pixel_to_data(hi, 0.0, 1.0, 0.0, width),
        )?;
        self.apply(zoom);
        info!(
            "Zoom committed from pixels {}..{} -> ratios {:.4}..{:.4}",
            lo,
            hi,
            zoom.start_ratio(),
            zoom.end_ratio()
        );
        Ok(zoom)
    }

    /// Commit a zoom given as data indices, as typed into the numeric entry
    pub fn set_zoom(&mut self, x1: f64, x2: f64) -> Result<ZoomWindow> {
        if self.n_max == 0 {
            return Err(TraceError::EmptyInput("no data loaded to zoom into".to_string()));
        }
        let x_max = self.n_max as f64;
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let x1 = x1.clamp(0.0, x_max);
        let x2 = x2.clamp(0.0, x_max);

        let zoom = ZoomWindow::new(
            data_to_pixel(x1, 0.0, x_max, 0.0, 1.0),
            data_to_pixel(x2, 0.0, x_max, 0.0, 1.0),
        )?;
        self.apply(zoom);
        info!("Zoom committed from values {}..{}", x1, x2);
        Ok(zoom)
    }

    /// Drop any drag and committed zoom, returning the full range
    pub fn reset(&mut self) -> ZoomWindow {
        self.drag = None;
        self.committed = None;
        ZoomWindow::full()
    }

    fn apply(&mut self, zoom: ZoomWindow) {
        self.drag = None;
        self.committed = if zoom.is_full() { None } else { Some(zoom) };
    }

    /// Data index under the pointer
    pub fn hover_index(&self, px: i32) -> Option<usize> {
        if self.n_max == 0 {
            return None;
        }
        let x = px.max(0) as f64;
        let index = (x / self.width as f64 * self.n_max as f64).floor() as usize;
        Some(index.min(self.n_max - 1))
    }

    pub fn x_axis(&self) -> AxisMap {
        AxisMap::horizontal((0.0, self.n_max as f64), self.width as f64)
    }

    pub fn y_axis(&self) -> Option<AxisMap> {
        self.y_lims
            .map(|lims| AxisMap::vertical(lims, self.height as f64))
    }

    /// Series lines in overview pixel coordinates
    pub fn polylines(&self) -> Vec<Polyline> {
        let Some(y_axis) = self.y_axis() else {
            return Vec::new();
        };
        let x_axis = self.x_axis();

        self.series
            .iter()
            .map(|s| Polyline {
                id: s.id.clone(),
                color: s.color,
                segments: s
                    .data
                    .segments()
                    .into_iter()
                    .map(|segment| {
                        segment
                            .into_iter()
                            .map(|(x, y)| (x_axis.to_pixel(x as f64), y_axis.to_pixel(y)))
                            .collect()
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn overlay(&self) -> OverviewOverlay {
        let width = self.width as f64;
        let height = self.height as f64;
        let mut overlay = OverviewOverlay::default();

        if let Some(zoom) = self.committed {
            let start = zoom.start_ratio() * width;
            let end = zoom.end_ratio() * width;
            overlay.shaded.push(PixelRect { x0: 0.0, y0: 0.0, x1: start, y1: height });
            overlay.shaded.push(PixelRect { x0: end, y0: 0.0, x1: width, y1: height });
        }

        if let Some(selection) = self.drag {
            let (lo, hi) = selection.bounds();
            overlay.selection = Some(PixelRect {
                x0: lo as f64,
                y0: 0.0,
                x1: hi as f64,
                y1: height,
            });
        }

        overlay
    }

    pub fn series(&self) -> &[OverviewSeries] {
        &self.series
    }

    pub fn gaps(&self) -> &[SeriesGap] {
        &self.gaps
    }

    pub fn committed(&self) -> Option<ZoomWindow> {
        self.committed
    }

    pub fn selection(&self) -> Option<PixelSelection> {
        self.drag
    }

    pub fn x_lims(&self) -> (usize, usize) {
        (0, self.n_max)
    }

    pub fn y_lims(&self) -> Option<(f64, f64)> {
        self.y_lims
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn check_surface(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TraceError::InvalidParameter(format!(
            "overview surface must be at least 1x1 pixels, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn overview_with(data: Vec<(&str, Vec<f64>)>) -> (OverviewController, SeriesStore) {
        let store = SeriesStore::from_series(data).unwrap();
        let mut overview = OverviewController::new(DEFAULT_OVERVIEW_BINS, 500, 100).unwrap();
        overview.rebuild(&store, &VisibilityModel::new(), ViewMode::Raw);
        (overview, store)
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_click_expands_to_two_pixels() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);

        overview.pointer_down(50);
        assert!(matches!(overview.state(), OverviewState::Selecting(_)));
        let zoom = overview.pointer_up(50).unwrap().unwrap();

        assert!(approx(zoom.start_ratio(), 0.098));
        assert!(approx(zoom.end_ratio(), 0.102));
        assert_eq!(overview.state(), OverviewState::Committed(zoom));
    }

    #[test]
    fn test_narrow_drag_recenters_on_midpoint() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);
        let zoom = overview.commit_pixels(105, 100).unwrap();
        // midpoint 102 -> 101..103
        assert!(approx(zoom.start_ratio(), 101.0 / 500.0));
        assert!(approx(zoom.end_ratio(), 103.0 / 500.0));
    }

    #[test]
    fn test_drag_clamps_to_surface() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);

        let zoom = overview.commit_pixels(-20, 30).unwrap();
        assert_eq!(zoom.start_ratio(), 0.0);
        assert!(approx(zoom.end_ratio(), 0.06));

        let zoom = overview.commit_pixels(480, 900).unwrap();
        assert!(approx(zoom.start_ratio(), 0.96));
        assert_eq!(zoom.end_ratio(), 1.0);

        let zoom = overview.commit_pixels(0, 0).unwrap();
        assert_eq!(zoom.start_ratio(), 0.0);
        assert!(approx(zoom.end_ratio(), 0.002));
    }

    #[test]
    fn test_commit_extreme_pixels_clamps() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);

        assert!(overview.commit_pixels(i32::MIN, i32::MAX).unwrap().is_full());

        let zoom = overview.commit_pixels(i32::MIN, i32::MIN).unwrap();
        assert_eq!((zoom.start_ratio(), zoom.end_ratio()), (0.0, 0.0));

        let zoom = overview.commit_pixels(i32::MAX, i32::MAX).unwrap();
        assert_eq!((zoom.start_ratio(), zoom.end_ratio()), (1.0, 1.0));

        let zoom = overview.commit_pixels(i32::MAX - 3, i32::MAX).unwrap();
        assert_eq!((zoom.start_ratio(), zoom.end_ratio()), (1.0, 1.0));

        overview.pointer_down(i32::MIN + 1);
        let zoom = overview.pointer_up(i32::MIN + 4).unwrap().unwrap();
        assert_eq!((zoom.start_ratio(), zoom.end_ratio()), (0.0, 0.0));
    }

    #[test]
    fn test_full_width_drag_returns_to_idle() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);
        let zoom = overview.commit_pixels(0, 500).unwrap();
        assert!(zoom.is_full());
        assert_eq!(overview.state(), OverviewState::Idle);
    }

    #[test]
    fn test_pointer_move_without_drag_is_ignored() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);
        assert!(!overview.pointer_move(10));
        assert_eq!(overview.pointer_up(10).unwrap(), None);

        overview.pointer_down(10);
        assert!(overview.pointer_move(200));
        assert_eq!(overview.selection().unwrap().bounds(), (10, 200));
        // no zoom until release
        assert_eq!(overview.committed(), None);
    }

    #[test]
    fn test_set_zoom_orders_and_clamps_values() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);

        let zoom = overview.set_zoom(750.0, 250.0).unwrap();
        assert_eq!(zoom.start_ratio(), 0.25);
        assert_eq!(zoom.end_ratio(), 0.75);

        let zoom = overview.set_zoom(-100.0, 5000.0).unwrap();
        assert!(zoom.is_full());
    }

    #[test]
    fn test_set_zoom_without_data() {
        let mut overview = OverviewController::new(10, 100, 50).unwrap();
        assert!(matches!(
            overview.set_zoom(1.0, 2.0),
            Err(TraceError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_reset_returns_full_range() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);
        overview.set_zoom(100.0, 200.0).unwrap();
        overview.pointer_down(3);

        assert!(overview.reset().is_full());
        assert_eq!(overview.state(), OverviewState::Idle);
        assert_eq!(overview.overlay(), OverviewOverlay::default());
    }

    #[test]
    fn test_rebuild_is_coarse_and_full_range() {
        let (overview, _) = overview_with(vec![("a", ramp(10_000)), ("b", ramp(2_500))]);

        assert_eq!(overview.bin_size(), 10);
        assert_eq!(overview.series()[0].data.len(), 1000);
        // shorter series shares the bin grid and is not padded
        assert_eq!(overview.series()[1].data.len(), 250);
        assert_eq!(overview.series()[1].data.bin_size, 10);
        assert_eq!(overview.x_lims(), (0, 10_000));
        assert_eq!(overview.y_lims(), Some((0.0, 9999.0)));
    }

    #[test]
    fn test_rebuild_skips_hidden_and_empty() {
        let store =
            SeriesStore::from_series(vec![("a", ramp(100)), ("b", vec![-5.0]), ("c", vec![])])
                .unwrap();
        let mut visibility = VisibilityModel::new();
        visibility.set(&SeriesId::from("b"), false);

        let mut overview = OverviewController::new(10, 100, 50).unwrap();
        overview.rebuild(&store, &visibility, ViewMode::Raw);

        let ids: Vec<&str> = overview.series().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(overview.gaps().len(), 1);
        assert_eq!(overview.gaps()[0].id.as_str(), "c");
        assert_eq!(overview.y_lims(), Some((0.0, 99.0)));
    }

    #[test]
    fn test_hover_index() {
        let (overview, _) = overview_with(vec![("a", ramp(1000))]);
        assert_eq!(overview.hover_index(250), Some(500));
        assert_eq!(overview.hover_index(-10), Some(0));
        assert_eq!(overview.hover_index(9999), Some(999));
    }

    #[test]
    fn test_polylines_invert_y_and_break_at_nan() {
        let (overview, _) =
            overview_with(vec![("a", vec![0.0, 10.0, f64::NAN, 5.0, 0.0])]);
        let lines = overview.polylines();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].segments.len(), 2);
        assert_eq!(lines[0].segments[0], vec![(0.0, 100.0), (100.0, 0.0)]);
        assert_eq!(lines[0].segments[1], vec![(300.0, 50.0), (400.0, 100.0)]);
    }

    #[test]
    fn test_overlay_follows_resize() {
        let (mut overview, _) = overview_with(vec![("a", ramp(1000))]);
        overview.set_zoom(250.0, 500.0).unwrap();

        let overlay = overview.overlay();
        assert_eq!(overlay.shaded[0].x1, 125.0);
        assert_eq!(overlay.shaded[1].x0, 250.0);

        overview.resize(1000, 100).unwrap();
        let overlay = overview.overlay();
        assert_eq!(overlay.shaded[0].x1, 250.0);
        assert_eq!(overlay.shaded[1].x0, 500.0);
        assert_eq!(overlay.shaded[1].width(), 500.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(OverviewController::new(0, 100, 100).is_err());
        assert!(OverviewController::new(10, 0, 100).is_err());
        let mut overview = OverviewController::new(10, 100, 100).unwrap();
        assert!(overview.resize(100, 0).is_err());
        assert_eq!(overview.width(), 100);
    }
}
