//! The coordinator that owns the committed zoom and drives every render.
//!
//! `SignalView` is the only place where the [`ZoomWindow`] lives. Every
//! mutation follows the same order: compute the new state, store it,
//! re-render the detail frame, then publish events. Listeners therefore never
//! observe a zoom that the detail frame does not reflect yet.

use log::{info, warn};
use ndarray::Array2;

use crate::config::{AppConfig, TableConfig};
use crate::detail::{y_axis_label, DetailFrame, DetailRenderer};
use crate::error::{Result, TraceError};
use crate::events::{EventBus, ViewEvent, ViewListener};
use crate::overview::OverviewController;
use crate::paginator::{page_capacity, Cell, Page, Paginator, TableGeometry};
use crate::store::SeriesStore;
use crate::types::{SeriesId, ViewMode, ZoomWindow};
use crate::visibility::VisibilityModel;

/// Table capacity used until the collaborator reports a viewport
pub const DEFAULT_VIEWPORT: TableGeometry = TableGeometry { rows: 10, cols: 10 };

/// The raw array currently browsed as a table
#[derive(Debug, Clone)]
pub struct TableView {
    id: SeriesId,
    paginator: Paginator,
}

impl TableView {
    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn current_page(&self) -> Page {
        self.paginator.current_page()
    }
}

#[derive(Debug)]
pub struct SignalView {
    store: SeriesStore,
    visibility: VisibilityModel,
    mode: ViewMode,
    zoom: ZoomWindow,
    overview: OverviewController,
    renderer: DetailRenderer,
    detail: Option<DetailFrame>,
    table: Option<TableView>,
    viewport: TableGeometry,
    table_config: TableConfig,
    in_pa: bool,
    events: EventBus,
}

impl SignalView {
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let view = &config.view;
        let overview =
            OverviewController::new(view.overview_bins, view.overview_width, view.overview_height)?
                .with_min_selection(view.min_selection_px);

        Ok(Self {
            store: SeriesStore::new(),
            visibility: VisibilityModel::new(),
            mode: ViewMode::Raw,
            zoom: ZoomWindow::full(),
            overview,
            renderer: DetailRenderer::new(view.detail_bins)?,
            detail: None,
            table: None,
            viewport: DEFAULT_VIEWPORT,
            table_config: config.table.clone(),
            in_pa: config.data.in_pa,
            events: EventBus::default(),
        })
    }

    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: ViewListener + Send + 'static,
    {
        self.events.subscribe(Box::new(listener));
    }

    /// Replace the dataset.
    ///
    /// The new store is built completely before anything else changes; on
    /// error the previous dataset, zoom and renders stay as they were. A
    /// successful load shows every series, resets the zoom and closes the table.
    pub fn load_series<I, K>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<SeriesId>,
    {
        self.store.load(data)?;
        self.visibility.show_all();
        self.table = None;
        self.overview.rebuild(&self.store, &self.visibility, self.mode);
        let zoom = self.overview.reset();
        self.apply_zoom(zoom);
        Ok(())
    }

    /// Show or hide one series. Unknown ids are reported and change nothing.
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> Result<()> {
        let Ok(series) = self.store.series(id) else {
            warn!("Ignoring visibility change for unknown series '{}'", id);
            return Err(TraceError::UnknownSeries(id.to_string()));
        };
        let id = series.id().clone();

        if self.visibility.set(&id, visible) {
            info!("Series '{}' {}", id, if visible { "shown" } else { "hidden" });
            self.overview.rebuild(&self.store, &self.visibility, self.mode);
            self.render_detail();
        }
        Ok(())
    }

    pub fn set_view_mode(&mut self, normalized: bool) {
        let mode = ViewMode::from_normalized(normalized);
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.overview.rebuild(&self.store, &self.visibility, self.mode);
        self.render_detail();
    }

    pub fn commit_zoom_pixels(&mut self, p1: i32, p2: i32) -> Result<ZoomWindow> {
        self.ensure_loaded()?;
        let zoom = self.overview.commit_pixels(p1, p2)?;
        self.apply_zoom(zoom);
        Ok(zoom)
    }

    pub fn commit_zoom_values(&mut self, v1: f64, v2: f64) -> Result<ZoomWindow> {
        let zoom = self.overview.set_zoom(v1, v2)?;
        self.apply_zoom(zoom);
        Ok(zoom)
    }

    pub fn reset_zoom(&mut self) -> ZoomWindow {
        let zoom = self.overview.reset();
        self.apply_zoom(zoom);
        zoom
    }

    pub fn pointer_down(&mut self, px: i32) {
        self.overview.pointer_down(px);
    }

    /// Returns true if the overview needs a redraw
    pub fn pointer_move(&mut self, px: i32) -> bool {
        self.overview.pointer_move(px)
    }

    pub fn pointer_up(&mut self, px: i32) -> Result<Option<ZoomWindow>> {
        let zoom = self.overview.pointer_up(px)?;
        if let Some(zoom) = zoom {
            self.apply_zoom(zoom);
        }
        Ok(zoom)
    }

    pub fn resize_overview(&mut self, width: u32, height: u32) -> Result<()> {
        self.overview.resize(width, height)
    }

    pub fn hover_index(&self, px: i32) -> Option<usize> {
        self.overview.hover_index(px)
    }

    /// Start browsing the raw values of `id` as a table, at page 0
    pub fn open_table(&mut self, id: &str) -> Result<Page> {
        let Ok(series) = self.store.series(id) else {
            warn!("Cannot open table for unknown series '{}'", id);
            return Err(TraceError::UnknownSeries(id.to_string()));
        };
        let paginator = Paginator::new(series.len(), self.viewport.rows, self.viewport.cols)?;
        let table = TableView {
            id: series.id().clone(),
            paginator,
        };
        let page = table.current_page();
        info!(
            "Table opened for '{}': {} pages of {} samples",
            table.id,
            table.paginator.page_count(),
            table.paginator.bin_size()
        );
        self.table = Some(table);
        self.events.publish(ViewEvent::PageChanged(page));
        Ok(page)
    }

    /// Set the table capacity. Invalid sizes are rejected and leave the
    /// current pagination untouched.
    pub fn configure_viewport(&mut self, rows: usize, cols: usize) -> Result<()> {
        page_capacity(rows, cols)?;
        if let Some(table) = self.table.as_mut() {
            table.paginator.configure(rows, cols)?;
        }
        self.viewport = TableGeometry { rows, cols };

        if let Some(page) = self.current_page() {
            self.events.publish(ViewEvent::PageChanged(page));
        }
        Ok(())
    }

    /// Set the table capacity from the viewport size in pixels
    pub fn configure_viewport_pixels(&mut self, width: u32, height: u32) -> Result<TableGeometry> {
        let geometry = TableGeometry::from_pixels(
            width,
            height,
            self.table_config.cell_width,
            self.table_config.cell_height,
        );
        self.configure_viewport(geometry.rows, geometry.cols)?;
        Ok(geometry)
    }

    pub fn get_page(&self, index: usize) -> Result<Page> {
        self.open_table_ref()?.paginator.get_page(index)
    }

    pub fn seek_page(&mut self, index: usize) -> Result<Page> {
        let page = self.open_table_mut()?.paginator.seek(index);
        self.events.publish(ViewEvent::PageChanged(page));
        Ok(page)
    }

    pub fn step_page(&mut self, delta: isize) -> Result<Page> {
        let page = self.open_table_mut()?.paginator.step(delta);
        self.events.publish(ViewEvent::PageChanged(page));
        Ok(page)
    }

    pub fn current_page(&self) -> Option<Page> {
        self.table.as_ref().map(TableView::current_page)
    }

    /// Grid of raw values behind `page` of the open table
    pub fn page_cells(&self, page: &Page) -> Result<Array2<Cell>> {
        let table = self.open_table_ref()?;
        let values = self.store.series(table.id.as_str())?.raw();
        page.cells(values)
    }

    fn open_table_ref(&self) -> Result<&TableView> {
        self.table
            .as_ref()
            .ok_or_else(|| TraceError::EmptyInput("no table is open".to_string()))
    }

    fn open_table_mut(&mut self) -> Result<&mut TableView> {
        self.table
            .as_mut()
            .ok_or_else(|| TraceError::EmptyInput("no table is open".to_string()))
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.store.is_empty() {
            return Err(TraceError::EmptyInput("no data loaded to zoom into".to_string()));
        }
        Ok(())
    }

    fn apply_zoom(&mut self, zoom: ZoomWindow) {
        self.zoom = zoom;
        self.render_detail();
        self.events.publish(ViewEvent::ZoomChanged(zoom));
    }

    fn render_detail(&mut self) {
        let frame = self
            .renderer
            .render(&self.store, self.zoom, &self.visibility, self.mode);

        let bin_size = frame.bin_size;
        let notice = frame.fidelity_notice();
        let gaps = frame.gaps.clone();
        self.detail = Some(frame);

        for gap in gaps {
            self.events.publish(ViewEvent::SeriesSkipped {
                id: gap.id,
                reason: gap.reason,
            });
        }
        self.events.publish(ViewEvent::DetailRendered { bin_size });
        self.events.publish(ViewEvent::Status(notice));
    }

    pub fn zoom(&self) -> ZoomWindow {
        self.zoom
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn overview(&self) -> &OverviewController {
        &self.overview
    }

    pub fn detail(&self) -> Option<&DetailFrame> {
        self.detail.as_ref()
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn visibility(&self) -> &VisibilityModel {
        &self.visibility
    }

    pub fn viewport(&self) -> TableGeometry {
        self.viewport
    }

    pub fn decimals(&self) -> usize {
        self.table_config.decimals
    }

    pub fn y_axis_label(&self) -> String {
        y_axis_label(self.mode, self.in_pa)
    }
}
