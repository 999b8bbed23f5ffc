pub mod aggregate;
pub mod config;
pub mod coords;
pub mod detail;
pub mod error;
pub mod events;
pub mod overview;
pub mod paginator;
pub mod plotting;
pub mod store;
pub mod types;
pub mod utils;
pub mod view;
pub mod visibility;

pub use aggregate::{aggregate, AggregationResult};
pub use config::{load_config, load_config_or_default, AppConfig};
pub use coords::{data_to_pixel, pixel_to_data, AxisMap};
pub use detail::{DetailFrame, DetailRenderer};
pub use error::{Result, TraceError};
pub use events::{ViewEvent, ViewListener};
pub use overview::{OverviewController, OverviewState};
pub use paginator::{Cell, Page, Paginator, TableGeometry};
pub use plotting::{plot_frame, plot_series};
pub use store::{Series, SeriesStore};
pub use types::{PixelSelection, SeriesGap, SeriesId, ViewMode, ZoomWindow};
pub use view::SignalView;
pub use visibility::VisibilityModel;
