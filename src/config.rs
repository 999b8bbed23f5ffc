use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::detail::DEFAULT_DETAIL_BINS;
use crate::error::{Result, TraceError};
use crate::overview::{DEFAULT_MIN_SELECTION_PX, DEFAULT_OVERVIEW_BINS};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub view: ViewConfig,
    pub table: TableConfig,
    pub data: DataConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub overview_bins: usize,
    pub detail_bins: usize,
    pub overview_width: u32,
    pub overview_height: u32,
    pub min_selection_px: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub cell_width: u32,
    pub cell_height: u32,
    pub decimals: usize,
}

/// How raw samples are turned into displayed values
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Convert integer ADC samples to picoamperes on load
    pub in_pa: bool,
    pub calibration_offset: f64,
    pub calibration_scale: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub verbosity: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            overview_bins: DEFAULT_OVERVIEW_BINS,
            detail_bins: DEFAULT_DETAIL_BINS,
            overview_width: 500,
            overview_height: 100,
            min_selection_px: DEFAULT_MIN_SELECTION_PX,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            cell_width: 75,
            cell_height: 20,
            decimals: 4,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            in_pa: false,
            calibration_offset: 0.0,
            calibration_scale: 1.0,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            verbosity: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reject settings that would make rendering or pagination impossible
    pub fn validate(&self) -> Result<()> {
        let view = &self.view;
        if view.overview_bins == 0 || view.detail_bins == 0 {
            return Err(TraceError::InvalidParameter(format!(
                "bin counts must be at least 1 (overview {}, detail {})",
                view.overview_bins, view.detail_bins
            )));
        }
        if view.overview_width == 0 || view.overview_height == 0 {
            return Err(TraceError::InvalidParameter(format!(
                "overview surface must be at least 1x1 pixels, got {}x{}",
                view.overview_width, view.overview_height
            )));
        }
        if self.table.cell_width == 0 || self.table.cell_height == 0 {
            return Err(TraceError::InvalidParameter(format!(
                "table cells must be at least 1x1 pixels, got {}x{}",
                self.table.cell_width, self.table.cell_height
            )));
        }
        Ok(())
    }
}

/// Load configuration from file with layered fallbacks
pub fn load_config(config_path: Option<&Path>) -> std::result::Result<AppConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

    if let Some(path) = config_path {
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            return Err(ConfigError::Message(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    } else {
        let possible_paths = ["trace-view.toml", "config/trace-view.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
                break;
            }
        }
    }

    // e.g. RUSTY_TRACE_VIEW__DETAIL_BINS=2000
    builder = builder.add_source(
        Environment::with_prefix("RUSTY_TRACE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize::<AppConfig>()
}

/// Load configuration, falling back to defaults on any error
pub fn load_config_or_default(config_path: Option<&Path>) -> AppConfig {
    match load_config(config_path) {
        Ok(config) => {
            log::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            log::warn!("Failed to load config ({}), using defaults", e);
            AppConfig::default()
        }
    }
}
