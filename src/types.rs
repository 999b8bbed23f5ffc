use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Range;

use crate::error::{Result, TraceError};

/// Opaque identifier of one loaded series (a read id, a channel name, a file stem)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SeriesId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SeriesId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which variant of the stored data feeds the overview and detail renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Raw,
    Normalized,
}

impl ViewMode {
    pub fn from_normalized(normalized: bool) -> Self {
        if normalized {
            Self::Normalized
        } else {
            Self::Raw
        }
    }

    pub fn is_normalized(self) -> bool {
        matches!(self, Self::Normalized)
    }
}

/// Committed data-space interval shown in the detail view.
///
/// Ratios are relative to the longest loaded series (`N_max`), never to an
/// individual series, which keeps the zoom synchronized across series of
/// different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWindow {
    start_ratio: f64,
    end_ratio: f64,
}

impl Default for ZoomWindow {
    fn default() -> Self {
        Self::full()
    }
}

impl ZoomWindow {
    pub fn full() -> Self {
        Self {
            start_ratio: 0.0,
            end_ratio: 1.0,
        }
    }

    /// Build a window from two ratios in either order, clamped into `[0, 1]`
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(TraceError::InvalidParameter(format!(
                "zoom ratios must be finite, got ({a}, {b})"
            )));
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self {
            start_ratio: lo.clamp(0.0, 1.0),
            end_ratio: hi.clamp(0.0, 1.0),
        })
    }

    pub fn start_ratio(&self) -> f64 {
        self.start_ratio
    }

    pub fn end_ratio(&self) -> f64 {
        self.end_ratio
    }

    pub fn is_full(&self) -> bool {
        self.start_ratio == 0.0 && self.end_ratio == 1.0
    }

    /// Data index range `[floor(n * start), ceil(n * end))` for a series set of length `n`.
    ///
    /// A window narrower than one sample still yields one sample so a committed
    /// zoom never renders as an empty plot.
    pub fn index_range(&self, n: usize) -> Range<usize> {
        if n == 0 {
            return 0..0;
        }
        let start = ((n as f64 * self.start_ratio).floor() as usize).min(n - 1);
        let end = ((n as f64 * self.end_ratio).ceil() as usize).min(n);
        start..end.max(start + 1)
    }
}

/// Transient drag state on the overview, in local widget pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSelection {
    pub anchor_px: i32,
    pub current_px: i32,
}

impl PixelSelection {
    pub fn new(anchor_px: i32) -> Self {
        Self {
            anchor_px,
            current_px: anchor_px,
        }
    }

    /// Sorted `(lo, hi)` pixel bounds
    pub fn bounds(&self) -> (i32, i32) {
        (
            self.anchor_px.min(self.current_px),
            self.anchor_px.max(self.current_px),
        )
    }
}

/// A series left out of a render, with the reason shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesGap {
    pub id: SeriesId,
    pub reason: String,
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}
