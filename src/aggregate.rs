use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Binned representation of a signal slice, replaced wholesale on every recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Index of the first sample of each bin
    pub x: Vec<usize>,
    /// Median of each bin, NaN when the bin holds no value
    pub y: Vec<f64>,
    pub bin_size: usize,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn is_subsampled(&self) -> bool {
        self.bin_size > 1
    }

    pub fn has_gaps(&self) -> bool {
        self.y.iter().any(|v| v.is_nan())
    }

    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Runs of consecutive non-NaN points. Drawing each run as its own polyline
    /// leaves NaN bins as visible gaps instead of interpolating across them.
    pub fn segments(&self) -> Vec<Vec<(usize, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (x, y) in self.points() {
            if y.is_nan() {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            } else {
                current.push((x, y));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// NaN-skipping (min, max) of the bin values
    pub fn value_range(&self) -> Option<(f64, f64)> {
        nan_extent(&self.y)
    }

    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        if offset > 0 {
            self.x.iter_mut().for_each(|x| *x += offset);
        }
        self
    }
}

/// Bin size used to fit `len` samples into at most about `target_bins` bins
pub fn bin_size_for(len: usize, target_bins: usize) -> Result<usize> {
    if target_bins == 0 {
        return Err(TraceError::InvalidParameter(
            "target bin count must be at least 1".to_string(),
        ));
    }
    if len <= target_bins {
        Ok(1)
    } else {
        Ok((len / target_bins).max(1))
    }
}

/// Reduce `values` to median bins of `floor(len / target_bins)` samples each.
///
/// Inputs that already fit into `target_bins` are returned unchanged with a
/// bin size of 1. The last bin may be shorter than the others; its median is
/// taken over the remainder only.
///
/// # Examples
/// ```
/// use rusty_trace::aggregate::aggregate;
///
/// let values: Vec<f64> = (1..=10).map(f64::from).collect();
/// let result = aggregate(&values, 3).unwrap();
/// assert_eq!(result.bin_size, 3);
/// assert_eq!(result.x, vec![0, 3, 6, 9]);
/// assert_eq!(result.y, vec![2.0, 5.0, 8.0, 10.0]);
/// ```
pub fn aggregate(values: &[f64], target_bins: usize) -> Result<AggregationResult> {
    let bin_size = bin_size_for(values.len(), target_bins)?;
    if values.is_empty() {
        return Err(TraceError::EmptyInput("cannot aggregate an empty slice".to_string()));
    }
    Ok(aggregate_with_bin_size(values, bin_size))
}

/// Aggregate with an externally chosen bin size so several series share one bin grid
pub(crate) fn aggregate_with_bin_size(values: &[f64], bin_size: usize) -> AggregationResult {
    if bin_size <= 1 {
        return AggregationResult {
            x: (0..values.len()).collect(),
            y: values.to_vec(),
            bin_size: 1,
        };
    }

    let bins = values.len().div_ceil(bin_size);
    let mut x = Vec::with_capacity(bins);
    let mut y = Vec::with_capacity(bins);
    for (i, chunk) in values.chunks(bin_size).enumerate() {
        x.push(i * bin_size);
        y.push(nan_median(chunk));
    }
    trace!("Aggregated {} samples into {} bins of {}", values.len(), bins, bin_size);

    AggregationResult { x, y, bin_size }
}

/// Median of the non-NaN values, NaN if there are none
pub fn nan_median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(|a, b| a.total_cmp(b));
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    }
}

/// NaN-skipping (min, max), None if every value is NaN
pub fn nan_extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
