use log::{debug, info, warn};
use std::collections::HashMap;

use crate::error::{Result, TraceError};
use crate::types::{SeriesId, ViewMode};

/// Display colors handed out to series in load order
pub const COLOR_CYCLE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// One immutable signal together with its z-scored variant
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    id: SeriesId,
    raw: Vec<f64>,
    normalized: Vec<f64>,
    color: &'static str,
}

impl Series {
    fn new(id: SeriesId, raw: Vec<f64>, color: &'static str) -> Self {
        let normalized = normalize(&raw);
        Self {
            id,
            raw,
            normalized,
            color,
        }
    }

    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn normalized(&self) -> &[f64] {
        &self.normalized
    }

    pub fn values(&self, mode: ViewMode) -> &[f64] {
        match mode {
            ViewMode::Raw => &self.raw,
            ViewMode::Normalized => &self.normalized,
        }
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Owner of all series of the loaded dataset.
///
/// Series are kept longest first, which is also the display order. Loading
/// builds a complete new store before replacing the old one, so readers never
/// observe a half-loaded dataset.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: Vec<Series>,
    index: HashMap<SeriesId, usize>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(id, raw values)` pairs
    pub fn from_series<I, K>(data: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<SeriesId>,
    {
        let mut entries: Vec<(SeriesId, Vec<f64>)> =
            data.into_iter().map(|(id, values)| (id.into(), values)).collect();

        if entries.is_empty() {
            return Err(TraceError::EmptyInput("dataset contains no series".to_string()));
        }

        // stable: equal lengths keep their input order
        entries.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut series = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for (position, (id, raw)) in entries.into_iter().enumerate() {
            if index.contains_key(&id) {
                return Err(TraceError::InvalidParameter(format!(
                    "duplicate series id '{id}'"
                )));
            }
            if raw.is_empty() {
                warn!("Series '{}' is empty and will be skipped when rendering", id);
            }
            debug!("Series '{}': {} samples", id, raw.len());
            let color = COLOR_CYCLE[position % COLOR_CYCLE.len()];
            index.insert(id.clone(), position);
            series.push(Series::new(id, raw, color));
        }

        Ok(Self { series, index })
    }

    /// Replace the whole dataset. On error the previous dataset is kept.
    pub fn load<I, K>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<SeriesId>,
    {
        let next = Self::from_series(data)?;
        info!(
            "Loaded {} series (longest {} samples)",
            next.len(),
            next.max_len()
        );
        *self = next;
        Ok(())
    }

    pub fn get(&self, id: &str, normalized: bool) -> Result<&[f64]> {
        Ok(self.series(id)?.values(ViewMode::from_normalized(normalized)))
    }

    pub fn series(&self, id: &str) -> Result<&Series> {
        self.index
            .get(id)
            .map(|&i| &self.series[i])
            .ok_or_else(|| TraceError::UnknownSeries(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.series.iter().map(|s| &s.id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Length of the longest series (`N_max`), the reference for zoom ratios
    pub fn max_len(&self) -> usize {
        self.series.first().map(Series::len).unwrap_or(0)
    }
}

/// Z-score with NaN-skipping mean and population standard deviation.
///
/// Returns all zeros when the deviation is zero or not finite.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (count, sum) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    if count == 0 {
        return vec![0.0; values.len()];
    }

    let mean = sum / count as f64;
    let variance = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    let std = variance.sqrt();

    if std == 0.0 || !std.is_finite() || !mean.is_finite() {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v - mean) / std).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> SeriesStore {
        SeriesStore::from_series(vec![
            ("short", vec![1.0, 2.0, 3.0]),
            ("long", vec![0.0; 10]),
            ("mid", vec![5.0, 5.0, 5.0, 5.0, 5.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_orders_longest_first_and_assigns_colors() {
        let store = sample_store();
        let ids: Vec<&str> = store.ids().map(SeriesId::as_str).collect();
        assert_eq!(ids, vec!["long", "mid", "short"]);
        assert_eq!(store.series("long").unwrap().color(), COLOR_CYCLE[0]);
        assert_eq!(store.series("short").unwrap().color(), COLOR_CYCLE[2]);
        assert_eq!(store.max_len(), 10);
    }

    #[test]
    fn test_get_raw_and_normalized() {
        let store = sample_store();
        assert_eq!(store.get("short", false).unwrap(), &[1.0, 2.0, 3.0]);

        let norm = store.get("short", true).unwrap();
        let expected = 1.0 / (2.0f64 / 3.0).sqrt();
        assert!((norm[0] + expected).abs() < 1e-12);
        assert!(norm[1].abs() < 1e-12);
        assert!((norm[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_normalizes_to_zero() {
        let store = sample_store();
        assert_eq!(store.get("mid", true).unwrap(), &[0.0; 5]);
    }

    #[test]
    fn test_normalize_keeps_nan_positions() {
        let norm = normalize(&[1.0, f64::NAN, 3.0]);
        assert_eq!(norm[0], -1.0);
        assert!(norm[1].is_nan());
        assert_eq!(norm[2], 1.0);
        assert_eq!(normalize(&[f64::NAN, f64::NAN]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_unknown_series() {
        let store = sample_store();
        assert!(matches!(
            store.get("missing", false),
            Err(TraceError::UnknownSeries(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_failed_load_keeps_previous_dataset() {
        let mut store = sample_store();
        let empty: Vec<(&str, Vec<f64>)> = vec![];
        assert!(matches!(store.load(empty), Err(TraceError::EmptyInput(_))));
        assert_eq!(store.len(), 3);

        let duplicate = vec![("a", vec![1.0]), ("a", vec![2.0])];
        assert!(store.load(duplicate).is_err());
        assert!(store.contains("long"));

        store.load(vec![("fresh", vec![1.0, 2.0])]).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.contains("long"));
    }

    #[test]
    fn test_empty_series_is_kept() {
        let store = SeriesStore::from_series(vec![("a", vec![1.0]), ("b", vec![])]).unwrap();
        assert!(store.series("b").unwrap().is_empty());
        assert!(store.get("b", true).unwrap().is_empty());
    }
}
