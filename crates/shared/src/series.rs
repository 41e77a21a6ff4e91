//! Close-price normalization shared by both chart layouts.

use serde::{Deserialize, Serialize};

use crate::TabularRecord;

/// Linear mapping from the close-price domain onto a fixed spatial range.
///
/// `scale` is clamped to `0.0` whenever `spatial_range / (max - min)` would not
/// be finite: a flat series, or a series with no usable values. Every offset
/// produced by [`NormalizedSeries::offset`] is therefore finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSeries {
    pub min_close: f64,
    pub max_close: f64,
    pub scale: f64,
}

impl NormalizedSeries {
    /// Build from raw close values; non-finite values are ignored.
    pub fn from_closes(closes: impl IntoIterator<Item = f64>, spatial_range: f64) -> Self {
        let (min, max) = closes
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            return Self {
                min_close: 0.0,
                max_close: 0.0,
                scale: 0.0,
            };
        }

        let scale = spatial_range / (max - min);
        Self {
            min_close: min,
            max_close: max,
            scale: if scale.is_finite() { scale } else { 0.0 },
        }
    }

    /// Range over rows whose open and close both parse (bar layout).
    pub fn over_valid_rows(rows: &[TabularRecord], spatial_range: f64) -> Self {
        Self::from_closes(
            rows.iter().filter_map(|r| r.prices()).map(|(_, close)| close),
            spatial_range,
        )
    }

    /// Range over every row's close value, regardless of the open cell
    /// (line layout).
    pub fn over_all_closes(rows: &[TabularRecord], spatial_range: f64) -> Self {
        Self::from_closes(rows.iter().filter_map(|r| r.close_value()), spatial_range)
    }

    /// Distance of `close` above the series minimum, in spatial units.
    pub fn offset(&self, close: f64) -> f64 {
        let v = (close - self.min_close) * self.scale;
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }

    /// True when the series collapses to a single value (or has none).
    pub fn is_degenerate(&self) -> bool {
        self.scale == 0.0
    }
}

/// Dataset statistics served by the data host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub rows: usize,
    pub valid_rows: usize,
    pub min_close: Option<f64>,
    pub max_close: Option<f64>,
}

impl SeriesSummary {
    pub fn from_records(rows: &[TabularRecord]) -> Self {
        let valid_rows = rows.iter().filter(|r| r.prices().is_some()).count();
        let series = NormalizedSeries::over_valid_rows(rows, 1.0);
        let (min_close, max_close) = if valid_rows > 0 {
            (Some(series.min_close), Some(series.max_close))
        } else {
            (None, None)
        };
        Self {
            rows: rows.len(),
            valid_rows,
            min_close,
            max_close,
        }
    }
}
