//! Storage capacity projection.
//!
//! Estimates how many days remain until the database reaches a fixed
//! capacity ceiling. Growth comes from a [`GrowthModel`]: the size-based
//! heuristic by default, or a least-squares fit over caller-supplied size
//! samples when enough history exists.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::MonitorConfig;
use crate::rates::round2;

/// Heuristic growth as a fraction of the current size, per day.
const HEURISTIC_GROWTH_FRACTION: f64 = 0.01;
/// Lower bound for heuristic growth, MB/day.
const HEURISTIC_MIN_GROWTH_MB: f64 = 0.1;

// ============================================================
// Sentinel-aware values
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    Unavailable,
    Full,
}

/// A projected value or a sentinel standing in for it.
///
/// Serializes as the bare value or as the sentinel string.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measure<T> {
    Value(T),
    Sentinel(Sentinel),
}

impl<T> Measure<T> {
    pub fn unavailable() -> Self {
        Measure::Sentinel(Sentinel::Unavailable)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Measure::Value(v) => Some(v),
            Measure::Sentinel(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Measure::Sentinel(Sentinel::Unavailable))
    }
}

// ============================================================
// Growth models
// ============================================================

/// One historical observation of the database size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeSample {
    pub date: NaiveDate,
    pub size_mb: f64,
}

impl SizeSample {
    pub fn new(date: NaiveDate, size_mb: f64) -> Self {
        Self { date, size_mb }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GrowthModel {
    /// `max(size * 1%, 0.1)` MB/day.
    Heuristic,
    /// Fitted slope over historical samples.
    Regression { mb_per_day: f64 },
}

impl GrowthModel {
    /// Fits a growth rate to `samples`, falling back to the heuristic.
    ///
    /// The fit is used only when at least two samples span one day or more
    /// and the slope is positive; shrinking or flat history says nothing
    /// about when the ceiling is reached.
    pub fn from_history(samples: &[SizeSample]) -> Self {
        match least_squares_slope(samples) {
            Some(slope) if slope > 0.0 && slope.is_finite() => {
                debug!(samples = samples.len(), mb_per_day = slope, "growth fitted from history");
                GrowthModel::Regression { mb_per_day: slope }
            }
            _ => GrowthModel::Heuristic,
        }
    }

    /// Daily growth in MB for a database of `current_size_mb`.
    pub fn daily_growth_mb(&self, current_size_mb: f64) -> f64 {
        match self {
            GrowthModel::Heuristic => {
                (current_size_mb * HEURISTIC_GROWTH_FRACTION).max(HEURISTIC_MIN_GROWTH_MB)
            }
            GrowthModel::Regression { mb_per_day } => *mb_per_day,
        }
    }
}

/// Slope of size over days, `None` if the samples cannot define one.
fn least_squares_slope(samples: &[SizeSample]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let first = samples.iter().map(|s| s.date).min()?;
    let last = samples.iter().map(|s| s.date).max()?;
    if (last - first).num_days() < 1 {
        return None;
    }

    let n = samples.len() as f64;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| ((s.date - first).num_days() as f64, s.size_mb))
        .collect();
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in &points {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx == 0.0 {
        return None;
    }
    Some(sxy / sxx)
}

// ============================================================
// Projection
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StorageProjection {
    pub days_until_full: Measure<u64>,
    pub estimated_full_date: Measure<NaiveDate>,
    pub daily_growth_mb: Measure<f64>,
    pub remaining_space_mb: Measure<f64>,
    pub growth_model: GrowthModel,
}

impl StorageProjection {
    /// Every field replaced by the `"unavailable"` sentinel.
    pub fn unavailable(growth_model: GrowthModel) -> Self {
        Self {
            days_until_full: Measure::unavailable(),
            estimated_full_date: Measure::unavailable(),
            daily_growth_mb: Measure::unavailable(),
            remaining_space_mb: Measure::unavailable(),
            growth_model,
        }
    }
}

pub struct StorageProjector {
    max_capacity_mb: f64,
    model: GrowthModel,
}

impl StorageProjector {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            max_capacity_mb: config.max_capacity_mb,
            model: GrowthModel::Heuristic,
        }
    }

    pub fn with_growth_model(mut self, model: GrowthModel) -> Self {
        self.model = model;
        self
    }

    /// Projects when `current_size_mb` reaches the ceiling, counting from `today`.
    ///
    /// Never fails: an unknown size, nonsensical input or a date out of
    /// range yields [`StorageProjection::unavailable`].
    pub fn project(&self, current_size_mb: Option<f64>, today: NaiveDate) -> StorageProjection {
        let Some(size) = current_size_mb else {
            return StorageProjection::unavailable(self.model);
        };
        if !size.is_finite()
            || size < 0.0
            || !self.max_capacity_mb.is_finite()
            || self.max_capacity_mb <= 0.0
        {
            debug!(size, ceiling = self.max_capacity_mb, "projection input rejected");
            return StorageProjection::unavailable(self.model);
        }

        let growth = self.model.daily_growth_mb(size);
        let remaining = self.max_capacity_mb - size;

        if remaining <= 0.0 {
            return StorageProjection {
                days_until_full: Measure::Value(0),
                estimated_full_date: Measure::Sentinel(Sentinel::Full),
                daily_growth_mb: Measure::Value(round2(growth)),
                remaining_space_mb: Measure::Value(0.0),
                growth_model: self.model,
            };
        }
        if !growth.is_finite() || growth <= 0.0 {
            return StorageProjection::unavailable(self.model);
        }

        let days = (remaining / growth).round();
        if days > u32::MAX as f64 {
            return StorageProjection::unavailable(self.model);
        }
        let days = days as u64;
        let Some(date) = today.checked_add_days(Days::new(days)) else {
            return StorageProjection::unavailable(self.model);
        };

        StorageProjection {
            days_until_full: Measure::Value(days),
            estimated_full_date: Measure::Value(date),
            daily_growth_mb: Measure::Value(round2(growth)),
            remaining_space_mb: Measure::Value(round2(remaining)),
            growth_model: self.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn projector() -> StorageProjector {
        StorageProjector::new(&MonitorConfig::default())
    }

    #[test]
    fn heuristic_projection() {
        let p = projector().project(Some(100.0), date(2024, 1, 1));
        assert_eq!(p.daily_growth_mb, Measure::Value(1.0));
        assert_eq!(p.remaining_space_mb, Measure::Value(900.0));
        assert_eq!(p.days_until_full, Measure::Value(900));
        assert_eq!(p.estimated_full_date, Measure::Value(date(2026, 6, 19)));
    }

    #[test]
    fn small_database_uses_growth_floor() {
        let p = projector().project(Some(5.0), date(2024, 1, 1));
        assert_eq!(p.daily_growth_mb, Measure::Value(0.1));
        assert_eq!(p.days_until_full, Measure::Value(9950));
    }

    #[test]
    fn at_ceiling_is_full() {
        let p = projector().project(Some(1000.0), date(2024, 1, 1));
        assert_eq!(p.days_until_full, Measure::Value(0));
        assert_eq!(p.estimated_full_date, Measure::Sentinel(Sentinel::Full));
        assert_eq!(p.remaining_space_mb, Measure::Value(0.0));

        let p = projector().project(Some(1500.0), date(2024, 1, 1));
        assert_eq!(p.estimated_full_date, Measure::Sentinel(Sentinel::Full));
    }

    #[test]
    fn unknown_or_invalid_size_is_unavailable() {
        let today = date(2024, 1, 1);
        for size in [None, Some(-1.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let p = projector().project(size, today);
            assert!(p.days_until_full.is_unavailable());
            assert!(p.estimated_full_date.is_unavailable());
            assert!(p.daily_growth_mb.is_unavailable());
            assert!(p.remaining_space_mb.is_unavailable());
        }
    }

    #[test]
    fn date_overflow_is_unavailable() {
        let p = projector()
            .with_growth_model(GrowthModel::Regression { mb_per_day: 1e-9 })
            .project(Some(1.0), date(2024, 1, 1));
        assert!(p.days_until_full.is_unavailable());
    }

    #[test]
    fn regression_from_linear_history() {
        let samples = [
            SizeSample::new(date(2024, 1, 1), 100.0),
            SizeSample::new(date(2024, 1, 11), 150.0),
            SizeSample::new(date(2024, 1, 21), 200.0),
        ];
        let model = GrowthModel::from_history(&samples);
        assert_eq!(model, GrowthModel::Regression { mb_per_day: 5.0 });

        let p = projector()
            .with_growth_model(model)
            .project(Some(200.0), date(2024, 1, 21));
        assert_eq!(p.days_until_full, Measure::Value(160));
    }

    #[test]
    fn insufficient_history_falls_back_to_heuristic() {
        let d = date(2024, 1, 1);
        assert_eq!(GrowthModel::from_history(&[]), GrowthModel::Heuristic);
        assert_eq!(
            GrowthModel::from_history(&[SizeSample::new(d, 1.0)]),
            GrowthModel::Heuristic
        );
        // same day twice: no span
        assert_eq!(
            GrowthModel::from_history(&[SizeSample::new(d, 1.0), SizeSample::new(d, 9.0)]),
            GrowthModel::Heuristic
        );
        // shrinking
        assert_eq!(
            GrowthModel::from_history(&[
                SizeSample::new(d, 10.0),
                SizeSample::new(date(2024, 1, 5), 5.0),
            ]),
            GrowthModel::Heuristic
        );
    }

    #[test]
    fn sentinels_serialize_as_strings() {
        let p = projector().project(Some(1000.0), date(2024, 1, 1));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["estimated_full_date"], "full");
        assert_eq!(json["days_until_full"], 0);
        assert_eq!(json["growth_model"]["kind"], "heuristic");

        let json = serde_json::to_value(projector().project(None, date(2024, 1, 1))).unwrap();
        assert_eq!(json["days_until_full"], "unavailable");
        assert_eq!(json["remaining_space_mb"], "unavailable");

        let json = serde_json::to_value(projector().project(Some(100.0), date(2024, 1, 1))).unwrap();
        assert_eq!(json["estimated_full_date"], "2026-06-19");
    }
}
