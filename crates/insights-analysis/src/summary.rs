//! Whole-series summaries
//!
//! A summary pools every valid value of one series (or of several series) and
//! reports P10/P50/P90, the range, the mean and the number of values pooled. Unlike the
//! row-wise statistics, x plays no role here.

use insights_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};
use serde::{Serialize, Serializer};

use crate::{NoValidDataError, SeriesRows};

fn finite_or_null<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Some(*value)
        .filter(|v| v.is_finite())
        .serialize(serializer)
}

/// Percentiles, range and mean of a set of valid values.
///
/// Every float is finite when built from finite values; anything else
/// serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    #[serde(serialize_with = "finite_or_null")]
    pub p10: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub p50: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub p90: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub min: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub max: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub mean: f64,
    pub count: usize,
}

impl SeriesSummary {
    /// Summarizes the valid values of one series.
    pub fn from_series<S>(series: &S) -> Result<Self, NoValidDataError>
    where
        S: SeriesRows + ?Sized,
    {
        Self::from_values(series.valid_points().map(|(_, y)| y), "statistics calculation")
    }

    fn from_values<I>(values: I, scope: &str) -> Result<Self, NoValidDataError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let Some(stats) = DescriptiveStats::from_sorted(&values) else {
            return Err(NoValidDataError {
                scope: scope.to_owned(),
            });
        };
        let percentiles = Percentiles::from_sorted(&values, &[10.0, 50.0, 90.0]);
        let [p10, p50, p90] = [10.0, 50.0, 90.0].map(|p| percentiles.get(p).unwrap_or(f64::NAN));
        Ok(Self {
            p10,
            p50,
            p90,
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            count: stats.count,
        })
    }
}

/// Summary of the valid values of several series pooled together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedSummary {
    #[serde(flatten)]
    pub summary: SeriesSummary,
    /// Number of non-null values across all series, valid or not.
    pub total_points: usize,
}

impl CombinedSummary {
    pub fn from_series<'a, I, S>(series: I) -> Result<Self, NoValidDataError>
    where
        I: IntoIterator<Item = &'a S>,
        S: SeriesRows + ?Sized + 'a,
    {
        let mut total_points = 0;
        let mut values = vec![];
        for series in series {
            total_points += series.y().iter().flatten().count();
            values.extend(series.valid_points().map(|(_, y)| y));
        }
        let summary = SeriesSummary::from_values(values, "combined statistics")?;
        tracing::debug!(
            total_points,
            valid_points = summary.count,
            "computed combined summary"
        );
        Ok(Self {
            summary,
            total_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use insights_engine::series::NormalizedSeries;

    use super::*;

    fn series(y: &[Option<f64>]) -> NormalizedSeries {
        let x = (0..).take(y.len()).collect();
        let valid = y.iter().map(Option::is_some).collect();
        NormalizedSeries::from_parts(x, y.to_vec(), valid)
    }

    #[test]
    fn test_series_summary() {
        let s = series(&[Some(40.0), None, Some(0.0), Some(20.0), Some(10.0), Some(30.0)]);
        let summary = SeriesSummary::from_series(&s).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.p50, 20.0);
        assert_eq!(summary.mean, 20.0);
        assert_eq!((summary.min, summary.max), (0.0, 40.0));
        assert!((summary.p10 - 4.0).abs() < 1e-9);
        assert!((summary.p90 - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_summary_near_float_limits() {
        let s = series(&[Some(-1.7e308), Some(1.7e308)]);
        let summary = SeriesSummary::from_series(&s).unwrap();
        assert_eq!(summary.p50, 0.0);
        assert_eq!(summary.mean, 0.0);
        for value in [summary.p10, summary.p90, summary.min, summary.max] {
            assert!(value.is_finite());
        }

        let s = series(&[Some(1.7e308), Some(1.7e308), Some(1.6e308)]);
        let summary = SeriesSummary::from_series(&s).unwrap();
        assert!(summary.mean.is_finite());
        assert!(summary.p10.is_finite());
    }

    #[test]
    fn test_series_summary_serializes_non_finite_as_null() {
        let summary = SeriesSummary {
            p10: f64::NEG_INFINITY,
            p50: 1.0,
            p90: f64::INFINITY,
            min: 1.0,
            max: 1.0,
            mean: f64::NAN,
            count: 1,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert!(json["p10"].is_null());
        assert!(json["p90"].is_null());
        assert!(json["mean"].is_null());
        assert_eq!(json["p50"], 1.0);
    }

    #[test]
    fn test_series_summary_without_valid_values() {
        let s = NormalizedSeries::from_parts(vec![1, 2], vec![Some(3.0), None], vec![false, false]);
        let err = SeriesSummary::from_series(&s).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No valid data points for statistics calculation"
        );
        assert!(err.fault_class().is_unprocessable());
    }

    #[test]
    fn test_combined_summary() {
        let a = series(&[Some(1.0), Some(2.0)]);
        let b = NormalizedSeries::from_parts(vec![0, 1], vec![Some(0.0), None], vec![false, false]);
        let c = series(&[Some(3.0)]);
        let combined = CombinedSummary::from_series([&a, &b, &c]).unwrap();
        // the invalid zero still counts as a point
        assert_eq!(combined.total_points, 4);
        assert_eq!(combined.summary.count, 3);
        assert_eq!(combined.summary.p50, 2.0);
    }

    #[test]
    fn test_combined_summary_empty() {
        let err = CombinedSummary::from_series::<_, NormalizedSeries>([]).unwrap_err();
        assert_eq!(err.scope, "combined statistics");
    }

    #[test]
    fn test_combined_summary_serializes_flat() {
        let a = series(&[Some(2.0)]);
        let combined = CombinedSummary::from_series([&a]).unwrap();
        let json = serde_json::to_value(combined).unwrap();
        assert_eq!(json["p50"], 2.0);
        assert_eq!(json["count"], 1);
        assert_eq!(json["total_points"], 1);
    }
}
