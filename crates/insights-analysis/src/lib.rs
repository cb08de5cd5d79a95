//! Cross-series statistics over normalized series
//!
//! This crate consumes the aligned series produced by `insights-engine` and
//! computes the statistics shown alongside them.
//!
//! # Overview
//!
//! - **Row-wise statistics** ([`rowwise::RowwiseStatistics`]): P10/P50/P90
//!   across series at every x of the union x-domain
//! - **Defined points** ([`rowwise::DefinedPointsCount`]): number of series
//!   with a valid observation at every x
//! - **Summaries** ([`summary::SeriesSummary`], [`summary::CombinedSummary`]):
//!   percentiles and mean over the valid values of one series, or of all
//!   series pooled together
//! - **Output** ([`output::ProcessedData`]): serializable view of a processed
//!   table, free of non-finite floats
//!
//! Every statistic reads the series through the [`SeriesRows`] trait, so the
//! same code runs on engine-side [`NormalizedSeries`] and on the
//! [`SeriesData`](output::SeriesData) records handed to callers.
//!
//! # Examples
//!
//! ```
//! use insights_analysis::rowwise::RowwiseStatistics;
//! use insights_engine::series::NormalizedSeries;
//!
//! let a = NormalizedSeries::from_parts(vec![5, 6], vec![Some(10.0), None], vec![true, false]);
//! let b = NormalizedSeries::from_parts(vec![5], vec![Some(20.0)], vec![true]);
//!
//! let stats = RowwiseStatistics::from_series([&a, &b]);
//! assert_eq!(stats.x(), &[5, 6]);
//! assert_eq!(stats.p50(), &[Some(15.0), None]);
//! ```

use insights_engine::{FaultClass, series::NormalizedSeries, table::AlignedSeries};

pub mod output;
pub mod rowwise;
pub mod summary;

/// No valid observation was available for a requested statistic.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("No valid data points for {scope}")]
pub struct NoValidDataError {
    pub scope: String,
}

impl NoValidDataError {
    #[must_use]
    pub fn fault_class(&self) -> FaultClass {
        FaultClass::Unprocessable
    }
}

/// Read access to the `(x, y, valid)` rows of a series.
pub trait SeriesRows {
    fn x(&self) -> &[i64];
    fn y(&self) -> &[Option<f64>];
    fn valid(&self) -> &[bool];

    /// Iterates over the rows that carry a valid, finite measurement.
    fn valid_points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.x()
            .iter()
            .zip(self.y())
            .zip(self.valid())
            .filter_map(|((x, y), valid)| match (valid, y) {
                (true, Some(y)) if y.is_finite() => Some((*x, *y)),
                _ => None,
            })
    }
}

impl SeriesRows for NormalizedSeries {
    fn x(&self) -> &[i64] {
        NormalizedSeries::x(self)
    }

    fn y(&self) -> &[Option<f64>] {
        NormalizedSeries::y(self)
    }

    fn valid(&self) -> &[bool] {
        NormalizedSeries::valid(self)
    }
}

impl SeriesRows for AlignedSeries {
    fn x(&self) -> &[i64] {
        self.data.x()
    }

    fn y(&self) -> &[Option<f64>] {
        self.data.y()
    }

    fn valid(&self) -> &[bool] {
        self.data.valid()
    }
}
