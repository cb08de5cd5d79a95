//! Serializable view of a processed table
//!
//! [`ProcessedData`] is what leaves the process: the padded series, the
//! row-wise statistics and the defined-point counts of the visible series.
//! Every float passes through [`Sanitize`] on the way out, so serialized
//! output never carries `NaN` or infinities.

use insights_engine::{
    table::{AlignedSeries, AlignedTable},
    unit::UnitTag,
};
use serde::{Deserialize, Serialize};

use crate::{
    SeriesRows,
    rowwise::{DefinedPointsCount, RowwiseStatistics, Statistic},
};

/// Replaces non-finite floats with `None`, recursively.
pub trait Sanitize {
    #[must_use]
    fn sanitize(self) -> Self;
}

impl Sanitize for Option<f64> {
    fn sanitize(self) -> Self {
        self.filter(|v| v.is_finite())
    }
}

macro_rules! impl_sanitize_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sanitize for $ty {
                fn sanitize(self) -> Self {
                    self
                }
            }
        )*
    };
}

impl_sanitize_identity!(i64, usize, bool, String, UnitTag);

impl<T> Sanitize for Vec<T>
where
    T: Sanitize,
{
    fn sanitize(self) -> Self {
        self.into_iter().map(Sanitize::sanitize).collect()
    }
}

impl<A, B> Sanitize for (A, B)
where
    A: Sanitize,
    B: Sanitize,
{
    fn sanitize(self) -> Self {
        (self.0.sanitize(), self.1.sanitize())
    }
}

fn default_visible() -> bool {
    true
}

/// One series as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub name: String,
    pub axis_name: String,
    pub x_unit: UnitTag,
    pub y_unit: String,
    pub x_values: Vec<i64>,
    pub y_values: Vec<Option<f64>>,
    /// Whether each row takes part in statistics.
    pub count_stat: Vec<bool>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl From<&AlignedSeries> for SeriesData {
    fn from(series: &AlignedSeries) -> Self {
        Self {
            name: series.name.clone(),
            axis_name: series.axis_label.clone(),
            x_unit: series.x_unit,
            y_unit: series.y_unit.clone(),
            x_values: series.data.x().to_vec(),
            y_values: series.data.y().to_vec(),
            count_stat: series.data.valid().to_vec(),
            visible: true,
        }
    }
}

impl Sanitize for SeriesData {
    fn sanitize(self) -> Self {
        Self {
            y_values: self.y_values.sanitize(),
            ..self
        }
    }
}

impl SeriesRows for SeriesData {
    fn x(&self) -> &[i64] {
        &self.x_values
    }

    fn y(&self) -> &[Option<f64>] {
        &self.y_values
    }

    fn valid(&self) -> &[bool] {
        &self.count_stat
    }
}

/// Row-wise percentiles as `(x, y)` sequence pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsData {
    pub p10: (Vec<i64>, Vec<Option<f64>>),
    pub p50: (Vec<i64>, Vec<Option<f64>>),
    pub p90: (Vec<i64>, Vec<Option<f64>>),
}

impl From<&RowwiseStatistics> for StatisticsData {
    fn from(stats: &RowwiseStatistics) -> Self {
        let pair = |statistic| {
            let (x, y) = stats.get(statistic);
            (x.to_vec(), y.to_vec())
        };
        Self {
            p10: pair(Statistic::P10),
            p50: pair(Statistic::P50),
            p90: pair(Statistic::P90),
        }
    }
}

impl Sanitize for StatisticsData {
    fn sanitize(self) -> Self {
        Self {
            p10: self.p10.sanitize(),
            p50: self.p50.sanitize(),
            p90: self.p90.sanitize(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedPointsData {
    pub x_values: Vec<i64>,
    pub counts: Vec<usize>,
}

impl From<&DefinedPointsCount> for DefinedPointsData {
    fn from(counts: &DefinedPointsCount) -> Self {
        Self {
            x_values: counts.x().to_vec(),
            counts: counts.counts().to_vec(),
        }
    }
}

/// A processed table with statistics over its visible series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedData {
    pub original_filename: String,
    /// Row count shared by every series.
    pub total_rows: usize,
    pub series: Vec<SeriesData>,
    pub statistics: StatisticsData,
    pub defined_points: DefinedPointsData,
}

impl ProcessedData {
    /// Builds the output for an aligned table, every series visible.
    #[must_use]
    pub fn new(original_filename: impl Into<String>, table: &AlignedTable) -> Self {
        let mut data = Self {
            original_filename: original_filename.into(),
            total_rows: table.row_count(),
            series: table.iter().map(SeriesData::from).collect(),
            statistics: StatisticsData::default(),
            defined_points: DefinedPointsData::default(),
        };
        data.refresh_statistics();
        data
    }

    /// Shows or hides a series. Returns `false` if no series has that name.
    ///
    /// Statistics are not recomputed; call [`Self::refresh_statistics`].
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.series.iter_mut().find(|s| s.name == name) {
            Some(series) => {
                series.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn visible_series(&self) -> impl Iterator<Item = &SeriesData> + '_ {
        self.series.iter().filter(|s| s.visible)
    }

    /// Recomputes statistics and defined-point counts over the visible series.
    pub fn refresh_statistics(&mut self) {
        let stats = RowwiseStatistics::from_series(self.visible_series());
        let counts = DefinedPointsCount::from_series(self.visible_series());
        self.statistics = StatisticsData::from(&stats).sanitize();
        self.defined_points = DefinedPointsData::from(&counts);
        tracing::debug!(
            visible = self.visible_series().count(),
            total = self.series.len(),
            points = stats.len(),
            "refreshed statistics"
        );
    }
}

impl Sanitize for ProcessedData {
    fn sanitize(self) -> Self {
        Self {
            series: self.series.sanitize(),
            statistics: self.statistics.sanitize(),
            ..self
        }
    }
}
