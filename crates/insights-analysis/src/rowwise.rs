//! Row-wise statistics across series
//!
//! Series produced from different inputs do not share an index: each has its
//! own x range and cadence. Row-wise statistics therefore work on the
//! **union x-domain**, the sorted set of every x observed in any series.
//! At each x, the valid values of all series that have that x are gathered
//! and summarized.
//!
//! Samples are grouped through one ordered map keyed by x, so the cost is
//! `O(rows × log(unique x))` regardless of how many series there are.

use std::collections::{BTreeMap, HashSet};

use insights_stats::percentiles::compute_percentile;

use crate::SeriesRows;

/// One of the row-wise percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    P10,
    P50,
    P90,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::P10, Statistic::P50, Statistic::P90];

    #[must_use]
    pub fn percentile(self) -> f64 {
        match self {
            Statistic::P10 => 10.0,
            Statistic::P50 => 50.0,
            Statistic::P90 => 90.0,
        }
    }
}

/// Groups the valid values of every series by x.
///
/// Every x of every series becomes a key, valid or not. Within one series
/// only the first valid value at a given x is taken.
fn group_by_x<'a, I, S>(series: I) -> BTreeMap<i64, Vec<f64>>
where
    I: IntoIterator<Item = &'a S>,
    S: SeriesRows + ?Sized + 'a,
{
    let mut samples = BTreeMap::<i64, Vec<f64>>::new();
    let mut taken = HashSet::new();
    for series in series {
        taken.clear();
        for x in series.x() {
            samples.entry(*x).or_default();
        }
        for (x, y) in series.valid_points() {
            if taken.insert(x) {
                samples.entry(x).or_default().push(y);
            }
        }
    }
    samples
}

/// P10/P50/P90 at every x of the union x-domain.
///
/// `x` is strictly increasing. A `None` at some x means no series had a
/// valid observation there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowwiseStatistics {
    x: Vec<i64>,
    p10: Vec<Option<f64>>,
    p50: Vec<Option<f64>>,
    p90: Vec<Option<f64>>,
}

impl RowwiseStatistics {
    /// Computes row-wise statistics with linear-interpolation percentiles.
    ///
    /// An empty collection yields empty sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use insights_analysis::rowwise::{RowwiseStatistics, Statistic};
    /// use insights_engine::series::NormalizedSeries;
    ///
    /// let series = [
    ///     NormalizedSeries::from_parts(vec![1, 2], vec![Some(1.0), Some(4.0)], vec![true, true]),
    ///     NormalizedSeries::from_parts(vec![2, 3], vec![Some(2.0), Some(9.0)], vec![true, true]),
    /// ];
    /// let stats = RowwiseStatistics::from_series(&series);
    ///
    /// let (x, p50) = stats.get(Statistic::P50);
    /// assert_eq!(x, &[1, 2, 3]);
    /// assert_eq!(p50, &[Some(1.0), Some(3.0), Some(9.0)]);
    /// ```
    #[must_use]
    pub fn from_series<'a, I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        S: SeriesRows + ?Sized + 'a,
    {
        let samples = group_by_x(series);
        let mut stats = Self {
            x: Vec::with_capacity(samples.len()),
            p10: Vec::with_capacity(samples.len()),
            p50: Vec::with_capacity(samples.len()),
            p90: Vec::with_capacity(samples.len()),
        };
        for (x, mut values) in samples {
            values.sort_by(f64::total_cmp);
            let at = |statistic: Statistic| {
                (!values.is_empty()).then(|| compute_percentile(&values, statistic.percentile()))
            };
            stats.x.push(x);
            stats.p10.push(at(Statistic::P10));
            stats.p50.push(at(Statistic::P50));
            stats.p90.push(at(Statistic::P90));
        }
        tracing::debug!(points = stats.x.len(), "computed row-wise statistics");
        stats
    }

    /// The union x-domain.
    #[must_use]
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    #[must_use]
    pub fn p10(&self) -> &[Option<f64>] {
        &self.p10
    }

    #[must_use]
    pub fn p50(&self) -> &[Option<f64>] {
        &self.p50
    }

    #[must_use]
    pub fn p90(&self) -> &[Option<f64>] {
        &self.p90
    }

    /// Returns the `(x, y)` pair of sequences for one statistic.
    #[must_use]
    pub fn get(&self, statistic: Statistic) -> (&[i64], &[Option<f64>]) {
        let y = match statistic {
            Statistic::P10 => &self.p10,
            Statistic::P50 => &self.p50,
            Statistic::P90 => &self.p90,
        };
        (&self.x, y)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Number of series with a valid observation at every x of the union x-domain.
///
/// x values where no series is valid are kept with a count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinedPointsCount {
    x: Vec<i64>,
    counts: Vec<usize>,
}

impl DefinedPointsCount {
    #[must_use]
    pub fn from_series<'a, I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        S: SeriesRows + ?Sized + 'a,
    {
        let (x, counts) = group_by_x(series)
            .into_iter()
            .map(|(x, values)| (x, values.len()))
            .unzip();
        Self { x, counts }
    }

    #[must_use]
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Iterates over `(x, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.x.iter().copied().zip(self.counts.iter().copied())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use insights_engine::series::NormalizedSeries;

    use super::*;

    fn series(x: &[i64], y: &[Option<f64>]) -> NormalizedSeries {
        let valid = y.iter().map(Option::is_some).collect();
        NormalizedSeries::from_parts(x.to_vec(), y.to_vec(), valid)
    }

    #[test]
    fn test_empty_collection() {
        let stats = RowwiseStatistics::from_series::<_, NormalizedSeries>([]);
        assert!(stats.is_empty());
        assert!(stats.p10().is_empty());
        let counts = DefinedPointsCount::from_series::<_, NormalizedSeries>([]);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_two_series_median_is_midpoint() {
        let a = series(&[5], &[Some(10.0)]);
        let b = series(&[5], &[Some(20.0)]);
        let stats = RowwiseStatistics::from_series([&a, &b]);
        assert_eq!(stats.x(), &[5]);
        assert_eq!(stats.p50(), &[Some(15.0)]);
        assert_eq!(stats.p10(), &[Some(11.0)]);
        assert_eq!(stats.p90(), &[Some(19.0)]);
    }

    #[test]
    fn test_union_domain_is_strictly_increasing() {
        let a = series(&[3, 4, 5], &[Some(1.0), Some(2.0), Some(3.0)]);
        let b = series(&[1, 2, 3], &[Some(1.0), None, Some(3.0)]);
        let c = series(&[10, 0], &[Some(1.0), None]);
        let stats = RowwiseStatistics::from_series([&a, &b, &c]);
        assert_eq!(stats.x(), &[0, 1, 2, 3, 4, 5, 10]);
        assert!(stats.x().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stats.len(), stats.p10().len());
        assert_eq!(stats.len(), stats.p90().len());
    }

    #[test]
    fn test_no_valid_value_is_null() {
        let a = series(&[1, 2], &[Some(1.0), None]);
        let b = series(&[1, 2], &[Some(3.0), None]);
        let stats = RowwiseStatistics::from_series([&a, &b]);
        assert_eq!(stats.p50(), &[Some(2.0), None]);
        assert_eq!(stats.p10()[1], None);
        assert_eq!(stats.p90()[1], None);
    }

    #[test]
    fn test_invalid_rows_are_ignored_even_with_values() {
        let a = NormalizedSeries::from_parts(vec![1], vec![Some(100.0)], vec![false]);
        let b = series(&[1], &[Some(2.0)]);
        let stats = RowwiseStatistics::from_series([&a, &b]);
        assert_eq!(stats.p50(), &[Some(2.0)]);
    }

    #[test]
    fn test_padding_rows_join_domain_without_values() {
        let a = NormalizedSeries::from_parts(
            vec![1, 2, 0],
            vec![Some(1.0), Some(2.0), None],
            vec![true, true, false],
        );
        let stats = RowwiseStatistics::from_series([&a]);
        assert_eq!(stats.x(), &[0, 1, 2]);
        assert_eq!(stats.p50(), &[None, Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_percentiles_of_five_series() {
        let all = [10.0, 20.0, 30.0, 40.0, 50.0]
            .map(|v| series(&[7], &[Some(v)]))
            .to_vec();
        let stats = RowwiseStatistics::from_series(&all);
        // rank = 0.1 * 4 = 0.4 -> 10 + 0.4 * 10
        assert!((stats.p10()[0].unwrap() - 14.0).abs() < 1e-9);
        assert_eq!(stats.p50(), &[Some(30.0)]);
        assert!((stats.p90()[0].unwrap() - 46.0).abs() < 1e-9);
    }

    #[test]
    fn test_valid_values_near_float_limits_stay_defined() {
        let a = series(&[1], &[Some(-1.7e308)]);
        let b = series(&[1], &[Some(1.7e308)]);
        let stats = RowwiseStatistics::from_series([&a, &b]);
        assert_eq!(stats.p50(), &[Some(0.0)]);
        for statistic in Statistic::ALL {
            let (_, y) = stats.get(statistic);
            assert!(y[0].is_some_and(f64::is_finite));
        }
    }

    #[test]
    fn test_get_pairs() {
        let a = series(&[1, 2], &[Some(1.0), Some(2.0)]);
        let stats = RowwiseStatistics::from_series([&a]);
        for statistic in Statistic::ALL {
            let (x, y) = stats.get(statistic);
            assert_eq!(x.len(), y.len());
        }
    }

    #[test]
    fn test_defined_points_count() {
        let a = series(&[1, 2, 3], &[Some(1.0), None, Some(3.0)]);
        let b = series(&[2, 3, 4], &[None, Some(1.0), Some(2.0)]);
        let counts = DefinedPointsCount::from_series([&a, &b]);
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![(1, 1), (2, 0), (3, 2), (4, 1)]
        );
    }

    #[test]
    fn test_duplicate_x_within_series_counts_once() {
        let a = series(&[1, 1], &[Some(1.0), Some(5.0)]);
        let b = series(&[1], &[Some(3.0)]);
        let counts = DefinedPointsCount::from_series([&a, &b]);
        assert_eq!(counts.counts(), &[2]);
        let stats = RowwiseStatistics::from_series([&a, &b]);
        assert_eq!(stats.p50(), &[Some(2.0)]);
    }
}
