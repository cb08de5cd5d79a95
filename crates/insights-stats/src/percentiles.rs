/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of commonly used percentile points.
///
/// # Examples
///
/// ```
/// use insights_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(3.0));
/// assert_eq!(percentiles.get(25.0), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// Percentile-value pairs, in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Arguments
    ///
    /// * `sorted_values` - Values sorted in ascending order
    /// * `percentile_points` - The percentile points to compute (e.g., [10.0, 50.0, 90.0])
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use insights_stats::percentiles::Percentiles;
    ///
    /// let mut values = vec![5.0, 2.0, 8.0, 1.0, 9.0];
    /// values.sort_by(f64::total_cmp);
    /// let percentiles = Percentiles::from_sorted(&values, &[50.0, 100.0]);
    /// assert_eq!(percentiles.get(100.0), Some(9.0));
    /// ```
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values.
    ///
    /// This method will sort the values internally before computing percentiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use insights_stats::percentiles::Percentiles;
    ///
    /// let values = vec![20.0, 10.0];
    /// let percentiles = Percentiles::new(&values, &[50.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(15.0));
    /// ```
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    ///
    /// # Examples
    ///
    /// ```
    /// use insights_stats::percentiles::Percentiles;
    ///
    /// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    /// let percentiles = Percentiles::new(&values, &[50.0]);
    ///
    /// assert_eq!(percentiles.get(50.0), Some(3.0));
    /// assert_eq!(percentiles.get(25.0), None); // Not precomputed
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }

}

/// Computes a single percentile value from sorted data.
///
/// This function uses linear interpolation between closest ranks: for a
/// dataset with n values, the k-th percentile sits at fractional position
/// `k / 100 * (n - 1)` and is interpolated between the two order statistics
/// around it. Percentiles outside 0.0-100.0 are clamped.
///
/// # Returns
///
/// The value at the specified percentile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use insights_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 3.0);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 5.0);
///
/// // Midpoint of a two-element sample
/// assert_eq!(compute_percentile(&[10.0, 20.0], 50.0), 15.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let Some(last) = sorted_values.len().checked_sub(1) else {
        return f64::NAN;
    };
    let rank = percentile.clamp(0.0, 100.0) / 100.0 * last as f64;
    let lower = (rank.floor() as usize).min(last);
    let upper = (rank.ceil() as usize).min(last);
    let fraction = rank - lower as f64;
    let (a, b) = (sorted_values[lower], sorted_values[upper]);
    if lower == upper {
        a
    } else {
        // weighted form; `b - a` overflows for large values of opposite sign
        a * (1.0 - fraction) + b * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        assert!(compute_percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_single_value() {
        for p in [0.0, 10.0, 50.0, 90.0, 100.0] {
            assert_eq!(compute_percentile(&[7.0], p), 7.0);
        }
    }

    #[test]
    fn test_linear_interpolation() {
        let values = [0.0, 10.0, 20.0, 30.0, 40.0];
        // rank = 0.9 * 4 = 3.6 -> 30 + 0.6 * 10
        assert!((compute_percentile(&values, 90.0) - 36.0).abs() < 1e-9);
        // rank = 0.1 * 4 = 0.4 -> 0 + 0.4 * 10
        assert!((compute_percentile(&values, 10.0) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolation_near_float_limits() {
        let values = [-1.7e308, 1.7e308];
        assert_eq!(compute_percentile(&values, 50.0), 0.0);
        for p in [10.0, 90.0] {
            assert!(compute_percentile(&values, p).is_finite());
        }
        let values = [1.6e308, 1.7e308];
        let p50 = compute_percentile(&values, 50.0);
        assert!(p50.is_finite());
        assert!((1.6e308..=1.7e308).contains(&p50));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&values, -5.0), 1.0);
        assert_eq!(compute_percentile(&values, 150.0), 3.0);
    }

    #[test]
    fn test_percentiles_keep_request_order() {
        let percentiles = Percentiles::new(&[3.0, 1.0, 2.0], &[90.0, 10.0, 50.0]);
        let points = percentiles.iter().map(|(p, _)| p).collect::<Vec<_>>();
        assert_eq!(points, vec![90.0, 10.0, 50.0]);
        assert_eq!(percentiles.get(50.0), Some(2.0));
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_from_sorted_rejects_unsorted() {
        let _ = Percentiles::from_sorted(&[2.0, 1.0], &[50.0]);
    }
}
