//! Per-series normalization: duplicate collapse and gap filling
//!
//! A raw series arrives as parallel `x` (already converted to the integer
//! axis) and `y` columns, ordered by `x`. Normalization makes it evenly
//! populated over its observed range:
//!
//! - A run of consecutive rows sharing one `x` becomes a single row carrying
//!   the **first** `y` of the run; later duplicates are dropped.
//! - Between two distinct `x` values that are more than one step apart,
//!   placeholder rows (`y = None`, not valid) are inserted at every step.
//! - Nothing is inserted before the first or after the last observed `x`.
//!
//! Each row carries a validity flag telling the statistics layer whether the
//! row holds a real measurement. What counts as a measurement is decided by
//! [`ValidityRule`].
//!
//! # Examples
//!
//! ```
//! use insights_engine::series::{self, ValidityRule};
//!
//! let normalized = series::normalize(
//!     &[1, 1, 4],
//!     &[Some(10.0), Some(99.0), Some(40.0)],
//!     None,
//!     ValidityRule::default(),
//! )?;
//!
//! assert_eq!(normalized.x(), &[1, 2, 3, 4]);
//! assert_eq!(normalized.y(), &[Some(10.0), None, None, Some(40.0)]);
//! assert_eq!(normalized.valid(), &[true, false, false, true]);
//! # Ok::<(), insights_engine::series::GapError>(())
//! ```

use serde::{Deserialize, Serialize};

/// Upper bound on the rows of one normalized series, gap rows included.
pub const MAX_SERIES_ROWS: usize = 1 << 22;

/// A gap between two observed x values that cannot be filled.
///
/// Either the distance overflows the axis or filling it would exceed
/// [`MAX_SERIES_ROWS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("gap from x = {from} to x = {to} is too large to fill")]
pub struct GapError {
    pub from: i64,
    pub to: i64,
}

/// Which raw `y` values count as real measurements.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityRule {
    /// Any present, finite value is a measurement, zero included.
    #[default]
    PresentValue,
    /// Present, finite and non-zero. Zero readings are treated as missing.
    NonZeroValue,
}

impl ValidityRule {
    #[must_use]
    pub fn is_valid(self, y: Option<f64>) -> bool {
        match (self, y) {
            (_, None) => false,
            (ValidityRule::PresentValue, Some(v)) => v.is_finite(),
            (ValidityRule::NonZeroValue, Some(v)) => v.is_finite() && v != 0.0,
        }
    }
}

/// A series on the integer axis with one validity flag per row.
///
/// The three columns always have the same length.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    x: Vec<i64>,
    y: Vec<Option<f64>>,
    valid: Vec<bool>,
}

impl NormalizedSeries {
    /// Builds a series from already-normalized columns.
    ///
    /// # Panics
    ///
    /// Panics if the three columns differ in length.
    #[must_use]
    pub fn from_parts(x: Vec<i64>, y: Vec<Option<f64>>, valid: Vec<bool>) -> Self {
        assert!(
            x.len() == y.len() && y.len() == valid.len(),
            "series columns must have equal lengths"
        );
        Self { x, y, valid }
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            valid: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, x: i64, y: Option<f64>, valid: bool) {
        self.x.push(x);
        self.y.push(y);
        self.valid.push(valid);
    }

    /// Inserts placeholder rows strictly between `from` and `to`.
    ///
    /// Nothing is inserted when `to` does not lie ahead of `from`.
    fn fill_gap(&mut self, from: i64, to: i64, step: i64) -> Result<(), GapError> {
        if to <= from {
            return Ok(());
        }
        let err = GapError { from, to };
        let steps = to.checked_sub(from).ok_or(err)? / step;
        let missing = usize::try_from((steps - 1).max(0)).map_err(|_| err)?;
        if self.len().saturating_add(missing) >= MAX_SERIES_ROWS {
            return Err(err);
        }
        // from + k * step < to for every k < steps, so nothing below overflows
        let mut x = from;
        for _ in 0..missing {
            x += step;
            self.push(x, None, false);
        }
        Ok(())
    }

    /// Appends non-valid rows at `x = 0` until the series has `len` rows.
    pub(crate) fn pad_to(&mut self, len: usize) {
        while self.x.len() < len {
            self.push(0, None, false);
        }
    }

    #[must_use]
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[Option<f64>] {
        &self.y
    }

    #[must_use]
    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of rows flagged valid.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }

    /// Iterates over `(x, y, valid)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (i64, Option<f64>, bool)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.valid)
            .map(|((x, y), valid)| (*x, *y, *valid))
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<i64>, Vec<Option<f64>>, Vec<bool>) {
        (self.x, self.y, self.valid)
    }
}

/// A maximal run of consecutive rows sharing one `x`.
#[derive(Debug, Clone, Copy)]
struct Run {
    x: i64,
    first_row: usize,
}

fn runs(x: &[i64]) -> impl Iterator<Item = Run> + '_ {
    x.chunk_by(|a, b| a == b).scan(0, |first_row, chunk| {
        let run = Run {
            x: chunk[0],
            first_row: *first_row,
        };
        *first_row += chunk.len();
        Some(run)
    })
}

/// Normalizes one series.
///
/// Rows are scanned in input order and never re-sorted. If `x` and `y`
/// differ in length, the extra rows of the longer one are ignored.
/// `coarse_step` is the axis step of volume-class units; `None` means a step
/// of one. Non-finite `y` values are stored as `None`.
///
/// Fails with [`GapError`] when a gap is too wide to fill.
pub fn normalize(
    x: &[i64],
    y: &[Option<f64>],
    coarse_step: Option<i64>,
    validity: ValidityRule,
) -> Result<NormalizedSeries, GapError> {
    let len = x.len().min(y.len());
    let (x, y) = (&x[..len], &y[..len]);
    let step = coarse_step.filter(|step| *step > 0).unwrap_or(1);

    let mut series = NormalizedSeries::with_capacity(len);
    let mut distinct = 0;
    let mut runs = runs(x).peekable();
    while let Some(run) = runs.next() {
        distinct += 1;
        let value = y[run.first_row].filter(|v| v.is_finite());
        series.push(run.x, value, validity.is_valid(value));
        if let Some(next) = runs.peek() {
            series.fill_gap(run.x, next.x, step)?;
        }
    }

    tracing::trace!(
        input_rows = len,
        output_rows = series.len(),
        duplicates_dropped = len - distinct,
        gap_rows = series.len() - distinct,
        "normalized series"
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_default(x: &[i64], y: &[Option<f64>]) -> NormalizedSeries {
        normalize(x, y, None, ValidityRule::default()).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let series = normalize_default(&[], &[]);
        assert!(series.is_empty());
        assert_eq!(series, NormalizedSeries::default());
    }

    #[test]
    fn test_single_row() {
        let series = normalize_default(&[7], &[Some(1.5)]);
        assert_eq!(series.x(), &[7]);
        assert_eq!(series.y(), &[Some(1.5)]);
        assert_eq!(series.valid(), &[true]);
    }

    #[test]
    fn test_duplicate_collapse_keeps_first() {
        let series = normalize_default(&[1, 1, 2], &[Some(5.0), Some(9.0), Some(3.0)]);
        assert_eq!(series.x(), &[1, 2]);
        assert_eq!(series.y(), &[Some(5.0), Some(3.0)]);
        assert_eq!(series.valid(), &[true, true]);
    }

    #[test]
    fn test_duplicate_run_with_null_first_is_invalid() {
        // the first row of the run wins even when it is missing
        let series = normalize_default(&[1, 1, 2], &[None, Some(9.0), Some(3.0)]);
        assert_eq!(series.y(), &[None, Some(3.0)]);
        assert_eq!(series.valid(), &[false, true]);
    }

    #[test]
    fn test_all_duplicates() {
        let series = normalize_default(&[4, 4, 4, 4], &[Some(1.0), Some(2.0), None, Some(3.0)]);
        assert_eq!(series.x(), &[4]);
        assert_eq!(series.y(), &[Some(1.0)]);
    }

    #[test]
    fn test_gap_insertion() {
        let series = normalize_default(&[1, 4], &[Some(10.0), Some(40.0)]);
        assert_eq!(series.x(), &[1, 2, 3, 4]);
        assert_eq!(series.y(), &[Some(10.0), None, None, Some(40.0)]);
        assert_eq!(series.valid(), &[true, false, false, true]);
    }

    #[test]
    fn test_gap_after_duplicate_run() {
        let series = normalize_default(&[1, 1, 3], &[Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(series.x(), &[1, 2, 3]);
        assert_eq!(series.y(), &[Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_coarse_step_gaps() {
        let series = normalize(
            &[10, 40, 50],
            &[Some(1.0), Some(4.0), Some(5.0)],
            Some(10),
            ValidityRule::default(),
        )
        .unwrap();
        assert_eq!(series.x(), &[10, 20, 30, 40, 50]);
        assert_eq!(series.valid(), &[true, false, false, true, true]);
    }

    #[test]
    fn test_coarse_step_truncates_partial_steps() {
        // (35 - 10) / 10 = 2 steps -> one placeholder at 20
        let series = normalize(
            &[10, 35],
            &[Some(1.0), Some(2.0)],
            Some(10),
            ValidityRule::default(),
        )
        .unwrap();
        assert_eq!(series.x(), &[10, 20, 35]);
    }

    #[test]
    fn test_idempotent_on_gap_free_series() {
        let x = [3, 4, 5, 6];
        let y = [Some(1.0), None, Some(0.5), Some(2.0)];
        let once = normalize_default(&x, &y);
        let twice = normalize_default(once.x(), once.y());
        assert_eq!(once, twice);
        assert_eq!(once.x(), &x);
        assert_eq!(once.y(), &y);
        assert_eq!(once.valid(), &[true, false, true, true]);
    }

    #[test]
    fn test_no_trailing_or_leading_gap() {
        let series = normalize_default(&[5, 6], &[Some(1.0), Some(2.0)]);
        assert_eq!(series.x().first(), Some(&5));
        assert_eq!(series.x().last(), Some(&6));
    }

    #[test]
    fn test_descending_step_inserts_nothing() {
        let series = normalize_default(&[5, 2], &[Some(1.0), Some(2.0)]);
        assert_eq!(series.x(), &[5, 2]);
    }

    #[test]
    fn test_zero_validity_rules() {
        let y = [Some(0.0), Some(2.0)];
        let present = normalize(&[1, 2], &y, None, ValidityRule::PresentValue).unwrap();
        assert_eq!(present.valid(), &[true, true]);
        let non_zero = normalize(&[1, 2], &y, None, ValidityRule::NonZeroValue).unwrap();
        assert_eq!(non_zero.valid(), &[false, true]);
    }

    #[test]
    fn test_non_finite_y_becomes_null() {
        let series = normalize_default(&[1, 2], &[Some(f64::NAN), Some(f64::INFINITY)]);
        assert_eq!(series.y(), &[None, None]);
        assert_eq!(series.valid(), &[false, false]);
    }

    #[test]
    fn test_mismatched_lengths_use_shorter() {
        let series = normalize_default(&[1, 2, 3], &[Some(1.0)]);
        assert_eq!(series.x(), &[1]);
    }

    #[test]
    fn test_gap_spanning_whole_axis() {
        let err = normalize(
            &[i64::MIN, i64::MAX],
            &[Some(1.0), Some(2.0)],
            None,
            ValidityRule::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            GapError {
                from: i64::MIN,
                to: i64::MAX
            }
        );
    }

    #[test]
    fn test_gap_beyond_row_limit() {
        let to = i64::try_from(MAX_SERIES_ROWS).unwrap() * 4;
        let err = normalize(&[0, to], &[Some(1.0), Some(2.0)], None, ValidityRule::default())
            .unwrap_err();
        assert_eq!(err, GapError { from: 0, to });

        // the same distance in coarse steps stays within the limit
        let series = normalize(
            &[0, to],
            &[Some(1.0), Some(2.0)],
            Some(to / 4),
            ValidityRule::default(),
        )
        .unwrap();
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_descending_extremes_insert_nothing() {
        let series = normalize_default(&[i64::MAX, i64::MIN], &[Some(1.0), Some(2.0)]);
        assert_eq!(series.x(), &[i64::MAX, i64::MIN]);
    }

    #[test]
    fn test_pad_to() {
        let mut series = normalize_default(&[1, 2], &[Some(1.0), Some(2.0)]);
        series.pad_to(4);
        assert_eq!(series.x(), &[1, 2, 0, 0]);
        assert_eq!(series.y(), &[Some(1.0), Some(2.0), None, None]);
        assert_eq!(series.valid(), &[true, true, false, false]);
        assert_eq!(series.valid_count(), 2);
    }
}
