//! Raw table ingestion and alignment
//!
//! A raw table is a wide table of text cells whose columns come in adjacent
//! `(x, y)` pairs. Each column has a two-level header: a name and a unit tag.
//! The name of an x column has the form `"<series> - <axis label> X Axis"`.
//!
//! [`assemble`] validates the table, normalizes every pair into a
//! [`NormalizedSeries`] and pads all series to the same row count.
//!
//! # Examples
//!
//! ```
//! use insights_engine::{
//!     AssembleOptions,
//!     table::{self, RawColumn, RawTable},
//! };
//!
//! let table = RawTable::new(vec![
//!     RawColumn::new("Well A - Time X Axis", "d", ["1", "3"]),
//!     RawColumn::new("Well A - Rate", "bbl/d", ["10", "30"]),
//!     RawColumn::new("Well B - Time X Axis", "d", ["1"]),
//!     RawColumn::new("Well B - Rate", "bbl/d", ["20"]),
//! ]);
//!
//! let (aligned, names) = table::assemble(&table, AssembleOptions::default())?;
//! assert_eq!(names, ["Well A", "Well B"]);
//! assert_eq!(aligned.row_count(), 3);
//!
//! let well_b = aligned.series("Well B").unwrap();
//! assert_eq!(well_b.data.x(), &[1, 0, 0]);
//! assert_eq!(well_b.data.valid(), &[true, false, false]);
//! # Ok::<(), insights_engine::IngestError>(())
//! ```

use std::collections::HashSet;

use crate::{
    AssembleOptions, IngestError,
    series::{self, GapError, NormalizedSeries},
    unit::{self, UnitTag},
};

/// Separator between the series name and the axis label in an x header.
pub const SERIES_SEPARATOR: &str = " - ";
/// Suffix stripped from the axis label of an x header.
pub const AXIS_SUFFIX: &str = "X Axis";

/// Malformed input table.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StructureError {
    #[display("table is empty")]
    EmptyTable,
    #[display("table must contain paired columns (X, Y); found {count} columns")]
    OddColumnCount { count: usize },
    #[display("column '{column}' contains non-numeric data")]
    NonNumericColumn { column: String },
    #[display("x column header '{header}' has no ' - ' separator")]
    MissingSeparator { header: String },
    #[display("x column '{column}' has no value at row {row}")]
    MissingXValue { column: String, row: usize },
    #[display("series '{name}' appears more than once")]
    DuplicateSeries { name: String },
    #[display("x column '{column}' has a gap from {from} to {to} that is too large to fill")]
    GapTooLarge { column: String, from: i64, to: i64 },
}

/// One column of the input table, still as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    /// First header row
    pub name: String,
    /// Second header row
    pub unit: String,
    pub cells: Vec<String>,
}

impl RawColumn {
    pub fn new<N, U, I>(name: N, unit: U, cells: I) -> Self
    where
        N: Into<String>,
        U: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            name: name.into(),
            unit: unit.into(),
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

/// A wide input table of text columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    #[must_use]
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self { columns }
    }

    /// Length of the longest column.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// Headers and unit tags of one `(x, y)` column pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPair {
    pub x_column: String,
    pub y_column: String,
    pub x_unit: UnitTag,
    pub y_unit: String,
}

impl SeriesPair {
    /// Splits the x header into `(series name, axis label)`.
    ///
    /// The split happens at the last separator; the axis label loses its
    /// `X Axis` suffix and surrounding whitespace.
    pub fn split_x_header(&self) -> Result<(&str, &str), StructureError> {
        let (name, axis) = self.x_column.rsplit_once(SERIES_SEPARATOR).ok_or_else(|| {
            StructureError::MissingSeparator {
                header: self.x_column.clone(),
            }
        })?;
        let axis = axis.trim_end();
        let axis = axis.strip_suffix(AXIS_SUFFIX).unwrap_or(axis);
        Ok((name.trim(), axis.trim()))
    }
}

/// A normalized series with the metadata parsed from its headers.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub name: String,
    pub axis_label: String,
    pub x_unit: UnitTag,
    pub y_unit: String,
    pub data: NormalizedSeries,
}

/// All normalized series of one table, padded to a common row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTable {
    series: Vec<AlignedSeries>,
    row_count: usize,
}

impl AlignedTable {
    /// Number of rows shared by every series.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    #[must_use]
    pub fn series(&self, name: &str) -> Option<&AlignedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Series names in input order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlignedSeries> + '_ {
        self.series.iter()
    }

    #[must_use]
    pub fn into_series(self) -> Vec<AlignedSeries> {
        self.series
    }
}

impl<'a> IntoIterator for &'a AlignedTable {
    type Item = &'a AlignedSeries;
    type IntoIter = std::slice::Iter<'a, AlignedSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

/// Parses one cell. Empty, unparsable and non-finite cells are missing.
#[must_use]
pub fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerces a text column to numbers.
///
/// A column fails only when it has non-empty cells and none of them parse.
fn coerce_column(column: &RawColumn) -> Result<Vec<Option<f64>>, StructureError> {
    let values = column
        .cells
        .iter()
        .map(|cell| parse_cell(cell))
        .collect::<Vec<_>>();
    let has_text = column.cells.iter().any(|cell| !cell.trim().is_empty());
    let has_number = values.iter().any(Option::is_some);
    if has_text && !has_number {
        return Err(StructureError::NonNumericColumn {
            column: column.name.clone(),
        });
    }
    Ok(values)
}

/// Checks the table shape and coerces every column to numbers.
pub fn validate_structure(table: &RawTable) -> Result<Vec<Vec<Option<f64>>>, StructureError> {
    if table.columns.is_empty() || table.is_empty() {
        return Err(StructureError::EmptyTable);
    }
    let count = table.columns.len();
    if count % 2 != 0 {
        return Err(StructureError::OddColumnCount { count });
    }
    table.columns.iter().map(coerce_column).collect()
}

/// Derives the `(x, y)` pairs and parses each x unit tag.
pub fn extract_series_pairs(table: &RawTable) -> Result<Vec<SeriesPair>, IngestError> {
    table
        .columns
        .chunks_exact(2)
        .map(|pair| -> Result<SeriesPair, IngestError> {
            let (x, y) = (&pair[0], &pair[1]);
            Ok(SeriesPair {
                x_column: x.name.clone(),
                y_column: y.name.clone(),
                x_unit: x.unit.parse()?,
                y_unit: y.unit.clone(),
            })
        })
        .collect()
}

/// Drops missing trailing x cells and rejects interior ones.
fn x_values(column: &str, values: &[Option<f64>]) -> Result<Vec<f64>, StructureError> {
    let end = values
        .iter()
        .rposition(Option::is_some)
        .map_or(0, |last| last + 1);
    values[..end]
        .iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| StructureError::MissingXValue {
                column: column.to_owned(),
                row,
            })
        })
        .collect()
}

/// Builds the aligned table from a raw table.
///
/// Returns the table together with the series names in input order. Any
/// structural or unit fault aborts the whole assembly.
pub fn assemble(
    table: &RawTable,
    options: AssembleOptions,
) -> Result<(AlignedTable, Vec<String>), IngestError> {
    let columns = validate_structure(table)?;
    let pairs = extract_series_pairs(table)?;

    let mut seen = HashSet::new();
    let mut aligned = Vec::with_capacity(pairs.len());
    for (pair, values) in pairs.into_iter().zip(columns.chunks_exact(2)) {
        let (name, axis_label) = pair.split_x_header()?;
        if !seen.insert(name.to_owned()) {
            return Err(StructureError::DuplicateSeries {
                name: name.to_owned(),
            }
            .into());
        }

        let x = x_values(&pair.x_column, &values[0])?;
        let len = x.len().min(values[1].len());
        let x = unit::convert(&x[..len], pair.x_unit, options.units);
        let data = series::normalize(
            &x,
            &values[1][..len],
            options.units.coarse_step(pair.x_unit),
            options.validity,
        )
        .map_err(|GapError { from, to }| StructureError::GapTooLarge {
            column: pair.x_column.clone(),
            from,
            to,
        })?;
        tracing::debug!(
            series = name,
            unit = %pair.x_unit,
            input_rows = len,
            output_rows = data.len(),
            valid_rows = data.valid_count(),
            "normalized series"
        );

        aligned.push(AlignedSeries {
            name: name.to_owned(),
            axis_label: axis_label.to_owned(),
            x_unit: pair.x_unit,
            y_unit: pair.y_unit.clone(),
            data,
        });
    }

    let row_count = aligned.iter().map(|s| s.data.len()).max().unwrap_or(0);
    for s in &mut aligned {
        s.data.pad_to(row_count);
    }
    tracing::info!(series = aligned.len(), rows = row_count, "assembled table");

    let names = aligned.iter().map(|s| s.name.clone()).collect();
    Ok((
        AlignedTable {
            series: aligned,
            row_count,
        },
        names,
    ))
}
