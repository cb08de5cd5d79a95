//! CSV input and export
//!
//! Input tables have two header rows (column names, then unit tags) followed
//! by data rows. Files that are not valid UTF-8 are read as Latin-1.

use std::{
    borrow::Cow,
    fs,
    io,
    path::Path,
};

use anyhow::Context as _;
use chrono::NaiveDateTime;
use insights_analysis::output::{ProcessedData, SeriesData};
use insights_engine::table::{RawColumn, RawTable};

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => {
            tracing::debug!("input is not valid UTF-8, reading as Latin-1");
            // every Latin-1 byte maps to the code point of the same value
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Parses a two-header-row CSV table.
///
/// Short rows are padded with empty cells; cells beyond the header width are
/// ignored.
pub fn read_raw_table(bytes: &[u8]) -> anyhow::Result<RawTable> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();
    let names = records.next().transpose()?.unwrap_or_default();
    let units = records.next().transpose()?.unwrap_or_default();

    let mut columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            RawColumn::new(
                name.trim(),
                units.get(i).unwrap_or_default().trim(),
                Vec::<String>::new(),
            )
        })
        .collect::<Vec<_>>();
    for record in records {
        let record = record?;
        for (i, column) in columns.iter_mut().enumerate() {
            column
                .cells
                .push(record.get(i).unwrap_or_default().to_owned());
        }
    }

    let table = RawTable::new(columns);
    tracing::debug!(
        columns = table.columns.len(),
        rows = table.row_count(),
        "read CSV table"
    );
    Ok(table)
}

pub fn read_raw_table_file(path: &Path) -> anyhow::Result<RawTable> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    read_raw_table(&bytes)
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))
}

/// Default name of an export file created at `now`.
pub fn export_file_name(now: NaiveDateTime) -> String {
    now.format("data_insights_%Y%m%d_%H%M%S.csv").to_string()
}

fn export_cells(series: &SeriesData, row: usize) -> [String; 3] {
    let x = series
        .x_values
        .get(row)
        .map(ToString::to_string)
        .unwrap_or_default();
    let y = series
        .y_values
        .get(row)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
        .map(|v| v.to_string())
        .unwrap_or_default();
    let count_stat = if series.count_stat.get(row).copied().unwrap_or(false) {
        "True"
    } else {
        "False"
    };
    [x, y, count_stat.to_owned()]
}

/// Writes every series, hidden or not, as `<name>_X`, `<name>_Y` and
/// `<name>_Count_Stat` columns below a commented preamble.
pub fn write_export<W>(mut writer: W, data: &ProcessedData) -> anyhow::Result<()>
where
    W: io::Write,
{
    writeln!(writer, "# Data Insights Export")?;
    writeln!(writer, "# Original file: {}", data.original_filename)?;
    writeln!(writer, "# Number of series: {}", data.series.len())?;
    writeln!(writer, "#")?;

    let mut csv = csv::Writer::from_writer(writer);
    if !data.series.is_empty() {
        csv.write_record(data.series.iter().flat_map(|s| {
            ["X", "Y", "Count_Stat"].map(|suffix| format!("{}_{suffix}", s.name))
        }))?;
    }
    let rows = data
        .series
        .iter()
        .map(|s| s.x_values.len())
        .max()
        .unwrap_or(0);
    for row in 0..rows {
        csv.write_record(data.series.iter().flat_map(|s| export_cells(s, row)))?;
    }
    csv.flush()?;
    Ok(())
}
