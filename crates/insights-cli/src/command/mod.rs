use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use insights_analysis::output::ProcessedData;
use insights_engine::{AssembleOptions, series::ValidityRule, table};
use tracing_subscriber::filter::LevelFilter;

use self::{export::ExportArg, process::ProcessArg, summary::SummaryArg};
use crate::{csv_io, util};

mod export;
mod process;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug events
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Log warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

impl CommandArgs {
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (true, _) => LevelFilter::DEBUG,
            (false, true) => LevelFilter::WARN,
            (false, false) => LevelFilter::INFO,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Normalize a table and write series with row-wise statistics as JSON
    Process(#[clap(flatten)] ProcessArg),
    /// Print percentile summaries of one series or of all series pooled
    Summary(#[clap(flatten)] SummaryArg),
    /// Write the normalized table as CSV
    Export(#[clap(flatten)] ExportArg),
}

pub fn run(args: CommandArgs) -> anyhow::Result<()> {
    match args.mode {
        Mode::Process(arg) => process::run(&arg)?,
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Export(arg) => export::run(&arg)?,
    }
    Ok(())
}

/// Input table and normalization settings shared by every mode.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct IngestArg {
    /// CSV file with a name row and a unit row
    input: PathBuf,
    /// JSON file with normalization options
    #[arg(long)]
    config: Option<PathBuf>,
    /// Days per month
    #[arg(long)]
    months_to_days: Option<f64>,
    /// Hours per day
    #[arg(long)]
    hours_per_day: Option<f64>,
    /// Scale between adjacent volume prefixes
    #[arg(long)]
    kilo_unit: Option<f64>,
    /// Quantization step of volume axes
    #[arg(long)]
    ten_unit: Option<i64>,
    /// Treat zero readings as missing measurements
    #[arg(long)]
    zero_is_missing: bool,
}

impl IngestArg {
    fn options(&self) -> anyhow::Result<AssembleOptions> {
        let base = match &self.config {
            Some(path) => util::read_config(path)?,
            None => AssembleOptions::default(),
        };
        let options = self.apply_overrides(base);
        options.units.validate()?;
        Ok(options)
    }

    /// Flags given on the command line win over the config file.
    fn apply_overrides(&self, mut options: AssembleOptions) -> AssembleOptions {
        let units = &mut options.units;
        if let Some(value) = self.months_to_days {
            units.months_to_days = value;
        }
        if let Some(value) = self.hours_per_day {
            units.hours_to_days_denominator = value;
        }
        if let Some(value) = self.kilo_unit {
            units.kilo_unit = value;
        }
        if let Some(value) = self.ten_unit {
            units.ten_unit = value;
        }
        if self.zero_is_missing {
            options.validity = ValidityRule::NonZeroValue;
        }
        options
    }

    fn file_name(&self) -> String {
        file_name(&self.input)
    }

    /// Reads and normalizes the input table.
    pub(crate) fn load(&self) -> anyhow::Result<ProcessedData> {
        let options = self.options()?;
        tracing::debug!(?options, "normalization options");

        let raw = csv_io::read_raw_table_file(&self.input)?;
        let (aligned, names) = table::assemble(&raw, options).with_context(|| {
            format!(
                "Failed to process {} (invalid input)",
                self.input.display()
            )
        })?;
        tracing::info!(
            file = %self.input.display(),
            series = ?names,
            rows = aligned.row_count(),
            "loaded table"
        );
        Ok(ProcessedData::new(self.file_name(), &aligned))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
