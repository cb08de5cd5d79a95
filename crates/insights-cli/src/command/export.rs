use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Local;

use super::IngestArg;
use crate::{csv_io, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    #[command(flatten)]
    ingest: IngestArg,
    /// Output file path [default: data_insights_<timestamp>.csv]
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let ExportArg { ingest, output } = arg;

    let data = ingest.load()?;
    let path = output
        .clone()
        .unwrap_or_else(|| PathBuf::from(csv_io::export_file_name(Local::now().naive_local())));
    let sink = util::create_sink(Some(path.as_path()))?;
    csv_io::write_export(sink, &data)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    tracing::info!(path = %path.display(), series = data.series.len(), "exported table");
    Ok(())
}
