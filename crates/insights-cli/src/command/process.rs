use std::path::PathBuf;

use anyhow::Context as _;
use insights_analysis::output::Sanitize as _;

use super::IngestArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ProcessArg {
    #[command(flatten)]
    ingest: IngestArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Series to leave out of the row-wise statistics
    #[arg(long, value_delimiter = ',')]
    hide: Vec<String>,
}

pub(crate) fn run(arg: &ProcessArg) -> anyhow::Result<()> {
    let ProcessArg {
        ingest,
        output,
        hide,
    } = arg;

    let mut data = ingest.load()?;
    if !hide.is_empty() {
        for name in hide {
            if !data.set_visible(name, false) {
                tracing::warn!(series = %name, "no such series to hide");
            }
        }
        data.refresh_statistics();
    }

    let series_count = data.series.len();
    let sink = util::create_sink(output.as_deref())?;
    util::write_json(sink, &data.sanitize()).context("Failed to write processed data")?;
    if let Some(path) = output {
        tracing::info!(path = %path.display(), series = series_count, "wrote processed data");
    }
    Ok(())
}
