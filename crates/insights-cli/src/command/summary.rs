use std::io;

use anyhow::Context as _;
use insights_analysis::summary::{CombinedSummary, SeriesSummary};

use super::IngestArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummaryArg {
    #[command(flatten)]
    ingest: IngestArg,
    /// Summarize a single series instead of all series pooled
    #[arg(long)]
    series: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct NamedSummary<'a> {
    name: &'a str,
    #[serde(flatten)]
    summary: SeriesSummary,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let SummaryArg { ingest, series } = arg;

    let data = ingest.load()?;
    let stdout = io::stdout().lock();
    match series {
        Some(name) => {
            let series = data
                .series
                .iter()
                .find(|s| &s.name == name)
                .with_context(|| format!("Series not found: {name}"))?;
            let summary = SeriesSummary::from_series(series)
                .with_context(|| format!("Failed to summarize series {name}"))?;
            util::write_json(stdout, &NamedSummary { name, summary })?;
        }
        None => {
            let summary = CombinedSummary::from_series(&data.series)
                .context("Failed to summarize all series")?;
            util::write_json(stdout, &summary)?;
        }
    }
    Ok(())
}
