//! Output sinks and config loading

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::Context as _;
use insights_engine::AssembleOptions;
use serde::Serialize;

/// Opens `path` for writing, or stdout when no path is given.
pub fn create_sink(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(io::stdout().lock()));
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Writes `value` as pretty JSON followed by a newline, then flushes.
pub fn write_json<W, T>(mut sink: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut sink, value)?;
    writeln!(sink)?;
    sink.flush()
}

/// Parses normalization options from JSON. Missing keys keep their defaults.
pub fn parse_config<R>(reader: R) -> serde_json::Result<AssembleOptions>
where
    R: Read,
{
    serde_json::from_reader(reader)
}

pub fn read_config(path: &Path) -> anyhow::Result<AssembleOptions> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    parse_config(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
