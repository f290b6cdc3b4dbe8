use crate::error::Result;
use crate::flatten::types::Mapping;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Serialization format for flattened values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// Writes a flat mapping, one top-level entry per flattened key
pub struct FlatWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> FlatWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        FlatWriter { writer, format }
    }

    pub fn write_flat(&mut self, flat: &Mapping) -> Result<()> {
        match self.format {
            OutputFormat::Yaml => serde_yaml::to_writer(&mut self.writer, flat)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, flat)?;
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write a flat mapping to a file, replacing any existing content
#[instrument(level = "info", skip_all, fields(output = %path.display()))]
pub fn write_flat_file(path: &Path, flat: &Mapping, format: OutputFormat) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = FlatWriter::new(BufWriter::new(file), format);
    writer.write_flat(flat)?;
    writer.flush()?;
    info!(keys = flat.len(), "wrote flattened values");
    Ok(())
}

/// Output path next to the input: `values.yaml` becomes `values.flat.yaml`
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "values".to_string());
    input.with_file_name(format!("{stem}.flat.{}", format.extension()))
}
