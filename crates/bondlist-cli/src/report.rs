//! Report writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use bondlist_core::types::BondRecord;
use bondlist_engine::ScanReport;

use crate::cli::OutputFormat;

/// Writes records in rank order, each block prefixed with its rank.
pub fn render_text<W: Write>(records: &[BondRecord], out: &mut W) -> io::Result<()> {
    for (rank, record) in records.iter().enumerate() {
        writeln!(out, "#{}", rank + 1)?;
        writeln!(out, "{record}")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes records as a JSON array.
pub fn render_json<W: Write>(records: &[BondRecord], out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)?;
    Ok(())
}

fn render<W: Write>(records: &[BondRecord], format: OutputFormat, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Text => render_text(records, out)?,
        OutputFormat::Json => render_json(records, out)?,
    }
    out.flush()?;
    Ok(())
}

/// Writes the report to `output`, or to stdout.
pub fn write_report(report: &ScanReport, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("can't create {}", path.display()))?;
            render(&report.records, format, &mut BufWriter::new(file))?;
            info!(path = %path.display(), bonds = report.records.len(), "report written");
        }
        None => render(&report.records, format, &mut io::stdout().lock())?,
    }
    Ok(())
}
