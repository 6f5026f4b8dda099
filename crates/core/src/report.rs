//! Report formatting for a finished run
//!
//! The table layout matches what users of the old post-processing scripts
//! grep for: fixed 12/20/20 columns separated by ` | `, mean to 4 decimals,
//! Nusselt number to 2 decimals, time exactly as the directory is named.

use crate::pipeline::RunSummary;
use std::io::{self, Write};

const RULE_WIDTH: usize = 50;
const TIME_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 20;

/// Output flavour of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Fixed-width human-readable table
    #[default]
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// Pretty-printed JSON document of the whole run
    Json,
}

/// Writes a [`RunSummary`] in the configured format
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportEmitter {
    format: ReportFormat,
}

impl ReportEmitter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Write the report for `summary` to `out`.
    ///
    /// # Errors
    /// Returns any error raised by the writer.
    pub fn emit<W: Write>(&self, out: &mut W, summary: &RunSummary) -> io::Result<()> {
        match self.format {
            ReportFormat::Table => write_table(out, summary),
            ReportFormat::Csv => write_csv(out, summary),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, summary)?;
                writeln!(out)
            }
        }
    }

    /// Render the report into a string.
    ///
    /// # Errors
    /// Returns an error if the summary cannot be serialized.
    pub fn render(&self, summary: &RunSummary) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.emit(&mut buffer, summary)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn rule<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn write_table<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "--- Starting Nusselt Number Calculation ---")?;
    writeln!(
        out,
        "Characteristic Length (L): {}",
        summary.constants.characteristic_length
    )?;
    writeln!(
        out,
        "Fluid Thermal Conductivity (k): {}",
        summary.constants.thermal_conductivity
    )?;
    rule(out)?;
    writeln!(
        out,
        "{:<tw$} | {:<vw$} | {:<vw$}",
        "Time [s]",
        "Avg. h [W/m^2K]",
        "Nusselt Number (Nu)",
        tw = TIME_WIDTH,
        vw = VALUE_WIDTH
    )?;
    rule(out)?;

    for record in &summary.records {
        writeln!(
            out,
            "{:<tw$} | {:<vw$.4} | {:<vw$.2}",
            record.label,
            *record.mean_h,
            record.nusselt,
            tw = TIME_WIDTH,
            vw = VALUE_WIDTH
        )?;
    }

    rule(out)?;
    writeln!(out, "--- Calculation Complete ---")
}

fn write_csv<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "time,mean_h,nusselt")?;
    for record in &summary.records {
        writeln!(
            out,
            "{},{:.4},{:.2}",
            record.label, *record.mean_h, record.nusselt
        )?;
    }
    Ok(())
}
