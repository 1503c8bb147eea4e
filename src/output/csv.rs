//! CSV output formatter for reports.
//!
//! Every row of every report produced in a run is written to one file, with
//! a `report` column telling estimate rows from actual rows.

use crate::cli::{CsvEntry, SortKey};
use crate::data::DirectorySet;
use crate::report::ReportKind;
use crate::utils::format_size;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io;
use std::path::Path;

/// Serializes the rows of `reports` to `writer`.
pub fn write_reports<W: io::Write>(
    writer: W,
    reports: &[(ReportKind, &DirectorySet)],
    sort_key: SortKey,
) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);

    for (kind, set) in reports {
        for entry in set.sorted(sort_key) {
            csv_writer.serialize(CsvEntry {
                report: kind.as_str().into(),
                resource: entry.name().to_string(),
                path: entry.path().display().to_string(),
                size_bytes: entry.size(),
                size_human: format_size(entry.size()),
                percentage: format!("{:.2}", entry.percentage()),
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes the rows of `reports` to the CSV file at `path`.
pub fn render(
    path: &Path,
    reports: &[(ReportKind, &DirectorySet)],
    sort_key: SortKey,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    write_reports(file, reports, sort_key)
        .with_context(|| format!("Failed to write CSV file {}", path.display()))?;
    eprintln!("CSV output written to: {}", path.display());
    Ok(())
}
