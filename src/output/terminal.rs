//! Terminal output formatter for reports.
//!
//! Prints a starred banner, a `|`-separated table of
//! resource / directory / size / percentage, and a total line. The partition
//! section uses the same banner followed by one line per partition.

use crate::cli::SortKey;
use crate::data::DirectorySet;
use crate::partitions::PartitionUsage;
use crate::utils::format_size;
use anyhow::Result;
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;
const HEADERS: [&str; 4] = ["Resource", "Directory", "Size", "Percentage"];

/// Writes a heading framed by lines of `*` matching the title width.
pub fn write_banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let stars = "*".repeat(title.len());
    writeln!(out, "\n")?;
    writeln!(out, "{stars}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{stars}")
}

/// Writes one report: banner, table rows in `sort_key` order, and the total.
pub fn write_report<W: Write>(
    out: &mut W,
    title: &str,
    set: &DirectorySet,
    sort_key: SortKey,
) -> io::Result<()> {
    write_banner(out, title)?;

    let rows: Vec<[String; 4]> = set
        .sorted(sort_key)
        .into_iter()
        .map(|entry| {
            [
                entry.name().to_string(),
                entry.path().display().to_string(),
                format_size(entry.size()),
                format!("{:.2}%", entry.percentage()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    write_row(out, &HEADERS.map(String::from), &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "{:>35} = {:>10}", "TOTAL", format_size(set.total_bytes()))
}

fn write_row<W: Write>(out: &mut W, cells: &[String; 4], widths: &[usize; 4]) -> io::Result<()> {
    for (cell, width) in cells.iter().zip(widths) {
        write!(out, "{:<width$} |", cell, width = width + 1)?;
    }
    writeln!(out)
}

/// Writes the partition section.
pub fn write_partitions<W: Write>(out: &mut W, partitions: &[PartitionUsage]) -> io::Result<()> {
    write_banner(out, "Disk partition info")?;
    for p in partitions {
        writeln!(
            out,
            "Device: {}, \t Mountpoint: {}, \t Fstype: {}, \t Total: {}, \t Used: {}, \t UsePercentage: {:.2}%, \t Free: {}",
            p.device,
            p.mount_point.display(),
            p.fs_type,
            format_size(p.total),
            format_size(p.used),
            p.used_percent,
            format_size(p.free)
        )?;
        writeln!(out)?;
    }
    Ok(())
}

/// Renders a report to stdout.
pub fn render(title: &str, set: &DirectorySet, sort_key: SortKey) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, title, set, sort_key)?;
    out.flush()?;
    Ok(())
}

/// Renders the partition section to stdout.
pub fn render_partitions(partitions: &[PartitionUsage]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_partitions(&mut out, partitions)?;
    out.flush()?;
    Ok(())
}
