//! CLI interface definitions for the `backup-size` application.
//!
//! This module defines command-line arguments using [`clap`] and exposes:
//!
//! - [`Args`]: the main struct parsed from CLI inputs
//! - [`SortKey`]: an enum for ordering report rows by `name` or `size`
//! - [`CsvEntry`]: one exported report row
//!
//! # Example
//!
//! ```bash
//! backup-size actual --config nodes.json --sort size --output sizes.csv
//! ```
//!
//! The positional `MODE` is kept as a raw string on purpose: it is validated
//! by [`crate::report::Mode::from_arg`] so an unknown value maps to exit code 1.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the `backup-size` estimator.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "backup-size", version, about)]
pub struct Args {
    /// Optional mode; `actual` also reports what was written to the recovery target
    #[arg(value_name = "MODE")]
    pub mode: Option<String>,

    /// JSON file describing the resources to measure (defaults to the built-in list)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory whose children are measured in `actual` mode
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Exclude absolute paths or entries with matching names (e.g., '/etc/pki', '*.log')
    #[arg(long, value_name = "PATTERN", num_args = 1.., action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Sort report rows by name or size
    #[arg(long, value_enum, default_value_t = SortKey::Name)]
    pub sort: SortKey,

    /// Also write the report rows to a CSV file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Limit the number of threads measuring resources (default: use all available)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Skip the disk partition section
    #[arg(long, default_value_t = false)]
    pub no_partitions: bool,
}

/// Enum for specifying how to order report rows.
///
/// # Variants
/// * `Name` - Alphabetically by resource name
/// * `Size` - By size in descending order (largest first)
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum SortKey {
    #[default]
    Name,
    Size,
}

/// A single record of output (used for CSV serialization).
///
/// # Fields
/// * `report` - "estimate" or "actual"
/// * `resource` - Resource name
/// * `path` - Measured path
/// * `size_bytes` - Size in bytes
/// * `size_human` - Human-readable size (e.g., "1.50 GiB")
/// * `percentage` - Share of the report total, two decimals
#[derive(Debug, serde::Serialize)]
pub struct CsvEntry {
    pub report: String,
    pub resource: String,
    pub path: String,
    pub size_bytes: u64,
    pub size_human: String,
    pub percentage: String,
}
