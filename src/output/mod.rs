//! Output formatters for `backup-size` reports.
//!
//! # Available Formatters
//!
//! - **Terminal**: banner, aligned table and total line on stdout
//! - **CSV**: machine-readable rows for every report of a run
//!
//! Formatters receive finished [`crate::data::DirectorySet`]s and do no
//! measuring of their own.

pub mod csv;
pub mod terminal;

/// CSV output renderer function.
///
/// See [`csv::render`] for full documentation.
pub use self::csv::render as render_csv;
