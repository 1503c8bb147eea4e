//! Utility functions for the `backup-size` tool.
//!
//! This module provides:
//! - Human-readable size formatting on a binary (1024-based) unit ladder
//! - Exclusion matching for absolute paths and basename glob patterns
//! - Report row ordering
//!
//! Used by the walker, the report builder and both renderers.

use crate::cli::SortKey;
use crate::data::DirectoryEntry;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Units used by [`format_size`]. ZiB is the ceiling; nothing scales past it.
const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "EiB", "ZiB"];

/// Formats a byte count as a human-readable string with two decimals.
///
/// The value is divided by 1024 while it is at least 1024 and a larger unit
/// remains, so `1536` becomes `"1.50 KiB"` and `0` becomes `"0.00 B"`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Compiles basename patterns into a `GlobSet` matcher.
pub fn build_exclude_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build glob set")
}

/// Paths left out of size accounting.
///
/// Entries starting with `/` are absolute paths: the path itself and anything
/// below it are excluded. Every other entry is matched against the final
/// component of a path and may use glob syntax (`*.log`, `bin`).
#[derive(Debug, Clone)]
pub struct Exclusions {
    absolute: Vec<PathBuf>,
    basenames: GlobSet,
}

impl Exclusions {
    /// Builds a matcher from a mixed list of absolute paths and basename patterns.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut absolute = Vec::new();
        let mut basenames = Vec::new();

        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            if pattern.starts_with('/') {
                absolute.push(PathBuf::from(pattern));
            } else {
                basenames.push(pattern.to_string());
            }
        }

        Ok(Self {
            absolute,
            basenames: build_exclude_matcher(&basenames)?,
        })
    }

    /// A matcher that excludes nothing.
    pub fn none() -> Self {
        Self {
            absolute: Vec::new(),
            basenames: GlobSet::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.absolute.is_empty() && self.basenames.is_empty()
    }

    /// Returns true if `path` is covered by any configured exclusion.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.absolute.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        path.file_name()
            .map(|name| self.basenames.is_match(Path::new(name)))
            .unwrap_or(false)
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::none()
    }
}

/// Orders report rows.
///
/// # Behavior
/// * `SortKey::Size` - Largest first, ties broken by name
/// * `SortKey::Name` - Resource name in ascending order
pub fn sort_entries(entries: &mut [&DirectoryEntry], sort_key: SortKey) {
    match sort_key {
        SortKey::Size => entries.sort_by(|a, b| match b.size().cmp(&a.size()) {
            Ordering::Equal => a.name().cmp(b.name()),
            other => other,
        }),
        SortKey::Name => entries.sort_by(|a, b| a.name().cmp(b.name())),
    }
}
