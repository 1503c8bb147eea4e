//! Data structures for representing measured directories.
//!
//! A report is assembled in two stages:
//!
//! 1. [`DirectorySetBuilder`] collects one [`DirectoryEntry`] per resource and
//!    optionally applies a single merge/reallocation step.
//! 2. [`DirectorySetBuilder::compute_percentages`] consumes the builder and
//!    returns a read-only [`DirectorySet`] with totals and percentages.
//!
//! Because the builder is consumed, a merge can never run after percentages
//! have been computed.

use crate::cli::SortKey;
use crate::config::MergeRule;
use crate::scan::SizeWalker;
use crate::utils::sort_entries;
use log::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named, measured location.
///
/// Entries are values: operations that change a size return a new entry, so
/// the path and name always travel with it.
///
/// # Fields
/// * `name` - Resource name, unique within a set
/// * `path` - The measured path
/// * `size` - Size in bytes
/// * `percentage` - Share of the set total; 0 until percentages are computed
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    name: String,
    path: PathBuf,
    size: u64,
    percentage: f64,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            percentage: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    fn with_size(&self, size: u64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    fn with_share_of(self, total: u64) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            self.size as f64 * 100.0 / total as f64
        };
        Self { percentage, ..self }
    }
}

/// Merge precondition violations.
///
/// These indicate a wrong configuration rather than bad runtime input, and
/// the caller is expected to stop instead of printing a misleading report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("cannot merge: no entry named '{0}'")]
    MissingEntry(String),
    #[error("cannot merge entry '{0}' into itself")]
    SameEntry(String),
    #[error("a merge has already been applied to this set")]
    AlreadyApplied,
}

/// Mutable stage of a report: entries are added and at most one merge runs.
#[derive(Debug, Default)]
pub struct DirectorySetBuilder {
    entries: BTreeMap<String, DirectoryEntry>,
    merged: bool,
}

impl DirectorySetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the entry for `name`, replacing any previous one.
    pub fn add_entry(&mut self, name: impl Into<String>, path: impl Into<PathBuf>, size: u64) {
        let entry = DirectoryEntry::new(name, path, size);
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all current entry sizes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }

    /// Applies `rule`, measuring its excluded subpath with `walker`.
    ///
    /// `from_exempt` must be the exempt list the `from` entry was measured
    /// with. Only bytes that walk counted are subtracted: the excluded
    /// subpath is walked with the same exemptions, and a subpath outside the
    /// `from` path subtracts nothing.
    ///
    /// Preconditions are checked before anything is walked.
    pub fn merge_reallocate(
        &mut self,
        rule: &MergeRule,
        walker: &SizeWalker,
        from_exempt: &[PathBuf],
    ) -> Result<(), MergeError> {
        self.check_merge(&rule.from, &rule.to)?;

        let counted_in_source = self
            .entries
            .get(&rule.from)
            .is_some_and(|source| rule.excluded_subpath.starts_with(source.path()));

        let excluded_bytes = if counted_in_source {
            let excluded = walker.compute_size(&rule.excluded_subpath, from_exempt);
            excluded.log_diagnostics(&rule.excluded_subpath);
            excluded.bytes
        } else {
            warn!(
                "{} is not under '{}'; nothing to subtract before folding into '{}'",
                rule.excluded_subpath.display(),
                rule.from,
                rule.to
            );
            0
        };

        self.reallocate(&rule.from, &rule.to, excluded_bytes)
    }

    /// Moves `from`'s size, minus `excluded_bytes`, onto `to` and drops `from`.
    ///
    /// Can be applied once per set.
    pub fn reallocate(
        &mut self,
        from: &str,
        to: &str,
        excluded_bytes: u64,
    ) -> Result<(), MergeError> {
        self.check_merge(from, to)?;

        let (Some(source), Some(target)) = (self.entries.get(from), self.entries.get(to)) else {
            return Err(MergeError::MissingEntry(from.to_string()));
        };

        if excluded_bytes > source.size {
            warn!(
                "Excluded subpath ({} B) is larger than '{}' ({} B); folding 0 B into '{}'",
                excluded_bytes, from, source.size, to
            );
        }
        let adjusted = source.size.saturating_sub(excluded_bytes);
        let merged = target.with_size(target.size.saturating_add(adjusted));

        self.entries.insert(to.to_string(), merged);
        self.entries.remove(from);
        self.merged = true;
        Ok(())
    }

    fn check_merge(&self, from: &str, to: &str) -> Result<(), MergeError> {
        if self.merged {
            return Err(MergeError::AlreadyApplied);
        }
        if from == to {
            return Err(MergeError::SameEntry(from.to_string()));
        }
        for key in [from, to] {
            if !self.entries.contains_key(key) {
                return Err(MergeError::MissingEntry(key.to_string()));
            }
        }
        Ok(())
    }

    /// Finalizes the set: computes the total and every entry's percentage.
    ///
    /// A zero total yields 0% for every entry and a warning.
    pub fn compute_percentages(self) -> DirectorySet {
        let total_bytes = self.total_bytes();
        if total_bytes == 0 && !self.entries.is_empty() {
            warn!("Total size is 0 B; reporting every percentage as 0.00%");
        }

        let entries = self
            .entries
            .into_iter()
            .map(|(name, entry)| (name, entry.with_share_of(total_bytes)))
            .collect();

        DirectorySet {
            entries,
            total_bytes,
        }
    }
}

/// Read-only, fully computed report data.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySet {
    entries: BTreeMap<String, DirectoryEntry>,
    total_bytes: u64,
}

impl DirectorySet {
    pub fn get(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.values()
    }

    /// Entries ordered by `sort_key`.
    pub fn sorted(&self, sort_key: SortKey) -> Vec<&DirectoryEntry> {
        let mut rows: Vec<_> = self.entries.values().collect();
        sort_entries(&mut rows, sort_key);
        rows
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
