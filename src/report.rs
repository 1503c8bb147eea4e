//! Report assembly for the estimate and actual flows.
//!
//! - **Estimate** measures every configured resource, applies the configured
//!   merge rule once, then computes percentages.
//! - **Actual** measures each immediate child of a target directory, with no
//!   merge step.
//!
//! Sizes for different entries are computed on the rayon pool; the merge and
//! the percentage computation run afterwards on the calling thread, once the
//! full set is known.

use crate::config::EstimateConfig;
use crate::data::{DirectorySet, DirectorySetBuilder, MergeError};
use crate::scan::SizeWalker;
use log::{debug, warn};
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The mode keyword that enables the actual report.
pub const ACTUAL_MODE_KEYWORD: &str = "actual";

/// Which reports a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Estimate report only (no mode token given).
    Estimate,
    /// Estimate report followed by the actual report.
    EstimateAndActual,
}

/// The mode token was not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("Couldn't understand the mode parameter, only allowed param is <actual> but found {0}")]
    Invalid(String),
}

impl Mode {
    /// Parses the optional positional mode token.
    pub fn from_arg(token: Option<&str>) -> Result<Self, ModeError> {
        match token {
            None | Some("") => Ok(Mode::Estimate),
            Some(ACTUAL_MODE_KEYWORD) => Ok(Mode::EstimateAndActual),
            Some(other) => Err(ModeError::Invalid(other.to_string())),
        }
    }
}

/// The two kinds of report a run can print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Estimate,
    Actual,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Estimate => "Pre-backup estimated disk size",
            ReportKind::Actual => "Post-backup actual disk used",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Estimate => "estimate",
            ReportKind::Actual => "actual",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to list {}: {source}", .path.display())]
    ListTarget { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Builds [`DirectorySet`]s using a shared [`SizeWalker`].
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder<'a> {
    walker: &'a SizeWalker,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(walker: &'a SizeWalker) -> Self {
        Self { walker }
    }

    /// Measures the configured resources and applies the merge rule.
    ///
    /// # Errors
    /// Returns [`ReportError::Merge`] when the merge rule names an entry that
    /// is not in the set. Unreadable or missing resources are logged and
    /// counted as whatever could be measured.
    pub fn estimate(&self, config: &EstimateConfig) -> Result<DirectorySet, ReportError> {
        let sizes: Vec<u64> = config
            .resources
            .par_iter()
            .map(|resource| {
                if let Err(err) = fs::symlink_metadata(&resource.path) {
                    warn!("{}: {}", resource.path.display(), err);
                }
                let computation = self.walker.compute_size(&resource.path, &resource.exempt);
                computation.log_diagnostics(&resource.path);
                computation.bytes
            })
            .collect();

        let mut builder = DirectorySetBuilder::new();
        for (resource, size) in config.resources.iter().zip(sizes) {
            debug!("{} ({}) = {} B", resource.name, resource.path.display(), size);
            builder.add_entry(resource.name.clone(), resource.path.clone(), size);
        }

        if let Some(rule) = &config.merge {
            // A repeated name replaced earlier entries, so the last spec wins.
            let from_exempt = config
                .resources
                .iter()
                .rev()
                .find(|r| r.name == rule.from)
                .map(|r| r.exempt.as_slice())
                .unwrap_or_default();
            builder.merge_reallocate(rule, self.walker, from_exempt)?;
        }

        Ok(builder.compute_percentages())
    }

    /// Measures every immediate child (file or directory) of `target`.
    ///
    /// # Errors
    /// Returns [`ReportError::ListTarget`] if `target` cannot be listed.
    pub fn actual(&self, target: &Path) -> Result<DirectorySet, ReportError> {
        let list_error = |source: io::Error| ReportError::ListTarget {
            path: target.to_path_buf(),
            source,
        };

        let children = fs::read_dir(target)
            .map_err(list_error)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(list_error)?;

        let measured: Vec<(OsString, PathBuf, u64)> = children
            .into_par_iter()
            .map(|name| {
                let path = target.join(&name);
                let computation = self.walker.compute_size(&path, &[]);
                computation.log_diagnostics(&path);
                (name, path, computation.bytes)
            })
            .collect();

        let mut builder = DirectorySetBuilder::new();
        for (name, path, size) in measured {
            let key = unique_key(&builder, child_key(name));
            builder.add_entry(key, path, size);
        }
        Ok(builder.compute_percentages())
    }
}

/// Report key for a directory child. Names that are not valid UTF-8 keep
/// their raw bytes in escaped form so distinct names stay distinct.
fn child_key(name: OsString) -> String {
    name.into_string().unwrap_or_else(|raw| format!("{:?}", raw))
}

/// Appends a counter to `key` if the builder already holds it.
fn unique_key(builder: &DirectorySetBuilder, key: String) -> String {
    if builder.get(&key).is_none() {
        return key;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{key} ({n})");
        if builder.get(&candidate).is_none() {
            warn!("Two children map to the name '{key}'; reporting one as '{candidate}'");
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_arg() {
        assert_eq!(Mode::from_arg(None), Ok(Mode::Estimate));
        assert_eq!(Mode::from_arg(Some("")), Ok(Mode::Estimate));
        assert_eq!(Mode::from_arg(Some("actual")), Ok(Mode::EstimateAndActual));
        assert_eq!(
            Mode::from_arg(Some("foo")),
            Err(ModeError::Invalid("foo".to_string()))
        );
        assert!(Mode::from_arg(Some("Actual")).is_err());
    }

    #[test]
    fn test_mode_error_message() {
        let err = Mode::from_arg(Some("foo")).unwrap_err();
        assert!(err.to_string().contains("<actual>"));
        assert!(err.to_string().ends_with("foo"));
    }

    #[test]
    fn test_child_key_keeps_utf8_names() {
        assert_eq!(child_key(OsString::from("snapshot.db")), "snapshot.db");
    }

    #[cfg(unix)]
    #[test]
    fn test_child_key_distinguishes_non_utf8_names() {
        use std::os::unix::ffi::OsStringExt;

        let a = child_key(OsString::from_vec(b"a\xff".to_vec()));
        let b = child_key(OsString::from_vec(b"a\xfe".to_vec()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unique_key_appends_counter() {
        let mut builder = DirectorySetBuilder::new();
        builder.add_entry("data", "/t/data", 1);
        assert_eq!(unique_key(&builder, "other".to_string()), "other");
        assert_eq!(unique_key(&builder, "data".to_string()), "data (2)");

        builder.add_entry("data (2)", "/t/x", 1);
        assert_eq!(unique_key(&builder, "data".to_string()), "data (3)");
    }

    #[test]
    fn test_report_kind() {
        assert_eq!(ReportKind::Estimate.as_str(), "estimate");
        assert_eq!(ReportKind::Actual.title(), "Post-backup actual disk used");
    }
}
