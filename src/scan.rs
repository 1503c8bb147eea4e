//! File system size walking for `backup-size`.
//!
//! This module handles:
//! - Depth-first traversal using `WalkDir` (symlinks are not followed)
//! - Summing the byte length of every regular file under a root
//! - Pruning excluded paths before descending into them
//! - Tolerating unreadable subtrees without failing the whole walk
//!
//! The main entry point is [`SizeWalker::compute_size`], which returns a
//! [`SizeComputation`] carrying the total and the paths that were skipped.
//! Skipped paths are diagnostics only; they never turn into errors.

use crate::utils::Exclusions;
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What happened to the root of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootStatus {
    /// The root was traversed (possibly with skipped subtrees).
    #[default]
    Walked,
    /// The root does not exist. A size of zero is the legitimate answer.
    Missing,
    /// The root could not be traversed for a reason other than permissions.
    /// The size collapses to zero.
    Unreadable,
}

/// Outcome of summing one subtree.
///
/// # Fields
/// * `bytes` - Total byte length of all reachable regular files
/// * `skipped` - Directories not descended into because of permission errors
/// * `failed` - Subtrees abandoned because of other I/O errors below the root
/// * `root` - Whether the root itself could be walked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeComputation {
    pub bytes: u64,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub root: RootStatus,
}

impl SizeComputation {
    /// Emits log records describing anything the walk had to leave out.
    pub fn log_diagnostics(&self, root: &Path) {
        match self.root {
            RootStatus::Walked => {}
            RootStatus::Missing => info!("{} does not exist, counting it as 0 B", root.display()),
            RootStatus::Unreadable => warn!(
                "Couldn't traverse {}, counting it as 0 B",
                root.display()
            ),
        }

        if !self.skipped.is_empty() {
            warn!(
                "Couldn't fetch disk size for below directories due to permission denied errors: {:?}",
                self.skipped
            );
        }
        if !self.failed.is_empty() {
            warn!(
                "Couldn't fetch disk size for below directories due to I/O errors: {:?}",
                self.failed
            );
        }
    }

    /// Classifies one walk error.
    ///
    /// Permission errors are recorded in `skipped` at any depth. Other errors
    /// below the root are recorded in `failed`. Returns the root status when
    /// the error is on the root itself and the whole walk must count as 0 B.
    fn record_error(
        &mut self,
        path: PathBuf,
        kind: Option<ErrorKind>,
        depth: usize,
    ) -> Option<RootStatus> {
        match kind {
            Some(ErrorKind::PermissionDenied) => {
                self.skipped.push(path);
                None
            }
            Some(ErrorKind::NotFound) if depth == 0 => Some(RootStatus::Missing),
            _ if depth == 0 => Some(RootStatus::Unreadable),
            _ => {
                self.failed.push(path);
                None
            }
        }
    }
}

/// Sums file sizes under a root, honouring a set of exclusions.
#[derive(Debug, Clone, Default)]
pub struct SizeWalker {
    exclusions: Exclusions,
}

impl SizeWalker {
    pub fn new(exclusions: Exclusions) -> Self {
        Self { exclusions }
    }

    /// Recursively sums the byte length of every regular file under `root`.
    ///
    /// # Arguments
    /// * `root` - The file or directory to measure
    /// * `excluded` - Extra absolute paths pruned for this walk only, on top
    ///   of the walker's configured exclusions
    ///
    /// # Behavior
    /// * A directory that cannot be read because of a permission error is
    ///   recorded in `skipped` and its siblings are still visited.
    /// * Any other error below the root abandons only that subtree and is
    ///   recorded in `failed`.
    /// * A root that cannot be walked at all yields a size of zero.
    pub fn compute_size(&self, root: &Path, excluded: &[PathBuf]) -> SizeComputation {
        let mut result = SizeComputation::default();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                !self.exclusions.is_excluded(e.path())
                    && !excluded.iter().any(|x| e.path().starts_with(x))
            });

        for item in walker {
            match item {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    match entry.metadata() {
                        Ok(metadata) => result.bytes = result.bytes.saturating_add(metadata.len()),
                        // The file vanished or became unreadable between listing and stat.
                        Err(err) => debug!("Skipping {}: {}", entry.path().display(), err),
                    }
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    let kind = err.io_error().map(|e| e.kind());

                    debug!("Walk error at {}: {}", path.display(), err);
                    if let Some(status) = result.record_error(path, kind, err.depth()) {
                        return SizeComputation {
                            root: status,
                            ..SizeComputation::default()
                        };
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sums_nested_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("top.bin"), vec![0u8; 100]).unwrap();
        fs::write(root.join("a/mid.bin"), vec![0u8; 20]).unwrap();
        fs::write(root.join("a/b/leaf.bin"), vec![0u8; 3]).unwrap();

        let computation = SizeWalker::default().compute_size(root, &[]);
        assert_eq!(computation.bytes, 123);
        assert_eq!(computation.root, RootStatus::Walked);
        assert!(computation.skipped.is_empty());
        assert!(computation.failed.is_empty());
    }

    #[test]
    fn test_single_file_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join("db");
        fs::write(&file, vec![1u8; 4096]).unwrap();

        assert_eq!(SizeWalker::default().compute_size(&file, &[]).bytes, 4096);
    }

    #[test]
    fn test_missing_root_is_zero() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let computation = SizeWalker::default().compute_size(&temp_dir.path().join("nope"), &[]);
        assert_eq!(computation.bytes, 0);
        assert_eq!(computation.root, RootStatus::Missing);
    }

    #[test]
    fn test_extra_excluded_path_is_pruned() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("manifest.yaml"), vec![0u8; 50]).unwrap();
        fs::write(root.join("bin/tool"), vec![0u8; 500]).unwrap();

        let computation = SizeWalker::default().compute_size(root, &[root.join("bin")]);
        assert_eq!(computation.bytes, 50);
    }

    #[test]
    fn test_basename_exclusion() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("x/tmp")).unwrap();
        fs::write(root.join("x/keep.txt"), vec![0u8; 7]).unwrap();
        fs::write(root.join("x/tmp/drop.txt"), vec![0u8; 70]).unwrap();
        fs::write(root.join("x/trace.log"), vec![0u8; 700]).unwrap();

        let exclusions = Exclusions::new(&["tmp".to_string(), "*.log".to_string()]).unwrap();
        let computation = SizeWalker::new(exclusions).compute_size(root, &[]);
        assert_eq!(computation.bytes, 7);
    }

    #[test]
    fn test_permission_error_below_root_is_skipped() {
        let mut computation = SizeComputation {
            bytes: 512,
            ..SizeComputation::default()
        };
        let locked = PathBuf::from("/data/locked");

        let status =
            computation.record_error(locked.clone(), Some(ErrorKind::PermissionDenied), 2);
        assert_eq!(status, None);
        assert_eq!(computation.skipped, vec![locked]);
        assert!(computation.failed.is_empty());
        assert_eq!(computation.bytes, 512);
        assert_eq!(computation.root, RootStatus::Walked);
    }

    #[test]
    fn test_permission_error_on_root_does_not_collapse() {
        let mut computation = SizeComputation::default();
        let status = computation.record_error(
            PathBuf::from("/data"),
            Some(ErrorKind::PermissionDenied),
            0,
        );
        assert_eq!(status, None);
        assert_eq!(computation.skipped, vec![PathBuf::from("/data")]);
    }

    #[test]
    fn test_root_errors_collapse_the_walk() {
        let mut computation = SizeComputation::default();
        assert_eq!(
            computation.record_error(PathBuf::from("/gone"), Some(ErrorKind::NotFound), 0),
            Some(RootStatus::Missing)
        );
        assert_eq!(
            computation.record_error(PathBuf::from("/loop"), None, 0),
            Some(RootStatus::Unreadable)
        );
        assert!(computation.skipped.is_empty());
        assert!(computation.failed.is_empty());
    }

    #[test]
    fn test_other_error_below_root_is_failed() {
        let mut computation = SizeComputation::default();
        let status =
            computation.record_error(PathBuf::from("/data/bad"), Some(ErrorKind::Other), 1);
        assert_eq!(status, None);
        assert_eq!(computation.failed, vec![PathBuf::from("/data/bad")]);
        assert!(computation.skipped.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let outside = TempDir::new().expect("Failed to create temp dir");
        fs::write(outside.path().join("big"), vec![0u8; 10_000]).unwrap();
        fs::write(root.join("small"), vec![0u8; 10]).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();

        assert_eq!(SizeWalker::default().compute_size(root, &[]).bytes, 10);
    }
}
