//! Declarative description of what gets measured.
//!
//! [`EstimateConfig`] replaces a hard-coded resource table: the defaults
//! describe an OpenShift/Kubernetes control-plane node, and a JSON file
//! passed with `--config` can substitute any other set of paths.
//!
//! ```json
//! {
//!   "resources": [
//!     { "name": "cluster", "path": "/var/lib/etcd/member/snap/db" },
//!     { "name": "usrLocal", "path": "/usr/local", "exempt": ["/usr/local/share"] }
//!   ],
//!   "merge": null,
//!   "exclude": ["*.swp"]
//! }
//! ```
//!
//! Omitted fields take their defaults. Note that `merge` defaults to the
//! static-pods rule, so a custom resource list without `staticPods` and
//! `cluster` entries must set `"merge": null`.

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the post-backup recovery data lives by default.
pub const DEFAULT_ACTUAL_TARGET: &str = "/var/recovery";

/// One named location to measure.
///
/// # Fields
/// * `name` - Resource name, unique within a report
/// * `path` - Absolute path of the file or directory
/// * `exempt` - Paths below `path` left out of this resource's size
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub exempt: Vec<PathBuf>,
}

impl ResourceSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            exempt: Vec::new(),
        }
    }

    pub fn with_exempt(mut self, path: impl Into<PathBuf>) -> Self {
        self.exempt.push(path.into());
        self
    }
}

/// Folds one resource into another after removing a nested subpath.
///
/// The size of `excluded_subpath` is subtracted from `from`, what remains is
/// added to `to`, and `from` disappears from the report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRule {
    pub from: String,
    pub to: String,
    pub excluded_subpath: PathBuf,
}

/// Everything the estimate and actual reports need to know.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EstimateConfig {
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceSpec>,
    #[serde(default = "default_merge")]
    pub merge: Option<MergeRule>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_actual_target")]
    pub actual_target: PathBuf,
    #[serde(default = "default_partition_mounts")]
    pub partition_mounts: Vec<PathBuf>,
}

fn default_resources() -> Vec<ResourceSpec> {
    vec![
        ResourceSpec::new("cluster", "/var/lib/etcd/member/snap/db"),
        ResourceSpec::new("staticPods", "/etc/kubernetes/static-pod-resources/"),
        ResourceSpec::new("usrLocal", "/usr/local"),
        ResourceSpec::new("kubelet", "/var/lib/kubelet"),
        ResourceSpec::new("etc", "/etc"),
    ]
}

fn default_merge() -> Option<MergeRule> {
    Some(MergeRule {
        from: "staticPods".to_string(),
        to: "cluster".to_string(),
        excluded_subpath: PathBuf::from("/etc/kubernetes/static-pod-resources/bin/"),
    })
}

fn default_actual_target() -> PathBuf {
    PathBuf::from(DEFAULT_ACTUAL_TARGET)
}

fn default_partition_mounts() -> Vec<PathBuf> {
    vec![PathBuf::from("/sysroot"), PathBuf::from("/boot")]
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            resources: default_resources(),
            merge: default_merge(),
            exclude: Vec::new(),
            actual_target: default_actual_target(),
            partition_mounts: default_partition_mounts(),
        }
    }
}

impl EstimateConfig {
    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Invalid configuration JSON")
    }

    /// Layers command-line overrides on top of the loaded configuration.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(target) = &args.target {
            self.actual_target = target.clone();
        }
        self.exclude.extend(args.exclude.iter().cloned());
    }
}
