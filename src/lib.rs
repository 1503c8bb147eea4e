//! Library crate for backup-size
//!
//! This exposes the modules needed for testing and potential library usage.
//!
//! # Features
//!
//! - **Size Walking**: Sum file sizes under a path, skipping unreadable subtrees
//! - **Directory Sets**: Named sizes with percentages and a one-shot merge step
//! - **Reports**: Estimate (configured resources) and actual (target children) flows
//! - **Partitions**: Usage of selected mount points
//! - **Output**: Terminal and CSV renderers
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Declarative resource configuration
//! - [`data`]: `DirectoryEntry`, `DirectorySetBuilder`, `DirectorySet`
//! - [`logging`]: Logger that suspends progress spinners while writing
//! - [`output`]: Terminal and CSV formatters
//! - [`partitions`]: Mounted partition usage
//! - [`report`]: Mode selection and report assembly
//! - [`scan`]: The size walker
//! - [`utils`]: Size formatting, exclusions and sorting

pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod output;
pub mod partitions;
pub mod report;
pub mod scan;
pub mod utils;

pub use cli::Args;
pub use config::{EstimateConfig, MergeRule, ResourceSpec};
pub use data::{DirectoryEntry, DirectorySet, DirectorySetBuilder, MergeError};
pub use report::{Mode, ModeError, ReportBuilder, ReportError, ReportKind};
pub use scan::{RootStatus, SizeComputation, SizeWalker};
pub use utils::{Exclusions, format_size};
