//! Disk partition usage for the partition section of the report.
//!
//! Mounted disks are enumerated through [`sysinfo::Disks`] and narrowed down
//! to the mount points the configuration asks for. Nothing here is fatal:
//! missing mounts are logged and simply absent from the result.

use log::warn;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Space accounting for one mounted partition.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionUsage {
    pub device: String,
    pub mount_point: PathBuf,
    pub fs_type: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

impl PartitionUsage {
    /// Derives used space and used percentage from total and available bytes.
    pub fn from_space(
        device: impl Into<String>,
        mount_point: impl Into<PathBuf>,
        fs_type: impl Into<String>,
        total: u64,
        available: u64,
    ) -> Self {
        let free = available.min(total);
        let used = total - free;
        let used_percent = if total == 0 {
            0.0
        } else {
            used as f64 * 100.0 / total as f64
        };

        Self {
            device: device.into(),
            mount_point: mount_point.into(),
            fs_type: fs_type.into(),
            total,
            used,
            free,
            used_percent,
        }
    }
}

/// Returns usage for each mounted partition whose mount point is in `mounts`.
pub fn partition_usage(mounts: &[PathBuf]) -> Vec<PartitionUsage> {
    let disks = Disks::new_with_refreshed_list();
    if disks.list().is_empty() {
        warn!("The operating system reported no mounted partitions");
    }

    let all = disks
        .list()
        .iter()
        .map(|disk| {
            PartitionUsage::from_space(
                disk.name().to_string_lossy(),
                disk.mount_point(),
                disk.file_system().to_string_lossy(),
                disk.total_space(),
                disk.available_space(),
            )
        })
        .collect();

    select_mounts(all, mounts)
}

/// Keeps the partitions mounted at one of `mounts`, in the order given.
pub fn select_mounts(all: Vec<PartitionUsage>, mounts: &[PathBuf]) -> Vec<PartitionUsage> {
    let mut selected = Vec::new();
    for mount in mounts {
        match all.iter().find(|p| same_mount(&p.mount_point, mount)) {
            Some(partition) => selected.push(partition.clone()),
            None => warn!("No partition mounted at {}", mount.display()),
        }
    }
    selected
}

fn same_mount(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_space() {
        let usage = PartitionUsage::from_space("/dev/sda1", "/boot", "xfs", 1000, 250);
        assert_eq!(usage.used, 750);
        assert_eq!(usage.free, 250);
        assert!((usage.used_percent - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_space_zero_total() {
        let usage = PartitionUsage::from_space("tmpfs", "/run", "tmpfs", 0, 0);
        assert_eq!(usage.used_percent, 0.0);
    }

    #[test]
    fn test_select_mounts() {
        let all = vec![
            PartitionUsage::from_space("/dev/sda1", "/boot", "xfs", 100, 50),
            PartitionUsage::from_space("/dev/sda2", "/", "xfs", 100, 10),
            PartitionUsage::from_space("/dev/sda3", "/sysroot", "xfs", 100, 90),
        ];

        let selected = select_mounts(
            all,
            &[PathBuf::from("/sysroot"), PathBuf::from("/boot/"), PathBuf::from("/srv")],
        );
        let devices: Vec<_> = selected.iter().map(|p| p.device.as_str()).collect();
        assert_eq!(devices, ["/dev/sda3", "/dev/sda1"]);
    }
}
