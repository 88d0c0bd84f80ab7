//! Disk layout detection
//!
//! Linux reads physical block devices from /sys/block. Other platforms fall
//! back to the volumes sysinfo can see.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// One physical disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskDevice {
    /// "NVMe", "SSD", "HD" or "Unknown"
    pub device_type: String,
    /// Kernel/device name (e.g., "nvme0n1", "sda")
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub vendor: String,
    pub model: String,
}

impl DiskDevice {
    /// "vendor model", skipping whichever part is missing
    pub fn description(&self) -> String {
        [self.vendor.as_str(), self.model.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Detect the physical disk layout
pub fn detect() -> Result<Vec<DiskDevice>, QueryError> {
    #[cfg(target_os = "linux")]
    {
        let root = std::path::Path::new("/sys/block");
        if root.exists() {
            return read_block_devices(root);
        }
        tracing::warn!("/sys/block not available; falling back to mounted volumes");
    }

    Ok(volumes_from_sysinfo())
}

/// Virtual and pseudo block devices that are not disks
fn is_physical_block_device(name: &str) -> bool {
    const VIRTUAL_PREFIXES: [&str; 7] = ["loop", "ram", "zram", "dm-", "md", "sr", "fd"];
    !VIRTUAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

fn classify_disk(name: &str, rotational: Option<&str>) -> &'static str {
    if name.starts_with("nvme") {
        return "NVMe";
    }
    match rotational.map(str::trim) {
        Some("0") => "SSD",
        Some("1") => "HD",
        _ => "Unknown",
    }
}

/// Read every physical block device below a /sys/block-shaped directory
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn read_block_devices(root: &std::path::Path) -> Result<Vec<DiskDevice>, QueryError> {
    use super::read_attr;

    let mut disks = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_physical_block_device(&name) {
            continue;
        }

        let path = entry.path();
        let sectors: u64 = read_attr(path.join("size"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        if sectors == 0 {
            // Empty card readers and ejected media
            continue;
        }

        let rotational = read_attr(path.join("queue/rotational"));
        disks.push(DiskDevice {
            device_type: classify_disk(&name, rotational.as_deref()).to_string(),
            size: sectors * 512,
            vendor: read_attr(path.join("device/vendor")).unwrap_or_default(),
            model: read_attr(path.join("device/model")).unwrap_or_default(),
            name,
        });
    }

    disks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(disks)
}

fn volumes_from_sysinfo() -> Vec<DiskDevice> {
    use sysinfo::{DiskKind, Disks};

    let disks = Disks::new_with_refreshed_list();
    let mut devices: Vec<DiskDevice> = Vec::new();
    for disk in disks.list() {
        let name = disk.name().to_string_lossy().into_owned();
        if devices.iter().any(|d| d.name == name) {
            continue;
        }
        let device_type = match disk.kind() {
            DiskKind::SSD => "SSD",
            DiskKind::HDD => "HD",
            DiskKind::Unknown(_) => "Unknown",
        };
        devices.push(DiskDevice {
            device_type: device_type.to_string(),
            name,
            size: disk.total_space(),
            vendor: String::new(),
            model: String::new(),
        });
    }
    devices
}
