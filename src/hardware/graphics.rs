//! GPU detection module
//!
//! Lists every graphics controller using:
//! - NVIDIA: nvidia-smi for VRAM and driver version (cross-platform)
//! - Linux: lspci output, /sys/class/drm as a last resort
//! - macOS: system_profiler SPDisplaysDataType
//! - Windows: WMI (win32_VideoController)

use serde::{Deserialize, Serialize};

use super::command_output;
use crate::error::QueryError;

/// One graphics controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicsController {
    /// Vendor (e.g., "NVIDIA Corporation")
    pub vendor: String,
    /// Model (e.g., "GeForce RTX 3070")
    pub model: String,
    /// VRAM in MB (if detectable)
    pub vram_mb: Option<u64>,
    /// Driver version (if detectable)
    pub driver_version: Option<String>,
}

/// All graphics controllers found on the machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphicsInfo {
    pub controllers: Vec<GraphicsController>,
}

impl GraphicsInfo {
    /// Detect graphics controllers. Finding none is not an error.
    pub fn detect() -> Result<Self, QueryError> {
        let nvidia = command_output(
            "nvidia-smi",
            &[
                "--query-gpu=name,memory.total,driver_version",
                "--format=csv,noheader,nounits",
            ],
        )
        .map(|stdout| parse_nvidia_smi(&stdout))
        .unwrap_or_default();

        #[cfg(target_os = "linux")]
        let controllers = linux_controllers(nvidia);

        #[cfg(target_os = "macos")]
        let controllers = {
            let profiled = command_output("system_profiler", &["SPDisplaysDataType"])
                .map(|stdout| parse_system_profiler(&stdout))
                .unwrap_or_default();
            if profiled.is_empty() {
                nvidia
            } else {
                profiled
            }
        };

        #[cfg(target_os = "windows")]
        let controllers = {
            let wmi = command_output(
                "wmic",
                &[
                    "path",
                    "win32_VideoController",
                    "get",
                    "Name,AdapterRAM,DriverVersion",
                    "/format:csv",
                ],
            )
            .map(|stdout| parse_wmic_csv(&stdout))
            .unwrap_or_default();
            merge_nvidia_details(wmi, nvidia)
        };

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        let controllers = nvidia;

        if controllers.is_empty() {
            tracing::debug!("no graphics controller detected");
        }

        Ok(GraphicsInfo { controllers })
    }
}

/// Best-effort vendor name from a device name.
fn vendor_from_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.contains("nvidia") || lower.contains("geforce") || lower.contains("quadro") {
        "NVIDIA".to_string()
    } else if lower.contains("amd") || lower.contains("radeon") || lower.contains("ati ") {
        "AMD".to_string()
    } else if lower.contains("intel") || lower.contains("iris") || lower.contains("uhd") {
        "Intel".to_string()
    } else if lower.contains("apple") {
        "Apple".to_string()
    } else {
        name.split_whitespace().next().unwrap_or("Unknown").to_string()
    }
}

/// Parse `name, memory.total, driver_version` lines from nvidia-smi.
fn parse_nvidia_smi(stdout: &str) -> Vec<GraphicsController> {
    stdout
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if parts.len() < 3 || parts[0].is_empty() {
                return None;
            }
            let model = parts[0].trim_start_matches("NVIDIA ").to_string();
            Some(GraphicsController {
                vendor: "NVIDIA".to_string(),
                model,
                vram_mb: parts[1].parse().ok(),
                driver_version: Some(parts[2].to_string()).filter(|d| !d.is_empty()),
            })
        })
        .collect()
}

/// Copy VRAM and driver details from nvidia-smi onto NVIDIA controllers, in
/// order. Falls back to the nvidia-smi list when nothing else was found.
#[cfg_attr(not(any(test, target_os = "linux", target_os = "windows")), allow(dead_code))]
fn merge_nvidia_details(
    mut controllers: Vec<GraphicsController>,
    nvidia: Vec<GraphicsController>,
) -> Vec<GraphicsController> {
    if controllers.is_empty() {
        return nvidia;
    }

    let mut details = nvidia.into_iter();
    for controller in controllers
        .iter_mut()
        .filter(|c| vendor_from_name(&c.vendor) == "NVIDIA")
    {
        let Some(detail) = details.next() else {
            break;
        };
        controller.vram_mb = controller.vram_mb.or(detail.vram_mb);
        controller.driver_version = controller.driver_version.take().or(detail.driver_version);
    }
    controllers
}

/// Parse one lspci display-class line into a controller.
///
/// Format: `01:00.0 VGA compatible controller: NVIDIA Corporation GA104 [GeForce RTX 3070] (rev a1)`
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn parse_lspci_line(line: &str) -> Option<GraphicsController> {
    const CLASSES: [&str; 3] = ["VGA compatible controller", "3D controller", "Display controller"];
    if !CLASSES.iter().any(|class| line.contains(class)) {
        return None;
    }

    let (_, description) = line.split_once(": ")?;
    let description = match description.rfind(" (rev") {
        Some(idx) => &description[..idx],
        None => description,
    };

    const KNOWN_VENDORS: [&str; 4] = [
        "NVIDIA Corporation",
        "Advanced Micro Devices, Inc. [AMD/ATI]",
        "Intel Corporation",
        "VMware",
    ];
    let (vendor, rest) = KNOWN_VENDORS
        .iter()
        .find_map(|vendor| {
            description
                .strip_prefix(vendor)
                .map(|rest| (vendor.to_string(), rest.trim()))
        })
        .unwrap_or_else(|| match description.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.trim()),
            None => (description.to_string(), ""),
        });

    // Prefer the marketing name in brackets: "GA104 [GeForce RTX 3070]"
    let model = match (rest.rfind('['), rest.rfind(']')) {
        (Some(open), Some(close)) if open < close => rest[open + 1..close].to_string(),
        _ => rest.to_string(),
    };

    Some(GraphicsController {
        vendor,
        model,
        vram_mb: None,
        driver_version: None,
    })
}

#[cfg(target_os = "linux")]
fn linux_controllers(nvidia: Vec<GraphicsController>) -> Vec<GraphicsController> {
    let mut controllers: Vec<GraphicsController> = command_output("lspci", &[])
        .map(|stdout| stdout.lines().filter_map(parse_lspci_line).collect())
        .unwrap_or_default();

    if controllers.is_empty() && nvidia.is_empty() {
        controllers = sysfs_controllers();
    }

    let mut controllers = merge_nvidia_details(controllers, nvidia);
    apply_amd_vram(&mut controllers);
    controllers
}

/// PCI vendor id to vendor name, as found in /sys/class/drm/card*/device/vendor
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn pci_vendor_name(vendor_id: &str) -> Option<&'static str> {
    match vendor_id.trim() {
        "0x10de" => Some("NVIDIA Corporation"),
        "0x1002" => Some("Advanced Micro Devices, Inc. [AMD/ATI]"),
        "0x8086" => Some("Intel Corporation"),
        _ => None,
    }
}

#[cfg(target_os = "linux")]
fn drm_cards() -> Vec<std::path::PathBuf> {
    let Ok(entries) = std::fs::read_dir("/sys/class/drm") else {
        return Vec::new();
    };
    let mut cards: Vec<_> = entries
        .flatten()
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with("card") && !name.contains('-')
        })
        .map(|entry| entry.path().join("device"))
        .collect();
    cards.sort();
    cards
}

#[cfg(target_os = "linux")]
fn sysfs_controllers() -> Vec<GraphicsController> {
    use super::read_attr;

    drm_cards()
        .into_iter()
        .filter_map(|device| {
            let vendor_id = read_attr(device.join("vendor"))?;
            let vendor = pci_vendor_name(&vendor_id)?.to_string();
            let model = read_attr(device.join("uevent"))
                .and_then(|uevent| {
                    uevent
                        .lines()
                        .find_map(|l| l.strip_prefix("PCI_ID=").map(str::to_string))
                })
                .unwrap_or_else(|| "GPU".to_string());
            Some(GraphicsController {
                vendor,
                model,
                vram_mb: None,
                driver_version: None,
            })
        })
        .collect()
}

/// amdgpu exposes VRAM size in bytes; copy it onto AMD controllers in order.
#[cfg(target_os = "linux")]
fn apply_amd_vram(controllers: &mut [GraphicsController]) {
    use super::read_attr;

    let mut amd_vram = drm_cards().into_iter().filter_map(|device| {
        let vendor_id = read_attr(device.join("vendor"))?;
        if vendor_id != "0x1002" {
            return None;
        }
        let bytes: u64 = read_attr(device.join("mem_info_vram_total"))?.parse().ok()?;
        Some(bytes / 1024 / 1024)
    });

    for controller in controllers
        .iter_mut()
        .filter(|c| vendor_from_name(&c.vendor) == "AMD")
    {
        match amd_vram.next() {
            Some(vram) => controller.vram_mb = controller.vram_mb.or(Some(vram)),
            None => break,
        }
    }
}

/// Parse `system_profiler SPDisplaysDataType` output.
#[cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]
fn parse_system_profiler(stdout: &str) -> Vec<GraphicsController> {
    let mut controllers = Vec::new();
    let mut current: Option<GraphicsController> = None;

    for line in stdout.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Chipset Model" => {
                controllers.extend(current.take());
                current = Some(GraphicsController {
                    vendor: vendor_from_name(value),
                    model: value.to_string(),
                    vram_mb: None,
                    driver_version: None,
                });
            }
            "Vendor" => {
                if let Some(c) = current.as_mut() {
                    // "Apple (0x106b)" or "sppci_vendor_Apple"
                    let name = value.split(" (").next().unwrap_or(value);
                    c.vendor = name.trim_start_matches("sppci_vendor_").to_string();
                }
            }
            key if key.starts_with("VRAM") => {
                if let Some(c) = current.as_mut() {
                    c.vram_mb = parse_vram(value);
                }
            }
            _ => {}
        }
    }
    controllers.extend(current);
    controllers
}

/// Parse "1536 MB" / "8 GB" into MB
#[cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]
fn parse_vram(value: &str) -> Option<u64> {
    let mut parts = value.split_whitespace();
    let amount: u64 = parts.next()?.parse().ok()?;
    match parts.next()?.to_ascii_uppercase().as_str() {
        "GB" => Some(amount * 1024),
        "MB" => Some(amount),
        _ => None,
    }
}

/// Parse `wmic ... /format:csv` output using its header row.
///
/// wmic orders columns alphabetically (`Node,AdapterRAM,DriverVersion,Name`).
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
fn parse_wmic_csv(stdout: &str) -> Vec<GraphicsController> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').collect();
    let index_of = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));
    let (Some(name_idx), ram_idx, driver_idx) = (
        index_of("Name"),
        index_of("AdapterRAM"),
        index_of("DriverVersion"),
    ) else {
        return Vec::new();
    };

    lines
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            let name = parts.get(name_idx).filter(|n| !n.is_empty())?;
            let vram_mb = ram_idx
                .and_then(|i| parts.get(i))
                .and_then(|ram| ram.parse::<u64>().ok())
                .map(|bytes| bytes / 1024 / 1024);
            let driver_version = driver_idx
                .and_then(|i| parts.get(i))
                .filter(|d| !d.is_empty())
                .map(|d| d.to_string());
            Some(GraphicsController {
                vendor: vendor_from_name(name),
                model: name.to_string(),
                vram_mb,
                driver_version,
            })
        })
        .collect()
}
