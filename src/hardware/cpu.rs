//! CPU detection module
//!
//! Detects CPU information using:
//! - Cross-platform: sysinfo crate
//! - Linux: /proc/cpuinfo, cpufreq and cache sysfs
//! - macOS: sysctl

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::QueryError;
use crate::format::round_ghz;

/// CPU cache sizes in KB
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuCache {
    pub l1d: Option<u64>,
    pub l1i: Option<u64>,
    pub l2: Option<u64>,
    pub l3: Option<u64>,
}

/// CPU information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// Vendor name (e.g., "Intel", "AMD")
    pub manufacturer: String,
    /// Marketing name without vendor and trademark noise (e.g., "Core i7-8750H")
    pub brand: String,
    /// Model number as reported by the CPU
    pub model: String,
    /// Number of logical processors
    pub cores: usize,
    /// Number of physical cores
    pub physical_cores: usize,
    /// Number of performance cores on hybrid designs
    pub performance_cores: Option<usize>,
    /// Base clock in GHz
    pub speed_ghz: f64,
    /// Minimum clock in GHz
    pub speed_min_ghz: f64,
    /// Maximum clock in GHz
    pub speed_max_ghz: f64,
    pub cache: CpuCache,
    /// Hardware virtualization (VT-x / AMD-V) available
    pub virtualization: bool,
}

/// Extra facts that only the platform can tell us.
#[derive(Debug, Default, PartialEq)]
struct PlatformCpuInfo {
    model: Option<String>,
    performance_cores: Option<usize>,
    speed_min_mhz: Option<u64>,
    speed_max_mhz: Option<u64>,
    cache: CpuCache,
    virtualization: bool,
}

impl CpuInfo {
    /// Detect CPU information (platform-specific)
    pub fn detect() -> Result<Self, QueryError> {
        let mut sys = System::new();
        sys.refresh_cpu_all();

        let cpus = sys.cpus();
        let Some(first_cpu) = cpus.first() else {
            return Err(QueryError::unavailable("CPU", "no CPU detected"));
        };

        let raw_brand = first_cpu.brand().to_string();
        let manufacturer = manufacturer_from_vendor(first_cpu.vendor_id(), &raw_brand);
        let brand = clean_brand(&raw_brand, &manufacturer);
        let current_mhz = first_cpu.frequency();

        let cores = cpus.len();
        let physical_cores = sys.physical_core_count().unwrap_or(cores);

        #[cfg(target_os = "linux")]
        let platform = linux_cpu_info();

        #[cfg(target_os = "macos")]
        let platform = macos_cpu_info();

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        let platform = PlatformCpuInfo::default();

        let speed_ghz = base_speed_from_brand(&raw_brand)
            .unwrap_or_else(|| round_ghz(current_mhz as f64 / 1000.0));
        let speed_min_ghz = platform
            .speed_min_mhz
            .map(|mhz| round_ghz(mhz as f64 / 1000.0))
            .unwrap_or(speed_ghz);
        let speed_max_ghz = platform
            .speed_max_mhz
            .map(|mhz| round_ghz(mhz as f64 / 1000.0))
            .unwrap_or(speed_ghz);

        Ok(CpuInfo {
            manufacturer,
            brand,
            model: platform.model.unwrap_or_default(),
            cores,
            physical_cores,
            performance_cores: platform.performance_cores,
            speed_ghz,
            speed_min_ghz,
            speed_max_ghz,
            cache: platform.cache,
            virtualization: platform.virtualization,
        })
    }
}

fn manufacturer_from_vendor(vendor_id: &str, brand: &str) -> String {
    match vendor_id.trim() {
        "GenuineIntel" => "Intel".to_string(),
        "AuthenticAMD" | "AMDisbetter!" => "AMD".to_string(),
        "" => brand
            .split_whitespace()
            .next()
            .map(|word| word.trim_end_matches("(R)").to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        other => other.to_string(),
    }
}

/// Strip trademark markers, the vendor prefix and the "@ x.xxGHz" suffix.
fn clean_brand(raw: &str, manufacturer: &str) -> String {
    let without_clock = match raw.find('@') {
        Some(idx) => &raw[..idx],
        None => raw,
    };

    let cleaned = without_clock
        .replace("(R)", "")
        .replace("(r)", "")
        .replace("(TM)", "")
        .replace("(tm)", "")
        .replace(" CPU", "")
        .replace(" Processor", "");

    let mut words = cleaned.split_whitespace().peekable();
    if words
        .peek()
        .is_some_and(|first| first.eq_ignore_ascii_case(manufacturer))
    {
        words.next();
    }

    words.collect::<Vec<_>>().join(" ")
}

/// Parse the nominal clock from brands like "... CPU @ 2.20GHz".
fn base_speed_from_brand(raw: &str) -> Option<f64> {
    let after_at = &raw[raw.find('@')? + 1..];
    let number = after_at.trim().trim_end_matches("GHz").trim();
    number.parse::<f64>().ok().map(round_ghz)
}

/// Extract the model number and virtualization flags from /proc/cpuinfo
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn parse_proc_cpuinfo(content: &str) -> (Option<String>, bool) {
    let mut model = None;
    let mut virtualization = false;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key == "model" && model.is_none() {
            model = Some(value.to_string());
        }
        if key == "flags" || key == "Features" {
            virtualization |= value
                .split_whitespace()
                .any(|flag| flag == "vmx" || flag == "svm");
        }
    }

    (model, virtualization)
}

/// Parse sysfs cache sizes like "32K", "1024K" or "8M" into KB
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn parse_cache_size(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Some(kb) = value.strip_suffix('K') {
        return kb.parse().ok();
    }
    if let Some(mb) = value.strip_suffix('M') {
        return mb.parse::<u64>().ok().map(|mb| mb * 1024);
    }
    value.parse::<u64>().ok().map(|bytes| bytes / 1024)
}

/// Record one cache entry given its sysfs `level` and `type`.
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn apply_cache_entry(cache: &mut CpuCache, level: &str, kind: &str, size_kb: u64) {
    match (level.trim(), kind.trim()) {
        ("1", "Data") => cache.l1d = Some(size_kb),
        ("1", "Instruction") => cache.l1i = Some(size_kb),
        ("2", _) => cache.l2 = Some(size_kb),
        ("3", _) => cache.l3 = Some(size_kb),
        _ => {}
    }
}

#[cfg(target_os = "linux")]
fn linux_cpu_info() -> PlatformCpuInfo {
    use std::fs;
    use std::path::Path;

    let mut info = PlatformCpuInfo::default();

    if let Ok(content) = fs::read_to_string("/proc/cpuinfo") {
        let (model, virtualization) = parse_proc_cpuinfo(&content);
        info.model = model;
        info.virtualization = virtualization;
    }

    let read_khz = |name: &str| -> Option<u64> {
        let path = format!("/sys/devices/system/cpu/cpu0/cpufreq/{name}");
        let khz = fs::read_to_string(path).ok()?.trim().parse::<u64>().ok()?;
        Some(khz / 1000)
    };
    info.speed_min_mhz = read_khz("cpuinfo_min_freq");
    info.speed_max_mhz = read_khz("cpuinfo_max_freq");

    let cache_dir = Path::new("/sys/devices/system/cpu/cpu0/cache");
    if let Ok(entries) = fs::read_dir(cache_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !entry.file_name().to_string_lossy().starts_with("index") {
                continue;
            }
            let level = fs::read_to_string(path.join("level")).unwrap_or_default();
            let kind = fs::read_to_string(path.join("type")).unwrap_or_default();
            let size = fs::read_to_string(path.join("size")).unwrap_or_default();
            if let Some(size_kb) = parse_cache_size(&size) {
                apply_cache_entry(&mut info.cache, &level, &kind, size_kb);
            }
        }
    } else {
        tracing::debug!("CPU cache sysfs not available; cache sizes unknown");
    }

    info
}

#[cfg(target_os = "macos")]
fn macos_cpu_info() -> PlatformCpuInfo {
    use super::command_output;

    let sysctl = |key: &str| -> Option<u64> {
        command_output("sysctl", &["-n", key])?.trim().parse().ok()
    };
    let bytes_to_kb = |key: &str| sysctl(key).map(|bytes| bytes / 1024);

    PlatformCpuInfo {
        model: command_output("sysctl", &["-n", "machdep.cpu.model"])
            .map(|s| s.trim().to_string()),
        performance_cores: sysctl("hw.perflevel0.physicalcpu").map(|n| n as usize),
        speed_min_mhz: None,
        speed_max_mhz: sysctl("hw.cpufrequency_max").map(|hz| hz / 1_000_000),
        cache: CpuCache {
            l1d: bytes_to_kb("hw.l1dcachesize"),
            l1i: bytes_to_kb("hw.l1icachesize"),
            l2: bytes_to_kb("hw.l2cachesize"),
            l3: bytes_to_kb("hw.l3cachesize"),
        },
        virtualization: sysctl("kern.hv_support") == Some(1),
    }
}
