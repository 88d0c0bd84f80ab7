//! Memory detection module
//!
//! Totals come from sysinfo; Linux adds the `Active:` figure from
//! /proc/meminfo, other platforms report used memory as active.

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::QueryError;
use crate::format::format_bytes_default;

/// Memory statistics, all in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub active: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

impl MemoryInfo {
    /// Detect memory usage
    pub fn detect() -> Result<Self, QueryError> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(QueryError::unavailable("Memory", "total memory reported as 0"));
        }
        let used = sys.used_memory();

        #[cfg(target_os = "linux")]
        let active = std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| parse_meminfo_kb(&content, "Active"))
            .map(|kb| kb * 1024)
            .unwrap_or(used);

        #[cfg(not(target_os = "linux"))]
        let active = used;

        tracing::debug!(total = %format_bytes_default(total), "memory detected");
        Ok(MemoryInfo {
            total,
            free: sys.free_memory(),
            used,
            active,
            available: sys.available_memory(),
            swap_total: sys.total_swap(),
            swap_used: sys.used_swap(),
        })
    }
}

/// Read one `Key:   1234 kB` entry from /proc/meminfo
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn parse_meminfo_kb(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}
