//! Operating system information

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::QueryError;

/// Operating system identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsInfo {
    /// Distribution or product name (e.g., "Ubuntu", "Windows", "macOS")
    pub distro: String,
    /// Release/version string
    pub release: String,
    /// CPU architecture the OS runs on
    pub arch: String,
}

impl OsInfo {
    pub fn detect() -> Result<Self, QueryError> {
        let distro = System::name()
            .ok_or_else(|| QueryError::unavailable("OS", "operating system name unknown"))?;
        let release = System::os_version().unwrap_or_default();

        Ok(OsInfo {
            distro: normalize_distro(&distro),
            release,
            arch: std::env::consts::ARCH.to_string(),
        })
    }
}

/// sysinfo reports "Darwin" on macOS; show the product name instead.
fn normalize_distro(name: &str) -> String {
    match name {
        "Darwin" => "macOS".to_string(),
        other => other.to_string(),
    }
}
