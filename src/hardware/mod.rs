//! Hardware detection module
//!
//! Detects CPU, memory, GPU, disk, battery and network information using
//! sysinfo and platform-specific sources (sysfs, procfs, sysctl, vendor
//! tools). Every category is reachable through the [`SystemProbe`] trait so
//! the menu can be driven by fixture data in tests.

pub mod battery;
pub mod cpu;
pub mod disk;
pub mod graphics;
pub mod memory;
pub mod network;
pub mod os;
mod probe;
mod system;

pub use battery::BatteryInfo;
pub use cpu::{CpuCache, CpuInfo};
pub use disk::DiskDevice;
pub use graphics::{GraphicsController, GraphicsInfo};
pub use memory::MemoryInfo;
pub use network::{select_primary_interface, NetworkInterface};
pub use os::OsInfo;
pub use probe::{HostProbe, SystemProbe};
pub use system::{fetch_summary, SystemIdentity, SystemSnapshot};

use std::process::Command;

/// Run a helper tool and return its stdout when it exits successfully.
///
/// Missing tools are expected on most machines, so failures are logged at
/// debug level and reported as `None`.
#[allow(dead_code)]
pub(crate) fn command_output(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            tracing::debug!(program, status = %output.status, "helper tool failed");
            None
        }
        Err(err) => {
            tracing::debug!(program, error = %err, "helper tool not available");
            None
        }
    }
}

/// Read a sysfs/procfs attribute, trimmed, treating empty files as missing.
#[allow(dead_code)]
pub(crate) fn read_attr(path: impl AsRef<std::path::Path>) -> Option<String> {
    let value = std::fs::read_to_string(path).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
