//! System information aggregator

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use super::battery::BatteryInfo;
use super::cpu::CpuInfo;
use super::disk::DiskDevice;
use super::graphics::GraphicsInfo;
use super::memory::MemoryInfo;
use super::network::{select_primary_interface, NetworkInterface};
use super::os::OsInfo;
use super::probe::SystemProbe;
use crate::error::QueryError;

/// Machine manufacturer and model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
}

/// Complete system information, gathered in one aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub system: SystemIdentity,
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub graphics: GraphicsInfo,
    pub os: OsInfo,
    pub disks: Vec<DiskDevice>,
    pub battery: BatteryInfo,
    /// Primary interface, if the machine has any
    pub network: Option<NetworkInterface>,
}

/// Run every query concurrently and combine the results.
///
/// Each query runs on the blocking pool. The first failure fails the whole
/// snapshot; there is no partial result.
pub async fn fetch_summary<P>(probe: Arc<P>) -> Result<SystemSnapshot, QueryError>
where
    P: SystemProbe + ?Sized + 'static,
{
    let started = Instant::now();

    let (system, cpu, memory, graphics, os, disks, battery, interfaces) = tokio::try_join!(
        joined(spawn_query(&probe, |p| p.system())),
        joined(spawn_query(&probe, |p| p.cpu())),
        joined(spawn_query(&probe, |p| p.memory())),
        joined(spawn_query(&probe, |p| p.graphics())),
        joined(spawn_query(&probe, |p| p.os_info())),
        joined(spawn_query(&probe, |p| p.disk_layout())),
        joined(spawn_query(&probe, |p| p.battery())),
        joined(spawn_query(&probe, |p| p.network_interfaces())),
    )?;

    let network = select_primary_interface(&interfaces).cloned();
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        interfaces = interfaces.len(),
        "system snapshot complete"
    );

    Ok(SystemSnapshot {
        system,
        cpu,
        memory,
        graphics,
        os,
        disks,
        battery,
        network,
    })
}

fn spawn_query<P, T, F>(probe: &Arc<P>, query: F) -> JoinHandle<Result<T, QueryError>>
where
    P: SystemProbe + ?Sized + 'static,
    T: Send + 'static,
    F: FnOnce(&P) -> Result<T, QueryError> + Send + 'static,
{
    let probe = Arc::clone(probe);
    tokio::task::spawn_blocking(move || query(&*probe))
}

async fn joined<T>(handle: JoinHandle<Result<T, QueryError>>) -> Result<T, QueryError> {
    handle.await?
}

/// Vendor placeholders firmware ships when the OEM never filled the field
fn clean_identity_value(value: &str) -> Option<String> {
    const PLACEHOLDERS: [&str; 6] = [
        "to be filled by o.e.m.",
        "system manufacturer",
        "system product name",
        "default string",
        "not applicable",
        "o.e.m.",
    ];
    let value = value.trim();
    if value.is_empty() || PLACEHOLDERS.contains(&value.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Detect the machine manufacturer and model (platform-specific)
pub(super) fn detect_identity() -> Result<SystemIdentity, QueryError> {
    #[cfg(target_os = "linux")]
    let identity = {
        use super::read_attr;
        let dmi = |name: &str| {
            read_attr(format!("/sys/class/dmi/id/{name}")).and_then(|v| clean_identity_value(&v))
        };
        SystemIdentity {
            manufacturer: dmi("sys_vendor"),
            model: dmi("product_name"),
        }
    };

    #[cfg(target_os = "macos")]
    let identity = SystemIdentity {
        manufacturer: Some("Apple".to_string()),
        model: super::command_output("sysctl", &["-n", "hw.model"])
            .and_then(|v| clean_identity_value(&v)),
    };

    #[cfg(target_os = "windows")]
    let identity = super::command_output("wmic", &["csproduct", "get", "Vendor,Name", "/format:csv"])
        .map(|stdout| parse_wmic_identity(&stdout))
        .unwrap_or_default();

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    let identity = SystemIdentity::default();

    if identity.manufacturer.is_none() {
        tracing::debug!("system manufacturer unknown");
    }
    Ok(identity)
}

/// Parse `wmic csproduct get Vendor,Name /format:csv` (`Node,Name,Vendor`)
#[cfg_attr(not(any(test, target_os = "windows")), allow(dead_code))]
fn parse_wmic_identity(stdout: &str) -> SystemIdentity {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let (Some(header), Some(row)) = (lines.next(), lines.next()) else {
        return SystemIdentity::default();
    };
    let columns: Vec<&str> = header.split(',').collect();
    let values: Vec<&str> = row.split(',').collect();
    let field = |name: &str| {
        columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|i| values.get(i))
            .and_then(|v| clean_identity_value(v))
    };

    SystemIdentity {
        manufacturer: field("Vendor"),
        model: field("Name"),
    }
}
