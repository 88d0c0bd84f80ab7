//! The query boundary between the menu and the machine.

use super::system::{self, SystemIdentity};
use super::{
    battery::BatteryInfo, cpu::CpuInfo, disk, graphics::GraphicsInfo, memory::MemoryInfo,
    network, os::OsInfo, DiskDevice, NetworkInterface,
};
use crate::error::QueryError;

/// One read-only query per category.
///
/// Implementations must be shareable across threads: the summary view runs
/// all queries at once on the blocking pool.
pub trait SystemProbe: Send + Sync {
    fn system(&self) -> Result<SystemIdentity, QueryError>;
    fn cpu(&self) -> Result<CpuInfo, QueryError>;
    fn memory(&self) -> Result<MemoryInfo, QueryError>;
    fn graphics(&self) -> Result<GraphicsInfo, QueryError>;
    fn os_info(&self) -> Result<OsInfo, QueryError>;
    fn disk_layout(&self) -> Result<Vec<DiskDevice>, QueryError>;
    fn battery(&self) -> Result<BatteryInfo, QueryError>;
    fn network_interfaces(&self) -> Result<Vec<NetworkInterface>, QueryError>;
}

/// Queries the machine this process runs on.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl SystemProbe for HostProbe {
    fn system(&self) -> Result<SystemIdentity, QueryError> {
        tracing::debug!("querying system identity");
        system::detect_identity()
    }

    fn cpu(&self) -> Result<CpuInfo, QueryError> {
        tracing::debug!("querying CPU");
        CpuInfo::detect()
    }

    fn memory(&self) -> Result<MemoryInfo, QueryError> {
        tracing::debug!("querying memory");
        MemoryInfo::detect()
    }

    fn graphics(&self) -> Result<GraphicsInfo, QueryError> {
        tracing::debug!("querying graphics controllers");
        GraphicsInfo::detect()
    }

    fn os_info(&self) -> Result<OsInfo, QueryError> {
        tracing::debug!("querying OS");
        OsInfo::detect()
    }

    fn disk_layout(&self) -> Result<Vec<DiskDevice>, QueryError> {
        tracing::debug!("querying disk layout");
        disk::detect()
    }

    fn battery(&self) -> Result<BatteryInfo, QueryError> {
        tracing::debug!("querying battery");
        BatteryInfo::detect()
    }

    fn network_interfaces(&self) -> Result<Vec<NetworkInterface>, QueryError> {
        tracing::debug!("querying network interfaces");
        network::detect()
    }
}
