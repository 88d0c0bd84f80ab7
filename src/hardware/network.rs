//! Network interface detection and primary-interface selection

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use sysinfo::Networks;

use crate::error::QueryError;

/// One network interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name (e.g., "wlan0", "Wi-Fi", "en0")
    pub iface: String,
    /// "wireless", "wired" or "virtual"
    pub iface_type: String,
    pub mac: String,
    pub ip4: Option<String>,
    pub ip6: Option<String>,
    /// Loopback interface
    pub internal: bool,
    /// Link speed in Mbps (if reported)
    pub speed_mbps: Option<u64>,
}

/// Pick the interface the views describe: the first Wi-Fi/WLAN interface by
/// name, otherwise the first interface. An empty list yields `None`.
pub fn select_primary_interface(interfaces: &[NetworkInterface]) -> Option<&NetworkInterface> {
    interfaces
        .iter()
        .find(|intf| {
            let name = intf.iface.to_lowercase();
            name.contains("wi-fi") || name.contains("wlan")
        })
        .or_else(|| interfaces.first())
}

/// List all interfaces in [`sort_interfaces`] order.
pub fn detect() -> Result<Vec<NetworkInterface>, QueryError> {
    let networks = Networks::new_with_refreshed_list();

    let mut interfaces: Vec<NetworkInterface> = networks
        .list()
        .iter()
        .map(|(name, data)| {
            let addrs: Vec<IpAddr> = data.ip_networks().iter().map(|net| net.addr).collect();
            let (ip4, ip6) = pick_addresses(&addrs);
            let internal = is_loopback(name, &addrs);

            #[cfg(target_os = "linux")]
            let (iface_type, speed_mbps) = linux_link_info(name, internal);

            #[cfg(not(target_os = "linux"))]
            let (iface_type, speed_mbps) = (classify_by_name(name, internal).to_string(), None);

            NetworkInterface {
                iface: name.clone(),
                iface_type,
                mac: data.mac_address().to_string(),
                ip4,
                ip6,
                internal,
                speed_mbps,
            }
        })
        .collect();

    sort_interfaces(&mut interfaces);
    tracing::debug!(count = interfaces.len(), "network interfaces detected");
    Ok(interfaces)
}

/// Physical links first, then virtual ones (bridges, container veths), then
/// loopback. Names order each group.
fn sort_interfaces(interfaces: &mut [NetworkInterface]) {
    interfaces.sort_by(|a, b| {
        (a.internal, a.iface_type == "virtual", &a.iface).cmp(&(
            b.internal,
            b.iface_type == "virtual",
            &b.iface,
        ))
    });
}

/// First IPv4 and first IPv6 address, as strings
fn pick_addresses(addrs: &[IpAddr]) -> (Option<String>, Option<String>) {
    let ip4 = addrs.iter().find(|a| a.is_ipv4()).map(IpAddr::to_string);
    let ip6 = addrs.iter().find(|a| a.is_ipv6()).map(IpAddr::to_string);
    (ip4, ip6)
}

fn is_loopback(name: &str, addrs: &[IpAddr]) -> bool {
    name == "lo"
        || name == "lo0"
        || name.to_ascii_lowercase().starts_with("loopback")
        || (!addrs.is_empty() && addrs.iter().all(IpAddr::is_loopback))
}

#[cfg_attr(all(not(test), target_os = "linux"), allow(dead_code))]
fn classify_by_name(name: &str, internal: bool) -> &'static str {
    if internal {
        return "virtual";
    }
    let lower = name.to_lowercase();
    if lower.contains("wi-fi")
        || lower.contains("wlan")
        || lower.contains("wifi")
        || lower.starts_with("wl")
    {
        "wireless"
    } else {
        "wired"
    }
}

/// Interface type and link speed from /sys/class/net
#[cfg(target_os = "linux")]
fn linux_link_info(name: &str, internal: bool) -> (String, Option<u64>) {
    use super::read_attr;
    use std::path::Path;

    let base = Path::new("/sys/class/net").join(name);
    let iface_type = if internal {
        "virtual"
    } else if base.join("wireless").exists() || base.join("phy80211").exists() {
        "wireless"
    } else if !base.join("device").exists() {
        "virtual"
    } else {
        "wired"
    };

    // -1 when the link is down
    let speed_mbps = read_attr(base.join("speed"))
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|speed| *speed > 0)
        .map(|speed| speed as u64);

    (iface_type.to_string(), speed_mbps)
}
