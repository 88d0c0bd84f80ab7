//! Shapes hardware records into the rows the views print.

use crate::error::QueryError;
use crate::format::{format_bytes, non_zero, round_ghz};
use crate::hardware::{
    select_primary_interface, BatteryInfo, CpuInfo, DiskDevice, GraphicsInfo, MemoryInfo,
    NetworkInterface, SystemProbe, SystemSnapshot,
};

const NOT_AVAILABLE: &str = "N/A";

/// One category/value pair of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub category: String,
    pub value: String,
    /// Rendered bold green
    pub highlight: bool,
}

impl DisplayRow {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
            highlight: false,
        }
    }

    fn highlighted(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            highlight: true,
            ..Self::new(category, value)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Cpu,
    Memory,
    Disk,
    Graphics,
    Battery,
    Network,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cpu,
        Category::Memory,
        Category::Disk,
        Category::Graphics,
        Category::Battery,
        Category::Network,
    ];

    /// Label in the detail menu
    pub fn label(self) -> &'static str {
        match self {
            Category::Cpu => "CPU Details",
            Category::Memory => "Memory Details",
            Category::Disk => "Disk Details",
            Category::Graphics => "Graphics Details",
            Category::Battery => "Battery Details",
            Category::Network => "Network Details",
        }
    }

    /// Heading printed above the detail table
    pub fn title(self) -> &'static str {
        match self {
            Category::Disk => "Storage Details",
            other => other.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub title: &'static str,
    pub rows: Vec<DisplayRow>,
}

/// Query one category and shape it. Only the query that category needs is
/// issued.
pub fn detail_view<P>(probe: &P, category: Category, decimals: i32) -> Result<DetailView, QueryError>
where
    P: SystemProbe + ?Sized,
{
    tracing::debug!(?category, "building detail view");
    let rows = match category {
        Category::Cpu => cpu_rows(&probe.cpu()?),
        Category::Memory => memory_rows(&probe.memory()?, decimals),
        Category::Disk => disk_rows(&probe.disk_layout()?, decimals),
        Category::Graphics => graphics_rows(&probe.graphics()?),
        Category::Battery => battery_rows(&probe.battery()?),
        Category::Network => {
            let interfaces = probe.network_interfaces()?;
            network_rows(select_primary_interface(&interfaces))
        }
    };

    Ok(DetailView {
        title: category.title(),
        rows,
    })
}

/// The "view all" table, in fixed order.
pub fn summary_rows(snapshot: &SystemSnapshot, decimals: i32) -> Vec<DisplayRow> {
    let system = &snapshot.system;
    let cpu = &snapshot.cpu;
    let os = &snapshot.os;
    let battery = &snapshot.battery;

    let graphics = snapshot
        .graphics
        .controllers
        .iter()
        .map(|g| match non_zero(g.vram_mb) {
            Some(vram) => format!("{} {} ({}MB VRAM)", g.vendor, g.model, vram),
            None => format!("{} {}", g.vendor, g.model),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let storage = snapshot
        .disks
        .iter()
        .map(|d| format!("{} {} - {}", d.device_type, d.name, format_bytes(d.size, decimals)))
        .collect::<Vec<_>>()
        .join("\n");

    let battery = if battery.has_battery {
        format!(
            "{}, {}% ({})",
            battery.battery_type,
            battery.percent,
            charging_label(battery.is_charging)
        )
    } else {
        "No battery detected".to_string()
    };

    let network = match &snapshot.network {
        Some(net) => format!(
            "{}: {}, MAC: {}",
            net.iface,
            net.ip4.as_deref().unwrap_or("No IP"),
            net.mac
        ),
        None => "No network interface found".to_string(),
    };

    vec![
        DisplayRow::highlighted(
            "System",
            format!(
                "{} {}",
                system.manufacturer.as_deref().unwrap_or("Unknown"),
                system.model.as_deref().unwrap_or("Laptop")
            ),
        ),
        DisplayRow::new(
            "Processor",
            format!(
                "{} {} ({} cores, {} GHz)",
                cpu.manufacturer,
                cpu.brand,
                cpu.cores,
                round_ghz(cpu.speed_ghz)
            ),
        ),
        DisplayRow::new("Memory", format_bytes(snapshot.memory.total, decimals)),
        DisplayRow::new("Graphics", graphics),
        DisplayRow::new(
            "Operating System",
            format!("{} {} ({})", os.distro, os.release, os.arch),
        ),
        DisplayRow::new("Storage", storage),
        DisplayRow::new("Battery", battery),
        DisplayRow::new("Network", network),
    ]
}

pub fn cpu_rows(cpu: &CpuInfo) -> Vec<DisplayRow> {
    let cache = &cpu.cache;
    let mut cache_text = String::new();
    if let Some(l1d) = non_zero(cache.l1d) {
        cache_text.push_str(&format!("L1d: {l1d} KB, "));
    }
    if let Some(l1i) = non_zero(cache.l1i) {
        cache_text.push_str(&format!("L1i: {l1i} KB, "));
    }
    cache_text.push_str(&format!(
        "L2: {} KB, L3: {} KB",
        or_na(non_zero(cache.l2)),
        or_na(non_zero(cache.l3))
    ));

    let performance = cpu
        .performance_cores
        .filter(|c| *c > 0)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |c| c.to_string());

    vec![
        DisplayRow::new("Manufacturer", cpu.manufacturer.clone()),
        DisplayRow::new("Brand", cpu.brand.clone()),
        DisplayRow::new("Model", cpu.model.clone()),
        DisplayRow::new(
            "Cores",
            format!(
                "{} (Physical: {}, Performance: {})",
                cpu.cores, cpu.physical_cores, performance
            ),
        ),
        DisplayRow::new(
            "Speed",
            format!(
                "{} GHz (Min: {} GHz, Max: {} GHz)",
                round_ghz(cpu.speed_ghz),
                round_ghz(cpu.speed_min_ghz),
                round_ghz(cpu.speed_max_ghz)
            ),
        ),
        DisplayRow::new("Cache", cache_text),
        DisplayRow::new(
            "Virtualization",
            if cpu.virtualization {
                "Supported"
            } else {
                "Not supported"
            },
        ),
    ]
}

pub fn memory_rows(mem: &MemoryInfo, decimals: i32) -> Vec<DisplayRow> {
    [
        ("Total", mem.total),
        ("Free", mem.free),
        ("Used", mem.used),
        ("Active", mem.active),
        ("Available", mem.available),
        ("Swap Total", mem.swap_total),
        ("Swap Used", mem.swap_used),
    ]
    .into_iter()
    .map(|(label, bytes)| DisplayRow::new(label, format_bytes(bytes, decimals)))
    .collect()
}

pub fn disk_rows(disks: &[DiskDevice], decimals: i32) -> Vec<DisplayRow> {
    disks
        .iter()
        .map(|disk| {
            let mut value = format!("{} - {}", disk.device_type, format_bytes(disk.size, decimals));
            let description = disk.description();
            if !description.is_empty() {
                value.push_str(&format!(" ({description})"));
            }
            DisplayRow::new(disk.name.clone(), value)
        })
        .collect()
}

pub fn graphics_rows(graphics: &GraphicsInfo) -> Vec<DisplayRow> {
    graphics
        .controllers
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let mut value = format!("{} {}", g.vendor, g.model);
            if let Some(vram) = non_zero(g.vram_mb) {
                value.push_str(&format!(" ({vram} MB VRAM)"));
            }
            if let Some(driver) = g.driver_version.as_deref().filter(|d| !d.is_empty()) {
                value.push_str(&format!("\nDriver: {driver}"));
            }
            DisplayRow::new(format!("GPU {}", i + 1), value)
        })
        .collect()
}

pub fn battery_rows(battery: &BatteryInfo) -> Vec<DisplayRow> {
    if !battery.has_battery {
        return vec![DisplayRow::new("Status", "No battery detected")];
    }

    let text = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };
    let mah = |value: Option<u64>| format!("{} mAh", or_na(non_zero(value)));

    vec![
        DisplayRow::new("Type", battery.battery_type.clone()),
        DisplayRow::new("Model", text(&battery.model)),
        DisplayRow::new("Manufacturer", text(&battery.manufacturer)),
        DisplayRow::new(
            "Cycle Count",
            or_na(non_zero(battery.cycle_count.map(u64::from))),
        ),
        DisplayRow::new("Current Level", format!("{}%", battery.percent)),
        DisplayRow::new("Status", charging_label(battery.is_charging)),
        DisplayRow::new("Current Capacity", mah(battery.current_capacity)),
        DisplayRow::new("Max Capacity", mah(battery.max_capacity)),
        DisplayRow::new("Designed Capacity", mah(battery.designed_capacity)),
    ]
}

pub fn network_rows(primary: Option<&NetworkInterface>) -> Vec<DisplayRow> {
    let Some(net) = primary else {
        return vec![DisplayRow::new("Status", "No active network interfaces found")];
    };

    let address = |ip: &Option<String>| ip.clone().unwrap_or_else(|| "Not connected".to_string());
    vec![
        DisplayRow::new("Interface", net.iface.clone()),
        DisplayRow::new("Type", net.iface_type.clone()),
        DisplayRow::new("MAC Address", net.mac.clone()),
        DisplayRow::new("IPv4", address(&net.ip4)),
        DisplayRow::new("IPv6", address(&net.ip6)),
        DisplayRow::new("Internal", if net.internal { "Yes" } else { "No" }),
        DisplayRow::new(
            "Speed",
            non_zero(net.speed_mbps).map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s} Mbps")),
        ),
    ]
}

fn charging_label(is_charging: bool) -> &'static str {
    if is_charging {
        "Charging"
    } else {
        "Discharging"
    }
}

fn or_na(value: Option<u64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}
