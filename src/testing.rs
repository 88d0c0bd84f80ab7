//! Test doubles: a probe serving fixture data and a terminal that replays a
//! script of answers.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use crate::error::QueryError;
use crate::hardware::{
    select_primary_interface, BatteryInfo, CpuCache, CpuInfo, DiskDevice, GraphicsController,
    GraphicsInfo, MemoryInfo, NetworkInterface, OsInfo, SystemIdentity, SystemProbe,
    SystemSnapshot,
};
use crate::menu::{Entry, Terminal};

/// Query keys, paired with the name used in `QueryError::Unavailable`.
const QUERIES: [(&str, &str); 8] = [
    ("system", "System"),
    ("cpu", "CPU"),
    ("memory", "Memory"),
    ("graphics", "Graphics"),
    ("os", "OS"),
    ("disk", "Disk"),
    ("battery", "Battery"),
    ("network", "Network"),
];

pub fn fixture_identity() -> SystemIdentity {
    SystemIdentity {
        manufacturer: Some("LENOVO".to_string()),
        model: Some("20QV00CWUS".to_string()),
    }
}

pub fn fixture_cpu() -> CpuInfo {
    CpuInfo {
        manufacturer: "Intel".to_string(),
        brand: "Core i7-8750H".to_string(),
        model: "158".to_string(),
        cores: 12,
        physical_cores: 6,
        performance_cores: None,
        speed_ghz: 2.2,
        speed_min_ghz: 0.8,
        speed_max_ghz: 4.1,
        cache: CpuCache {
            l1d: Some(192),
            l1i: Some(192),
            l2: Some(1536),
            l3: Some(9216),
        },
        virtualization: true,
    }
}

pub fn fixture_memory() -> MemoryInfo {
    MemoryInfo {
        total: 17_179_869_184,
        free: 2_147_483_648,
        used: 8_589_934_592,
        active: 6_442_450_944,
        available: 8_589_934_592,
        swap_total: 2_147_483_648,
        swap_used: 0,
    }
}

pub fn fixture_graphics() -> GraphicsInfo {
    GraphicsInfo {
        controllers: vec![
            GraphicsController {
                vendor: "NVIDIA".to_string(),
                model: "GeForce GTX 1050 Ti".to_string(),
                vram_mb: Some(4096),
                driver_version: Some("535.54.03".to_string()),
            },
            GraphicsController {
                vendor: "Intel".to_string(),
                model: "UHD Graphics 630".to_string(),
                vram_mb: None,
                driver_version: None,
            },
        ],
    }
}

pub fn fixture_os() -> OsInfo {
    OsInfo {
        distro: "Ubuntu".to_string(),
        release: "22.04".to_string(),
        arch: "x86_64".to_string(),
    }
}

pub fn fixture_disks() -> Vec<DiskDevice> {
    vec![DiskDevice {
        device_type: "NVMe".to_string(),
        name: "nvme0n1".to_string(),
        size: 512_110_190_592,
        vendor: String::new(),
        model: "Samsung SSD 970 EVO Plus 500GB".to_string(),
    }]
}

pub fn fixture_battery() -> BatteryInfo {
    BatteryInfo {
        has_battery: true,
        is_charging: false,
        battery_type: "Li-ion".to_string(),
        percent: 87,
        model: Some("5B10W13930".to_string()),
        manufacturer: Some("SMP".to_string()),
        cycle_count: Some(412),
        current_capacity: Some(4437),
        max_capacity: Some(5100),
        designed_capacity: Some(5800),
    }
}

pub fn fixture_interfaces() -> Vec<NetworkInterface> {
    vec![
        FakeProbe::wired_interface(),
        NetworkInterface {
            iface: "wlan0".to_string(),
            iface_type: "wireless".to_string(),
            mac: "a4:c3:f0:11:22:33".to_string(),
            ip4: Some("192.168.1.20".to_string()),
            ip6: None,
            internal: false,
            speed_mbps: None,
        },
    ]
}

/// The snapshot `fetch_summary` builds from an unmodified [`FakeProbe`].
pub fn fixture_snapshot() -> SystemSnapshot {
    let interfaces = fixture_interfaces();
    SystemSnapshot {
        system: fixture_identity(),
        cpu: fixture_cpu(),
        memory: fixture_memory(),
        graphics: fixture_graphics(),
        os: fixture_os(),
        disks: fixture_disks(),
        battery: fixture_battery(),
        network: select_primary_interface(&interfaces).cloned(),
    }
}

/// Serves fixture data, counts calls per query and can be told to fail.
pub struct FakeProbe {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Option<&'static str>,
    panicking: Option<&'static str>,
    interfaces: Vec<NetworkInterface>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            failing: None,
            panicking: None,
            interfaces: fixture_interfaces(),
        }
    }

    /// Make the named query return `QueryError::Unavailable`.
    pub fn failing(mut self, query: &'static str) -> Self {
        self.failing = Some(query);
        self
    }

    /// Make the named query panic.
    pub fn panicking(mut self, query: &'static str) -> Self {
        self.panicking = Some(query);
        self
    }

    pub fn with_interfaces(mut self, interfaces: Vec<NetworkInterface>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn wired_interface() -> NetworkInterface {
        NetworkInterface {
            iface: "eth0".to_string(),
            iface_type: "wired".to_string(),
            mac: "00:11:22:33:44:55".to_string(),
            ip4: Some("10.0.0.5".to_string()),
            ip6: Some("fe80::211:22ff:fe33:4455".to_string()),
            internal: false,
            speed_mbps: Some(1000),
        }
    }

    pub fn calls(&self, query: &str) -> usize {
        self.calls.lock().unwrap().get(query).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn answer<T>(&self, query: &'static str, value: impl FnOnce() -> T) -> Result<T, QueryError> {
        *self.calls.lock().unwrap().entry(query).or_insert(0) += 1;
        if self.panicking == Some(query) {
            panic!("{query} query panicked");
        }
        if self.failing == Some(query) {
            let name = QUERIES
                .iter()
                .find(|(key, _)| *key == query)
                .map(|(_, name)| *name)
                .unwrap();
            return Err(QueryError::unavailable(name, "injected failure"));
        }
        Ok(value())
    }
}

impl SystemProbe for FakeProbe {
    fn system(&self) -> Result<SystemIdentity, QueryError> {
        self.answer("system", fixture_identity)
    }

    fn cpu(&self) -> Result<CpuInfo, QueryError> {
        self.answer("cpu", fixture_cpu)
    }

    fn memory(&self) -> Result<MemoryInfo, QueryError> {
        self.answer("memory", fixture_memory)
    }

    fn graphics(&self) -> Result<GraphicsInfo, QueryError> {
        self.answer("graphics", fixture_graphics)
    }

    fn os_info(&self) -> Result<OsInfo, QueryError> {
        self.answer("os", fixture_os)
    }

    fn disk_layout(&self) -> Result<Vec<DiskDevice>, QueryError> {
        self.answer("disk", fixture_disks)
    }

    fn battery(&self) -> Result<BatteryInfo, QueryError> {
        self.answer("battery", fixture_battery)
    }

    fn network_interfaces(&self) -> Result<Vec<NetworkInterface>, QueryError> {
        self.answer("network", || self.interfaces.clone())
    }
}

/// Shared sink for captured log output.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a subscriber filtered like `main`'s and return what it
/// printed.
pub fn capture_logs(filter: &str, f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let sink = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_target(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

/// One scripted reply to a prompt.
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    /// Pick the list entry with this label.
    Pick(&'static str),
    Confirm(bool),
    /// Accept the confirm prompt's default.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    Clear,
    Out(String),
    Err(String),
    Select(String),
    Confirm(String),
}

/// Records everything written and replays answers in order. Running out of
/// answers behaves like a closed stdin.
pub struct ScriptedTerminal {
    answers: VecDeque<Answer>,
    pub events: Vec<TermEvent>,
}

impl ScriptedTerminal {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            events: Vec::new(),
        }
    }

    pub fn stdout(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                TermEvent::Out(text) => Some(format!("{text}\n")),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.events.iter().filter(|e| **e == TermEvent::Clear).count()
    }

    pub fn selects(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TermEvent::Select(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn confirms(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TermEvent::Confirm(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn next_answer(&mut self) -> io::Result<Answer> {
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

impl Terminal for ScriptedTerminal {
    fn clear_screen(&mut self) -> io::Result<()> {
        self.events.push(TermEvent::Clear);
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.events.push(TermEvent::Out(text.to_string()));
        Ok(())
    }

    fn write_error(&mut self, text: &str) -> io::Result<()> {
        self.events.push(TermEvent::Err(text.to_string()));
        Ok(())
    }

    fn width(&self) -> Option<u16> {
        Some(120)
    }

    fn select(
        &mut self,
        message: &str,
        entries: &[Entry<'_>],
        _page_size: usize,
    ) -> io::Result<usize> {
        self.events.push(TermEvent::Select(message.to_string()));
        match self.next_answer()? {
            Answer::Pick(label) => Ok(entries
                .iter()
                .position(|e| *e == Entry::Choice(label))
                .unwrap_or_else(|| panic!("no entry {label:?} in {message:?}"))),
            other => panic!("expected a pick for {message:?}, got {other:?}"),
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> io::Result<bool> {
        self.events.push(TermEvent::Confirm(message.to_string()));
        match self.next_answer()? {
            Answer::Confirm(answer) => Ok(answer),
            Answer::Default => Ok(default),
            other => panic!("expected a confirm for {message:?}, got {other:?}"),
        }
    }
}
