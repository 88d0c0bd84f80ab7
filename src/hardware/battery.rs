//! Battery detection
//!
//! Linux reads /sys/class/power_supply/BAT*/uevent, macOS asks `pmset`.
//! Machines without a battery report `has_battery = false`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::QueryError;

/// Battery state and capacities (capacities in mAh)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryInfo {
    pub has_battery: bool,
    pub is_charging: bool,
    /// Chemistry (e.g., "Li-ion")
    pub battery_type: String,
    /// Charge level, 0-100
    pub percent: u32,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub cycle_count: Option<u32>,
    pub current_capacity: Option<u64>,
    pub max_capacity: Option<u64>,
    pub designed_capacity: Option<u64>,
}

impl BatteryInfo {
    /// A machine without a battery
    pub fn absent() -> Self {
        Self::default()
    }

    /// Detect the first battery, if any
    pub fn detect() -> Result<Self, QueryError> {
        #[cfg(target_os = "linux")]
        let info = read_power_supply(std::path::Path::new("/sys/class/power_supply"))?;

        #[cfg(target_os = "macos")]
        let info = super::command_output("pmset", &["-g", "batt"])
            .and_then(|stdout| parse_pmset(&stdout))
            .unwrap_or_else(BatteryInfo::absent);

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        let info = BatteryInfo::absent();

        Ok(info)
    }
}

/// Scan a /sys/class/power_supply-shaped directory for the first battery.
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn read_power_supply(root: &std::path::Path) -> Result<BatteryInfo, QueryError> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Ok(BatteryInfo::absent());
    };

    let mut supplies: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
    supplies.sort();

    for supply in supplies {
        let Ok(uevent) = std::fs::read_to_string(supply.join("uevent")) else {
            continue;
        };
        let fields = parse_uevent(&uevent);
        if fields.get("TYPE").map(String::as_str) == Some("Battery") {
            return Ok(battery_from_uevent(&fields));
        }
    }

    Ok(BatteryInfo::absent())
}

/// Parse `POWER_SUPPLY_KEY=value` lines, dropping the prefix
#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn parse_uevent(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim().trim_start_matches("POWER_SUPPLY_");
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg_attr(not(any(test, target_os = "linux")), allow(dead_code))]
fn battery_from_uevent(fields: &HashMap<String, String>) -> BatteryInfo {
    let text = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();
    let number = |key: &str| fields.get(key).and_then(|v| v.parse::<u64>().ok());

    // charge_* values are µAh; energy_* values are µWh and need the voltage.
    let voltage_uv = number("VOLTAGE_MIN_DESIGN").or_else(|| number("VOLTAGE_NOW"));
    let capacity_mah = |charge_key: &str, energy_key: &str| -> Option<u64> {
        if let Some(uah) = number(charge_key) {
            return Some(uah / 1000);
        }
        let uwh = number(energy_key)?;
        let uv = voltage_uv.filter(|v| *v > 0)?;
        Some(uwh * 1000 / uv)
    };

    let current_capacity = capacity_mah("CHARGE_NOW", "ENERGY_NOW");
    let max_capacity = capacity_mah("CHARGE_FULL", "ENERGY_FULL");
    let designed_capacity = capacity_mah("CHARGE_FULL_DESIGN", "ENERGY_FULL_DESIGN");

    let percent = number("CAPACITY")
        .or_else(|| match (current_capacity, max_capacity) {
            (Some(now), Some(full)) if full > 0 => Some(now * 100 / full),
            _ => None,
        })
        .unwrap_or(0)
        .min(100) as u32;

    BatteryInfo {
        has_battery: true,
        is_charging: fields.get("STATUS").map(String::as_str) == Some("Charging"),
        battery_type: text("TECHNOLOGY").unwrap_or_else(|| "Unknown".to_string()),
        percent,
        model: text("MODEL_NAME"),
        manufacturer: text("MANUFACTURER"),
        cycle_count: number("CYCLE_COUNT").map(|c| c as u32),
        current_capacity,
        max_capacity,
        designed_capacity,
    }
}

/// Parse `pmset -g batt`:
///
/// ```text
/// Now drawing from 'AC Power'
///  -InternalBattery-0 (id=1234)	87%; charging; 0:45 remaining present: true
/// ```
#[cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]
fn parse_pmset(stdout: &str) -> Option<BatteryInfo> {
    let line = stdout.lines().find(|l| l.contains("InternalBattery"))?;
    let percent = line
        .split_whitespace()
        .find_map(|word| word.trim_end_matches(';').strip_suffix('%'))
        .and_then(|p| p.parse::<u32>().ok())?;
    let is_charging = line.contains("; charging;") || line.contains("; charged;");

    Some(BatteryInfo {
        has_battery: true,
        is_charging,
        battery_type: "Li-ion".to_string(),
        percent,
        ..BatteryInfo::absent()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BAT_UEVENT: &str = "POWER_SUPPLY_NAME=BAT0\nPOWER_SUPPLY_TYPE=Battery\nPOWER_SUPPLY_STATUS=Discharging\nPOWER_SUPPLY_TECHNOLOGY=Li-ion\nPOWER_SUPPLY_CYCLE_COUNT=412\nPOWER_SUPPLY_CHARGE_FULL_DESIGN=5800000\nPOWER_SUPPLY_CHARGE_FULL=5100000\nPOWER_SUPPLY_CHARGE_NOW=2550000\nPOWER_SUPPLY_CAPACITY=50\nPOWER_SUPPLY_MODEL_NAME=5B10W13930\nPOWER_SUPPLY_MANUFACTURER=SMP\n";

    #[test]
    fn reads_charge_based_battery() {
        let info = battery_from_uevent(&parse_uevent(BAT_UEVENT));
        assert!(info.has_battery);
        assert!(!info.is_charging);
        assert_eq!(info.battery_type, "Li-ion");
        assert_eq!(info.percent, 50);
        assert_eq!(info.cycle_count, Some(412));
        assert_eq!(info.current_capacity, Some(2550));
        assert_eq!(info.max_capacity, Some(5100));
        assert_eq!(info.designed_capacity, Some(5800));
        assert_eq!(info.model.as_deref(), Some("5B10W13930"));
        assert_eq!(info.manufacturer.as_deref(), Some("SMP"));
    }

    #[test]
    fn converts_energy_values_with_voltage() {
        let uevent = "POWER_SUPPLY_TYPE=Battery\nPOWER_SUPPLY_STATUS=Charging\nPOWER_SUPPLY_VOLTAGE_MIN_DESIGN=11400000\nPOWER_SUPPLY_ENERGY_FULL_DESIGN=57000000\nPOWER_SUPPLY_ENERGY_NOW=28500000\nPOWER_SUPPLY_ENERGY_FULL=57000000\n";
        let info = battery_from_uevent(&parse_uevent(uevent));
        assert!(info.is_charging);
        assert_eq!(info.designed_capacity, Some(5000));
        assert_eq!(info.current_capacity, Some(2500));
        assert_eq!(info.percent, 50);
        assert_eq!(info.model, None);
        assert_eq!(info.battery_type, "Unknown");
    }

    #[test]
    fn finds_battery_among_supplies() {
        let dir = tempfile::tempdir().unwrap();
        let ac = dir.path().join("AC");
        let bat = dir.path().join("BAT0");
        fs::create_dir_all(&ac).unwrap();
        fs::create_dir_all(&bat).unwrap();
        fs::write(ac.join("uevent"), "POWER_SUPPLY_TYPE=Mains\nPOWER_SUPPLY_ONLINE=1\n").unwrap();
        fs::write(bat.join("uevent"), BAT_UEVENT).unwrap();

        let info = read_power_supply(dir.path()).unwrap();
        assert!(info.has_battery);
        assert_eq!(info.percent, 50);
    }

    #[test]
    fn desktop_without_battery() {
        let dir = tempfile::tempdir().unwrap();
        let ac = dir.path().join("AC");
        fs::create_dir_all(&ac).unwrap();
        fs::write(ac.join("uevent"), "POWER_SUPPLY_TYPE=Mains\n").unwrap();

        assert_eq!(read_power_supply(dir.path()).unwrap(), BatteryInfo::absent());
        assert_eq!(
            read_power_supply(&dir.path().join("missing")).unwrap(),
            BatteryInfo::absent()
        );
    }

    #[test]
    fn parses_pmset_output() {
        let out = "Now drawing from 'AC Power'\n -InternalBattery-0 (id=4653155)\t87%; charging; 0:45 remaining present: true\n";
        let info = parse_pmset(out).expect("battery line");
        assert_eq!(info.percent, 87);
        assert!(info.is_charging);

        assert!(parse_pmset("Now drawing from 'AC Power'\n").is_none());
    }
}
