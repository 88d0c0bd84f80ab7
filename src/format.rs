//! Human-readable formatting helpers.

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const K: u64 = 1024;

/// Default number of decimals used for byte counts.
pub const DEFAULT_DECIMALS: i32 = 2;

/// Format a byte count with binary prefixes, e.g. `1536` -> `"1.50 KB"`.
///
/// The unit index is `floor(log1024(bytes))`, clamped to `TB`. The scaled value
/// is rounded half-up to `decimals` places and always printed with exactly that
/// many decimals. Negative precision is treated as zero.
pub fn format_bytes(bytes: u64, decimals: i32) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let decimals = decimals.max(0);
    let index = (bytes.ilog(K) as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / (K as f64).powi(index as i32);

    format!(
        "{:.*} {}",
        decimals as usize,
        round_half_up(value, decimals),
        UNITS[index]
    )
}

/// [`format_bytes`] with [`DEFAULT_DECIMALS`].
pub fn format_bytes_default(bytes: u64) -> String {
    format_bytes(bytes, DEFAULT_DECIMALS)
}

fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a frequency to two decimals for display (`3.5999` -> `3.6`).
pub fn round_ghz(value: f64) -> f64 {
    round_half_up(value, 2)
}

/// `Some(0)` is treated like a missing value, matching how the views print
/// optional counters.
pub fn non_zero(value: Option<u64>) -> Option<u64> {
    value.filter(|v| *v > 0)
}
