//! Formatting helpers for the text report.
//!
//! Pure functions only; JSON output uses the raw values instead.

use crate::projection::{Measure, Sentinel};

// ---------------------------------------------------------------------------
// Sizes and rates
// ---------------------------------------------------------------------------

/// Format a size given in MB.
///
/// `"512.00 MB"`, `"1.50 GB"`, `"2.25 TB"`
pub fn format_mb(mb: f64) -> String {
    if mb >= 1024.0 * 1024.0 {
        format!("{:.2} TB", mb / (1024.0 * 1024.0))
    } else if mb >= 1024.0 {
        format!("{:.2} GB", mb / 1024.0)
    } else {
        format!("{:.2} MB", mb)
    }
}

/// Format an operations-per-second rate: `"0"`, `"4.2/s"`, `"37/s"`, `"1.5K/s"`.
pub fn format_rate(rate: f64) -> String {
    if rate < 0.01 {
        return "0".to_string();
    }
    if rate >= 1_000_000.0 {
        format!("{:.1}M/s", rate / 1_000_000.0)
    } else if rate >= 1_000.0 {
        format!("{:.1}K/s", rate / 1_000.0)
    } else if rate >= 10.0 {
        format!("{:.0}/s", rate)
    } else {
        format!("{:.1}/s", rate)
    }
}

pub fn format_percent(pct: f64) -> String {
    format!("{:.2}%", pct)
}

/// Format a row count with a K/M suffix: `"950"`, `"12.3K"`, `"4.1M"`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Format a duration in seconds: `"45s"`, `"3m 5s"`, `"2h 10m"`, `"4d 3h"`.
pub fn format_duration(secs: i64) -> String {
    if secs <= 0 {
        return "0s".to_string();
    }
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

// ---------------------------------------------------------------------------
// Sentinels
// ---------------------------------------------------------------------------

/// Format a projected value, or its sentinel as a word.
pub fn format_measure<T>(m: &Measure<T>, f: impl Fn(&T) -> String) -> String {
    match m {
        Measure::Value(v) => f(v),
        Measure::Sentinel(Sentinel::Unavailable) => "unavailable".to_string(),
        Measure::Sentinel(Sentinel::Full) => "full".to_string(),
    }
}
