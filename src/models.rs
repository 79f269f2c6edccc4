//! Shared data models: raw counter sets, units and table rows.

use std::collections::BTreeMap;

use serde::Serialize;

/// Placeholder for a configuration value that could not be read.
pub const UNKNOWN_SETTING: &str = "unknown";

/// Unit attached to a probe or a derived metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Count,
    Seconds,
    Bytes,
    Megabytes,
    Percentage,
    PerSecond,
    PerHour,
    Ratio,
    Text,
}

/// Server-lifetime counters keyed by probe name.
///
/// Missing keys read as 0, so a probe that failed and a probe that was
/// never in the catalog look the same to the calculator.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawCounterSet(BTreeMap<&'static str, i64>);

impl RawCounterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: i64) {
        self.0.insert(name, value);
    }

    /// Returns the counter value, or 0 when absent.
    pub fn get(&self, name: &str) -> i64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(&'static str, i64)> for RawCounterSet {
    fn from_iter<T: IntoIterator<Item = (&'static str, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Server configuration values keyed by probe name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigVariableSet(BTreeMap<&'static str, String>);

impl ConfigVariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.insert(name, value.into());
    }

    /// Returns the setting, or [`UNKNOWN_SETTING`] when absent.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or(UNKNOWN_SETTING)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(&'static str, String)> for ConfigVariableSet {
    fn from_iter<T: IntoIterator<Item = (&'static str, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Row/size statistics for one base table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableStat {
    pub name: String,
    pub rows: u64,
    pub size_mb: f64,
}

impl TableStat {
    pub fn new(name: impl Into<String>, rows: u64, size_mb: f64) -> Self {
        Self {
            name: name.into(),
            rows,
            size_mb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counter_reads_zero() {
        let mut set = RawCounterSet::new();
        set.insert("uptime", 42);
        assert_eq!(set.get("uptime"), 42);
        assert_eq!(set.get("questions"), 0);
        assert!(!set.contains("questions"));
    }

    #[test]
    fn missing_setting_reads_unknown() {
        let set: ConfigVariableSet = [("version", "8.0.36".to_string())].into_iter().collect();
        assert_eq!(set.get("version"), "8.0.36");
        assert_eq!(set.get("max_connections"), UNKNOWN_SETTING);
    }
}
