pub mod messages;
pub mod rules;

use serde::Serialize;

use crate::collector::catalog::THREADS_CONNECTED;
use crate::config::MonitorConfig;
use crate::models::{RawCounterSet, Unit};
use crate::rates::DerivedMetrics;
use rules::HealthRule;

// ============================================================
// Core types
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorId {
    SlowQueryRate,
    ConnectionUsage,
    BufferPoolHitRatio,
    TmpDiskTables,
}

impl IndicatorId {
    /// Unit of the indicator's supporting value.
    pub fn unit(self) -> Unit {
        match self {
            IndicatorId::SlowQueryRate => Unit::PerHour,
            _ => Unit::Percentage,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IndicatorId::SlowQueryRate => "slow_query_rate",
            IndicatorId::ConnectionUsage => "connection_usage",
            IndicatorId::BufferPoolHitRatio => "buffer_pool_hit_ratio",
            IndicatorId::TmpDiskTables => "tmp_disk_tables",
        }
    }
}

/// Health state of one indicator.
///
/// Ordered by severity for [`HealthReport::overall`]; `Unknown` sorts
/// lowest so it never masks a real classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Unknown,
    Healthy,
    Warning,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthIndicator {
    pub id: IndicatorId,
    pub status: HealthStatus,
    pub value: f64,
    pub unit: Unit,
    pub message: &'static str,
}

impl HealthIndicator {
    /// Builds an indicator with the catalog message for `(id, status)`.
    pub fn new(id: IndicatorId, status: HealthStatus, value: f64) -> Self {
        Self {
            id,
            status,
            value,
            unit: id.unit(),
            message: messages::message(id, status),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HealthReport {
    pub indicators: Vec<HealthIndicator>,
}

impl HealthReport {
    pub fn get(&self, id: IndicatorId) -> Option<&HealthIndicator> {
        self.indicators.iter().find(|i| i.id == id)
    }

    /// Worst classified status; `Unknown` only if nothing was classified.
    pub fn overall(&self) -> HealthStatus {
        self.indicators
            .iter()
            .map(|i| i.status)
            .max()
            .unwrap_or(HealthStatus::Unknown)
    }
}

// ============================================================
// Classification context passed to each rule
// ============================================================

pub struct AnalysisContext<'a> {
    pub counters: &'a RawCounterSet,
    pub metrics: &'a DerivedMetrics,
    /// Catalog keys whose probe failed during collection.
    pub failed_probes: &'a [&'static str],
    pub slow_query_min_uptime_seconds: i64,
}

impl AnalysisContext<'_> {
    /// True if any of `keys` was substituted by the collector.
    pub fn any_failed(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.failed_probes.contains(k))
    }
}

// ============================================================
// Classifier
// ============================================================

/// Maps derived metrics to health indicators through a fixed rule set.
pub struct HealthClassifier {
    rules: Vec<Box<dyn HealthRule>>,
    slow_query_min_uptime_seconds: i64,
}

impl HealthClassifier {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            rules: rules::all_rules(),
            slow_query_min_uptime_seconds: config.slow_query_min_uptime_seconds,
        }
    }

    pub fn classify(
        &self,
        counters: &RawCounterSet,
        metrics: &DerivedMetrics,
        failed_probes: &[&'static str],
    ) -> HealthReport {
        let ctx = AnalysisContext {
            counters,
            metrics,
            failed_probes,
            slow_query_min_uptime_seconds: self.slow_query_min_uptime_seconds,
        };
        HealthReport {
            indicators: self.rules.iter().map(|r| r.evaluate(&ctx)).collect(),
        }
    }
}

// ============================================================
// Saturation outlook
// ============================================================

/// Database size above which saturation is considered likely, in MB.
pub const SATURATION_SIZE_MB: f64 = 500.0;

/// Connected threads above which saturation is considered likely.
pub const SATURATION_CONNECTIONS: i64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaturationOutlook {
    Stable,
    AtRisk,
}

/// Coarse space/connection pressure verdict. Unknown size counts as 0.
pub fn saturation_outlook(database_size_mb: Option<f64>, counters: &RawCounterSet) -> SaturationOutlook {
    let size = database_size_mb.unwrap_or(0.0);
    if size > SATURATION_SIZE_MB || counters.get(THREADS_CONNECTED) > SATURATION_CONNECTIONS {
        SaturationOutlook::AtRisk
    } else {
        SaturationOutlook::Stable
    }
}
