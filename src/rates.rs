//! Derived metric computation.
//!
//! This module is the **single source of truth** for rates, ratios and
//! percentages derived from raw server counters. It is a pure function of
//! its inputs: no clock, no connection, no hidden state.
//!
//! Every division is guarded: a zero denominator yields exactly 0. Every
//! value is rounded to 2 decimal places and every percentage is clamped to
//! `[0, 100]`.

use serde::Serialize;

use crate::collector::catalog::*;
use crate::models::{ConfigVariableSet, RawCounterSet, Unit};

/// Bytes per megabyte.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

// ---------------------------------------------------------------------------
// Metric identifiers
// ---------------------------------------------------------------------------

/// Identifier of a derived metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    QueriesPerSecond,
    ConnectionsPerSecond,
    AvgQueriesPerConnection,
    BufferPoolHitRatio,
    BufferPoolUsagePercent,
    KeyCacheHitRatio,
    TableCacheHitRatio,
    ThreadCacheHitRatio,
    ConnectionUsagePercent,
    AbortedConnectionPercent,
    TmpDiskTablePercent,
    SelectPercent,
    InsertPercent,
    UpdatePercent,
    DeletePercent,
    TotalOperations,
    SlowQueries,
    NetworkSentMb,
    NetworkReceivedMb,
}

impl MetricId {
    pub fn unit(self) -> Unit {
        match self {
            MetricId::QueriesPerSecond | MetricId::ConnectionsPerSecond => Unit::PerSecond,
            MetricId::AvgQueriesPerConnection => Unit::Ratio,
            MetricId::TotalOperations | MetricId::SlowQueries => Unit::Count,
            MetricId::NetworkSentMb | MetricId::NetworkReceivedMb => Unit::Megabytes,
            _ => Unit::Percentage,
        }
    }

    /// Snake-case name, as used in serialized output.
    pub fn name(self) -> &'static str {
        match self {
            MetricId::QueriesPerSecond => "queries_per_second",
            MetricId::ConnectionsPerSecond => "connections_per_second",
            MetricId::AvgQueriesPerConnection => "avg_queries_per_connection",
            MetricId::BufferPoolHitRatio => "buffer_pool_hit_ratio",
            MetricId::BufferPoolUsagePercent => "buffer_pool_usage_percent",
            MetricId::KeyCacheHitRatio => "key_cache_hit_ratio",
            MetricId::TableCacheHitRatio => "table_cache_hit_ratio",
            MetricId::ThreadCacheHitRatio => "thread_cache_hit_ratio",
            MetricId::ConnectionUsagePercent => "connection_usage_percent",
            MetricId::AbortedConnectionPercent => "aborted_connection_percent",
            MetricId::TmpDiskTablePercent => "tmp_disk_table_percent",
            MetricId::SelectPercent => "select_percent",
            MetricId::InsertPercent => "insert_percent",
            MetricId::UpdatePercent => "update_percent",
            MetricId::DeletePercent => "delete_percent",
            MetricId::TotalOperations => "total_operations",
            MetricId::SlowQueries => "slow_queries",
            MetricId::NetworkSentMb => "network_sent_mb",
            MetricId::NetworkReceivedMb => "network_received_mb",
        }
    }
}

/// One computed value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DerivedMetric {
    pub id: MetricId,
    pub value: f64,
    pub unit: Unit,
}

/// All derived metrics of one snapshot, in computation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivedMetrics(Vec<DerivedMetric>);

impl DerivedMetrics {
    /// Returns the metric value, or 0 if it was not computed.
    pub fn get(&self, id: MetricId) -> f64 {
        self.0
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.value)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DerivedMetric> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, id: MetricId, value: f64) {
        self.0.push(DerivedMetric {
            id,
            value,
            unit: id.unit(),
        });
    }
}

// ---------------------------------------------------------------------------
// Guarded arithmetic
// ---------------------------------------------------------------------------

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// `num / den`, or 0 when `den` is 0.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let v = num / den;
    if v.is_finite() { v } else { 0.0 }
}

/// `num / den * 100`, clamped to `[0, 100]` and rounded.
pub fn percent(num: f64, den: f64) -> f64 {
    round2((safe_div(num, den) * 100.0).clamp(0.0, 100.0))
}

/// Rounded rate, never negative.
fn rate(num: f64, den: f64) -> f64 {
    round2(safe_div(num, den).max(0.0))
}

/// Parses `max_connections`; anything unparsable or non-positive is 0.
pub fn parse_max_connections(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Computes every derived metric from one raw sample.
pub fn compute(counters: &RawCounterSet, variables: &ConfigVariableSet) -> DerivedMetrics {
    let c = |key: &str| counters.get(key) as f64;
    let mut out = DerivedMetrics::default();

    let uptime = c(UPTIME);
    let questions = c(QUESTIONS);
    let connections = c(CONNECTIONS);

    // Throughput
    out.push(MetricId::QueriesPerSecond, rate(questions, uptime));
    out.push(MetricId::ConnectionsPerSecond, rate(connections, uptime));
    out.push(
        MetricId::AvgQueriesPerConnection,
        rate(questions, connections),
    );

    // Caches
    let read_requests = c(BUFFER_READ_REQUESTS);
    out.push(
        MetricId::BufferPoolHitRatio,
        percent(read_requests - c(BUFFER_READS), read_requests),
    );
    let pages_total = c(BUFFER_PAGES_TOTAL);
    out.push(
        MetricId::BufferPoolUsagePercent,
        percent(pages_total - c(BUFFER_PAGES_FREE), pages_total),
    );
    let key_requests = c(KEY_READ_REQUESTS);
    out.push(
        MetricId::KeyCacheHitRatio,
        percent(key_requests - c(KEY_READS), key_requests),
    );
    let hits = c(TABLE_CACHE_HITS);
    out.push(
        MetricId::TableCacheHitRatio,
        percent(hits, hits + c(TABLE_CACHE_MISSES)),
    );
    out.push(
        MetricId::ThreadCacheHitRatio,
        percent(connections - c(THREADS_CREATED), connections),
    );

    // Connections
    let max_connections = parse_max_connections(variables.get(MAX_CONNECTIONS));
    out.push(
        MetricId::ConnectionUsagePercent,
        percent(c(THREADS_CONNECTED), max_connections),
    );
    out.push(
        MetricId::AbortedConnectionPercent,
        percent(c(ABORTED_CONNECTS), connections),
    );

    // Temporary tables
    out.push(
        MetricId::TmpDiskTablePercent,
        percent(c(TMP_DISK_TABLES), c(TMP_TABLES)),
    );

    // Query mix
    let select = c(COM_SELECT);
    let insert = c(COM_INSERT);
    let update = c(COM_UPDATE);
    let delete = c(COM_DELETE);
    let total = select + insert + update + delete;
    out.push(MetricId::SelectPercent, percent(select, total));
    out.push(MetricId::InsertPercent, percent(insert, total));
    out.push(MetricId::UpdatePercent, percent(update, total));
    out.push(MetricId::DeletePercent, percent(delete, total));
    out.push(MetricId::TotalOperations, total.max(0.0));

    out.push(MetricId::SlowQueries, c(SLOW_QUERIES).max(0.0));

    // Network
    out.push(MetricId::NetworkSentMb, rate(c(BYTES_SENT), BYTES_PER_MB));
    out.push(
        MetricId::NetworkReceivedMb,
        rate(c(BYTES_RECEIVED), BYTES_PER_MB),
    );

    out
}
