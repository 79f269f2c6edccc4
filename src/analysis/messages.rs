//! Fixed operator-facing messages, one per (indicator, status).

use super::{HealthStatus, IndicatorId};

pub fn message(id: IndicatorId, status: HealthStatus) -> &'static str {
    use HealthStatus::*;
    use IndicatorId::*;

    match (id, status) {
        (SlowQueryRate, Healthy) => "Slow queries are rare.",
        (SlowQueryRate, Warning) => "Slow queries are appearing regularly; review the slow query log.",
        (SlowQueryRate, Critical) => "Slow queries are frequent; queries or indexes need attention.",
        (SlowQueryRate, Unknown) => {
            "Slow-query rate not computed: uptime is below the minimum or the counters were unreadable."
        }

        (ConnectionUsage, Healthy) => "Connection usage is comfortably below the limit.",
        (ConnectionUsage, Warning) => "Connection usage is elevated.",
        (ConnectionUsage, Critical) => "Connection usage is close to max_connections.",
        (ConnectionUsage, Unknown) => "Connection usage could not be determined.",

        (BufferPoolHitRatio, Healthy) => "Buffer pool serves almost all reads from memory.",
        (BufferPoolHitRatio, Warning) => "Buffer pool misses are noticeable; consider a larger pool.",
        (BufferPoolHitRatio, Critical) => "Many reads go to disk; the buffer pool is undersized.",
        (BufferPoolHitRatio, Unknown) => "Buffer pool counters could not be read.",

        (TmpDiskTables, Healthy) => "Temporary tables mostly stay in memory.",
        (TmpDiskTables, Warning) => "A notable share of temporary tables spill to disk.",
        (TmpDiskTables, Critical) => {
            "Many temporary tables spill to disk; review tmp_table_size and queries."
        }
        (TmpDiskTables, Unknown) => "Temporary table counters could not be read.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_pair_has_a_distinct_message() {
        let ids = [
            IndicatorId::SlowQueryRate,
            IndicatorId::ConnectionUsage,
            IndicatorId::BufferPoolHitRatio,
            IndicatorId::TmpDiskTables,
        ];
        let statuses = [
            HealthStatus::Healthy,
            HealthStatus::Warning,
            HealthStatus::Critical,
            HealthStatus::Unknown,
        ];
        let mut seen = HashSet::new();
        for id in ids {
            for status in statuses {
                let msg = message(id, status);
                assert!(!msg.is_empty());
                assert!(seen.insert(msg), "duplicate message {msg}");
            }
        }
    }
}
