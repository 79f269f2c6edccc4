use crate::analysis::rules::{HealthRule, classify_ascending, classify_descending};
use crate::analysis::{AnalysisContext, HealthIndicator, HealthStatus, IndicatorId};
use crate::collector::catalog::{BUFFER_READ_REQUESTS, BUFFER_READS, TMP_DISK_TABLES, TMP_TABLES};
use crate::rates::MetricId;

// ============================================================
// BufferPoolHitRatioRule
// ============================================================

const BUFFER_HEALTHY_MIN_PCT: f64 = 95.0;
const BUFFER_WARNING_MIN_PCT: f64 = 90.0;

pub struct BufferPoolHitRatioRule;

impl HealthRule for BufferPoolHitRatioRule {
    fn id(&self) -> IndicatorId {
        IndicatorId::BufferPoolHitRatio
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> HealthIndicator {
        if ctx.any_failed(&[BUFFER_READ_REQUESTS, BUFFER_READS]) {
            return HealthIndicator::new(self.id(), HealthStatus::Unknown, 0.0);
        }

        let ratio = ctx.metrics.get(MetricId::BufferPoolHitRatio);
        HealthIndicator::new(
            self.id(),
            classify_descending(ratio, BUFFER_HEALTHY_MIN_PCT, BUFFER_WARNING_MIN_PCT),
            ratio,
        )
    }
}

// ============================================================
// TmpDiskTablesRule
// ============================================================

const TMP_HEALTHY_MAX_PCT: f64 = 10.0;
const TMP_WARNING_MAX_PCT: f64 = 25.0;

pub struct TmpDiskTablesRule;

impl HealthRule for TmpDiskTablesRule {
    fn id(&self) -> IndicatorId {
        IndicatorId::TmpDiskTables
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> HealthIndicator {
        if ctx.any_failed(&[TMP_TABLES, TMP_DISK_TABLES]) {
            return HealthIndicator::new(self.id(), HealthStatus::Unknown, 0.0);
        }

        let pct = ctx.metrics.get(MetricId::TmpDiskTablePercent);
        HealthIndicator::new(
            self.id(),
            classify_ascending(pct, TMP_HEALTHY_MAX_PCT, TMP_WARNING_MAX_PCT),
            pct,
        )
    }
}
