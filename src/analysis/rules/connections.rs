use crate::analysis::rules::{HealthRule, classify_ascending};
use crate::analysis::{AnalysisContext, HealthIndicator, HealthStatus, IndicatorId};
use crate::collector::catalog::{MAX_CONNECTIONS, THREADS_CONNECTED};
use crate::rates::MetricId;

const HEALTHY_MAX_PCT: f64 = 60.0;
const WARNING_MAX_PCT: f64 = 80.0;

// ============================================================
// ConnectionUsageRule
// ============================================================

pub struct ConnectionUsageRule;

impl HealthRule for ConnectionUsageRule {
    fn id(&self) -> IndicatorId {
        IndicatorId::ConnectionUsage
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> HealthIndicator {
        if ctx.any_failed(&[THREADS_CONNECTED, MAX_CONNECTIONS]) {
            return HealthIndicator::new(self.id(), HealthStatus::Unknown, 0.0);
        }

        let pct = ctx.metrics.get(MetricId::ConnectionUsagePercent);
        HealthIndicator::new(
            self.id(),
            classify_ascending(pct, HEALTHY_MAX_PCT, WARNING_MAX_PCT),
            pct,
        )
    }
}
