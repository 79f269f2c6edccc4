use crate::analysis::rules::{HealthRule, classify_ascending};
use crate::analysis::{AnalysisContext, HealthIndicator, HealthStatus, IndicatorId};
use crate::collector::catalog::{SLOW_QUERIES, UPTIME};
use crate::rates::{round2, safe_div};

/// Slow queries per hour at or below this are healthy.
const HEALTHY_MAX_PER_HOUR: f64 = 1.0;
/// Slow queries per hour at or below this are a warning.
const WARNING_MAX_PER_HOUR: f64 = 10.0;

// ============================================================
// SlowQueryRateRule
// ============================================================

pub struct SlowQueryRateRule;

impl HealthRule for SlowQueryRateRule {
    fn id(&self) -> IndicatorId {
        IndicatorId::SlowQueryRate
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> HealthIndicator {
        let uptime = ctx.counters.get(UPTIME);

        // A young server has too little history for a per-hour rate.
        if uptime <= ctx.slow_query_min_uptime_seconds || ctx.any_failed(&[UPTIME, SLOW_QUERIES]) {
            return HealthIndicator::new(self.id(), HealthStatus::Unknown, 0.0);
        }

        let hours = uptime as f64 / 3600.0;
        let per_hour = round2(safe_div(ctx.counters.get(SLOW_QUERIES) as f64, hours).max(0.0));

        HealthIndicator::new(
            self.id(),
            classify_ascending(per_hour, HEALTHY_MAX_PER_HOUR, WARNING_MAX_PER_HOUR),
            per_hour,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawCounterSet;
    use crate::rates::DerivedMetrics;

    fn evaluate(uptime: i64, slow: i64, failed: &[&'static str]) -> HealthIndicator {
        let counters: RawCounterSet = [(UPTIME, uptime), (SLOW_QUERIES, slow)].into_iter().collect();
        let metrics = DerivedMetrics::default();
        let ctx = AnalysisContext {
            counters: &counters,
            metrics: &metrics,
            failed_probes: failed,
            slow_query_min_uptime_seconds: 3600,
        };
        SlowQueryRateRule.evaluate(&ctx)
    }

    #[test]
    fn young_server_is_unknown_with_zero_rate() {
        let ind = evaluate(1_800, 500, &[]);
        assert_eq!(ind.status, HealthStatus::Unknown);
        assert_eq!(ind.value, 0.0);
        assert!(ind.message.contains("uptime"));
    }

    #[test]
    fn exactly_one_hour_is_still_unknown() {
        assert_eq!(evaluate(3_600, 5, &[]).status, HealthStatus::Unknown);
    }

    #[test]
    fn rate_is_per_hour() {
        // 24 slow queries over 24h
        let ind = evaluate(86_400, 24, &[]);
        assert_eq!(ind.value, 1.0);
        assert_eq!(ind.status, HealthStatus::Healthy);

        let ind = evaluate(7_200, 20, &[]);
        assert_eq!(ind.value, 10.0);
        assert_eq!(ind.status, HealthStatus::Warning);

        let ind = evaluate(7_200, 22, &[]);
        assert_eq!(ind.value, 11.0);
        assert_eq!(ind.status, HealthStatus::Critical);
    }

    #[test]
    fn failed_counter_is_unknown() {
        let ind = evaluate(86_400, 0, &[SLOW_QUERIES]);
        assert_eq!(ind.status, HealthStatus::Unknown);
        assert!(ind.message.contains("unreadable"));
        assert!(!ind.message.contains("not computed yet"));
    }
}
