pub mod connections;
pub mod memory;
pub mod queries;

use super::{AnalysisContext, HealthIndicator, HealthStatus, IndicatorId};

pub trait HealthRule: Send + Sync {
    fn id(&self) -> IndicatorId;
    fn evaluate(&self, ctx: &AnalysisContext) -> HealthIndicator;
}

pub fn all_rules() -> Vec<Box<dyn HealthRule>> {
    vec![
        // Queries
        Box::new(queries::SlowQueryRateRule),
        // Connections
        Box::new(connections::ConnectionUsageRule),
        // Memory
        Box::new(memory::BufferPoolHitRatioRule),
        Box::new(memory::TmpDiskTablesRule),
    ]
}

/// Classifies a metric where lower is better.
///
/// `value <= healthy_max` is healthy, `value <= warning_max` is a warning,
/// anything above is critical.
pub fn classify_ascending(value: f64, healthy_max: f64, warning_max: f64) -> HealthStatus {
    if value <= healthy_max {
        HealthStatus::Healthy
    } else if value <= warning_max {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

/// Classifies a metric where higher is better.
///
/// `value >= healthy_min` is healthy, `value >= warning_min` is a warning,
/// anything below is critical.
pub fn classify_descending(value: f64, healthy_min: f64, warning_min: f64) -> HealthStatus {
    if value >= healthy_min {
        HealthStatus::Healthy
    } else if value >= warning_min {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_bounds_are_inclusive() {
        assert_eq!(classify_ascending(60.0, 60.0, 80.0), HealthStatus::Healthy);
        assert_eq!(classify_ascending(60.01, 60.0, 80.0), HealthStatus::Warning);
        assert_eq!(classify_ascending(80.0, 60.0, 80.0), HealthStatus::Warning);
        assert_eq!(classify_ascending(80.01, 60.0, 80.0), HealthStatus::Critical);
    }

    #[test]
    fn descending_bounds_are_inclusive() {
        assert_eq!(classify_descending(95.0, 95.0, 90.0), HealthStatus::Healthy);
        assert_eq!(classify_descending(94.99, 95.0, 90.0), HealthStatus::Warning);
        assert_eq!(classify_descending(90.0, 95.0, 90.0), HealthStatus::Warning);
        assert_eq!(classify_descending(89.99, 95.0, 90.0), HealthStatus::Critical);
    }

    #[test]
    fn rule_ids_are_unique() {
        let rules = all_rules();
        let mut ids: Vec<IndicatorId> = rules.iter().map(|r| r.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }
}
