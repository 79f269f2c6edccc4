//! Tunables consumed by the monitoring engine.

use std::time::Duration;

use crate::error::MonitorError;

/// Default assumed storage ceiling in MB.
pub const DEFAULT_MAX_CAPACITY_MB: f64 = 1000.0;

/// Default number of tables returned by the inventory.
pub const DEFAULT_TABLE_LISTING_LIMIT: usize = 20;

/// Minimum server uptime before the slow-query rate is meaningful.
pub const DEFAULT_SLOW_QUERY_MIN_UPTIME_SECS: i64 = 3600;

/// Per-probe budget. Also applied as the driver read/write timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine configuration.
///
/// Built with [`MonitorConfig::default`] and adjusted with the `with_*`
/// methods. [`MonitorConfig::validate`] is called by the assembler before
/// any probe runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub max_capacity_mb: f64,
    pub table_listing_limit: usize,
    pub slow_query_min_uptime_seconds: i64,
    /// Issue `FLUSH STATUS` before sampling counters.
    pub refresh_status: bool,
    pub probe_timeout: Duration,
    /// Lifetime of a cached snapshot. `Duration::ZERO` disables caching.
    pub cache_ttl: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_capacity_mb: DEFAULT_MAX_CAPACITY_MB,
            table_listing_limit: DEFAULT_TABLE_LISTING_LIMIT,
            slow_query_min_uptime_seconds: DEFAULT_SLOW_QUERY_MIN_UPTIME_SECS,
            refresh_status: false,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            cache_ttl: Duration::ZERO,
        }
    }
}

impl MonitorConfig {
    pub fn with_max_capacity_mb(mut self, mb: f64) -> Self {
        self.max_capacity_mb = mb;
        self
    }

    pub fn with_table_listing_limit(mut self, limit: usize) -> Self {
        self.table_listing_limit = limit;
        self
    }

    pub fn with_slow_query_min_uptime(mut self, secs: i64) -> Self {
        self.slow_query_min_uptime_seconds = secs;
        self
    }

    pub fn with_refresh_status(mut self, refresh: bool) -> Self {
        self.refresh_status = refresh;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the snapshot cache lifetime.
    ///
    /// Set to `Duration::ZERO` to assemble a fresh snapshot on every call.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Checks that every tunable is in range.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !self.max_capacity_mb.is_finite() || self.max_capacity_mb <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "max_capacity_mb must be positive, got {}",
                self.max_capacity_mb
            )));
        }
        if self.table_listing_limit == 0 {
            return Err(MonitorError::InvalidConfig(
                "table_listing_limit must be at least 1".to_string(),
            ));
        }
        if self.slow_query_min_uptime_seconds < 0 {
            return Err(MonitorError::InvalidConfig(format!(
                "slow_query_min_uptime_seconds must not be negative, got {}",
                self.slow_query_min_uptime_seconds
            )));
        }
        if self.probe_timeout.is_zero() {
            return Err(MonitorError::InvalidConfig(
                "probe_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
