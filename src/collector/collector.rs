//! Raw metric collector.
//!
//! Walks the probe catalog against a borrowed connection and produces the
//! raw counter and configuration sets for one snapshot. A failing probe is
//! replaced by its default and logged; only a connectivity failure stops
//! collection.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::collector::catalog::{CATALOG, Probe, ProbeSource};
use crate::collector::traits::ServerIntrospector;
use crate::config::MonitorConfig;
use crate::error::ProbeError;
use crate::models::{ConfigVariableSet, RawCounterSet, UNKNOWN_SETTING};

/// Timing information for one collection pass.
///
/// Used for debugging and to spot probes that exceed their budget.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectorTiming {
    /// Total collection time.
    pub total: Duration,
    /// Time spent in `FLUSH STATUS`, if issued.
    pub refresh: Option<Duration>,
    /// Per-probe time, in catalog order.
    pub per_probe: Vec<(&'static str, Duration)>,
    /// Probes that took longer than the configured budget.
    pub slow_probes: Vec<&'static str>,
}

/// Output of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawSample {
    pub counters: RawCounterSet,
    pub variables: ConfigVariableSet,
    /// Keys whose probe failed and were substituted.
    pub failed_probes: Vec<&'static str>,
}

/// Collects the probe catalog from a server connection.
pub struct RawMetricCollector {
    catalog: &'static [Probe],
    refresh_status: bool,
    probe_timeout: Duration,
    /// Timing information from the last collect call.
    last_timing: Option<CollectorTiming>,
}

impl RawMetricCollector {
    /// Creates a collector over the default catalog.
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            catalog: CATALOG,
            refresh_status: config.refresh_status,
            probe_timeout: config.probe_timeout,
            last_timing: None,
        }
    }

    /// Replaces the probe catalog.
    pub fn with_catalog(mut self, catalog: &'static [Probe]) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns timing information from the last collect call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Runs every probe in the catalog.
    ///
    /// Returns `Err` only when the connection itself fails; every other
    /// probe failure is substituted with 0 (counters) or `"unknown"`
    /// (settings) and recorded in [`RawSample::failed_probes`].
    pub fn collect(
        &mut self,
        conn: &mut dyn ServerIntrospector,
    ) -> Result<RawSample, ProbeError> {
        let start = Instant::now();
        let mut timing = CollectorTiming::default();
        let mut sample = RawSample::default();

        if self.refresh_status {
            let t = Instant::now();
            match conn.refresh_status() {
                Ok(()) => {}
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => warn!(error = %e, "status refresh failed, sampling stale counters"),
            }
            timing.refresh = Some(t.elapsed());
        }

        for probe in self.catalog {
            let t = Instant::now();
            let result = run_probe(conn, probe);
            let elapsed = t.elapsed();

            timing.per_probe.push((probe.key, elapsed));
            if elapsed > self.probe_timeout {
                warn!(probe = probe.key, ?elapsed, budget = ?self.probe_timeout,
                    "probe exceeded its time budget");
                timing.slow_probes.push(probe.key);
            }

            match result {
                Ok(ProbeValue::Counter(v)) => sample.counters.insert(probe.key, v),
                Ok(ProbeValue::Setting(v)) => sample.variables.insert(probe.key, v),
                Err(e) if e.is_connectivity() => {
                    self.last_timing = None;
                    return Err(e);
                }
                Err(e) => {
                    warn!(probe = probe.key, error = %e, "probe failed, substituting default");
                    sample.failed_probes.push(probe.key);
                    match probe.source {
                        ProbeSource::Status(_) => sample.counters.insert(probe.key, 0),
                        ProbeSource::Variable(_) => {
                            sample.variables.insert(probe.key, UNKNOWN_SETTING)
                        }
                    }
                }
            }
        }

        timing.total = start.elapsed();
        debug!(
            probes = self.catalog.len(),
            failed = sample.failed_probes.len(),
            total = ?timing.total,
            "raw metrics collected"
        );
        self.last_timing = Some(timing);

        Ok(sample)
    }
}

enum ProbeValue {
    Counter(i64),
    Setting(String),
}

fn run_probe(conn: &mut dyn ServerIntrospector, probe: &Probe) -> Result<ProbeValue, ProbeError> {
    match probe.source {
        ProbeSource::Status(name) => {
            let raw = conn
                .status_value(name)?
                .ok_or_else(|| ProbeError::Query(format!("status {} not reported", name)))?;
            parse_counter(&raw).map(ProbeValue::Counter)
        }
        ProbeSource::Variable(name) => {
            let raw = conn
                .variable_value(name)?
                .ok_or_else(|| ProbeError::Query(format!("variable {} not reported", name)))?;
            Ok(ProbeValue::Setting(raw))
        }
    }
}

/// Parses a status counter. Fractional values are truncated.
fn parse_counter(raw: &str) -> Result<i64, ProbeError> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v as i64),
        _ => Err(ProbeError::Parse(format!("'{}' is not a counter", raw))),
    }
}
