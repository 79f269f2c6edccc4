//! Snapshot assembly.
//!
//! [`SnapshotAssembler`] runs the collector, calculator and classifier in
//! sequence, then the schema inventory and storage projection on their own.
//! A section that fails for a local reason is reported as
//! [`Section::Degraded`]; only a dead connection aborts the snapshot.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{
    HealthClassifier, HealthReport, HealthStatus, SaturationOutlook, saturation_outlook,
};
use crate::collector::catalog::{VERSION, VERSION_COMMENT};
use crate::collector::traits::ServerIntrospector;
use crate::collector::{CollectorTiming, RawMetricCollector};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::inventory::{SchemaInventory, TableInventory};
use crate::models::{ConfigVariableSet, RawCounterSet};
use crate::projection::{GrowthModel, Measure, SizeSample, StorageProjection, StorageProjector};
use crate::rates::{self, DerivedMetrics, round2};

// ============================================================
// Snapshot
// ============================================================

/// Result of one independently failing section.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ok(T),
    Degraded { reason: String },
}

impl<T> Section<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            Section::Ok(v) => Some(v),
            Section::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Section::Degraded { .. })
    }
}

/// Everything known about the server at one point in time.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// Unix epoch seconds at assembly start.
    pub timestamp: i64,
    pub server_version: String,
    pub server_comment: String,
    pub counters: RawCounterSet,
    pub variables: ConfigVariableSet,
    /// Catalog keys whose value is a substituted default.
    pub failed_probes: Vec<&'static str>,
    pub metrics: DerivedMetrics,
    pub health: HealthReport,
    pub overall_status: HealthStatus,
    pub saturation: SaturationOutlook,
    pub database_size_mb: Measure<f64>,
    pub inventory: Section<TableInventory>,
    pub projection: StorageProjection,
    pub timing: Option<CollectorTiming>,
}

// ============================================================
// Assembler
// ============================================================

pub struct SnapshotAssembler {
    config: MonitorConfig,
    schema_hint: Option<String>,
    growth_model: GrowthModel,
    cache: SnapshotCache,
}

impl SnapshotAssembler {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            cache: SnapshotCache::from_config(&config),
            config,
            schema_hint: None,
            growth_model: GrowthModel::Heuristic,
        }
    }

    /// Schema name remembered from an earlier session, tried when the
    /// connection itself carries none.
    pub fn with_schema_hint(mut self, schema: impl Into<String>) -> Self {
        self.schema_hint = Some(schema.into());
        self
    }

    /// Size history used to fit the growth rate for the projection.
    pub fn with_history(mut self, samples: &[SizeSample]) -> Self {
        self.growth_model = GrowthModel::from_history(samples);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Assembles a snapshot now, or reuses one younger than `cache_ttl`.
    pub fn assemble(
        &self,
        conn: &mut dyn ServerIntrospector,
    ) -> Result<Arc<Snapshot>, MonitorError> {
        self.cache
            .get_or_assemble(|| self.assemble_at(conn, Utc::now()))
    }

    /// Assembles a snapshot as of `now`.
    ///
    /// Fails only on invalid configuration or when the connection is
    /// unusable; every other failure is folded into the snapshot.
    pub fn assemble_at(
        &self,
        conn: &mut dyn ServerIntrospector,
        now: DateTime<Utc>,
    ) -> Result<Snapshot, MonitorError> {
        self.config.validate()?;
        let start = Instant::now();

        conn.ping().map_err(|e| {
            warn!(error = %e, "connection check failed");
            MonitorError::Connectivity(e.to_string())
        })?;

        let mut collector = RawMetricCollector::new(&self.config);
        let sample = collector.collect(conn)?;
        let metrics = rates::compute(&sample.counters, &sample.variables);
        let health = HealthClassifier::new(&self.config).classify(
            &sample.counters,
            &metrics,
            &sample.failed_probes,
        );

        let database_size_mb = match conn.database_size_mb() {
            Ok(size) => Some(round2(size)),
            Err(e) if e.is_connectivity() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "database size unavailable");
                None
            }
        };
        let saturation = saturation_outlook(database_size_mb, &sample.counters);

        let inventory = match SchemaInventory::new(&self.config)
            .collect(conn, self.schema_hint.as_deref())
        {
            Ok(inv) => Section::Ok(inv),
            Err(MonitorError::Connectivity(msg)) => return Err(MonitorError::Connectivity(msg)),
            Err(e) => {
                info!(error = %e, "inventory section degraded");
                Section::Degraded {
                    reason: e.to_string(),
                }
            }
        };

        let projection = StorageProjector::new(&self.config)
            .with_growth_model(self.growth_model)
            .project(database_size_mb, now.date_naive());

        let snapshot = Snapshot {
            timestamp: now.timestamp(),
            server_version: sample.variables.get(VERSION).to_string(),
            server_comment: sample.variables.get(VERSION_COMMENT).to_string(),
            overall_status: health.overall(),
            failed_probes: sample.failed_probes,
            counters: sample.counters,
            variables: sample.variables,
            metrics,
            health,
            saturation,
            database_size_mb: database_size_mb.map_or_else(Measure::unavailable, Measure::Value),
            inventory,
            projection,
            timing: collector.last_timing().cloned(),
        };

        debug!(
            elapsed = ?start.elapsed(),
            overall = ?snapshot.overall_status,
            failed_probes = snapshot.failed_probes.len(),
            "snapshot assembled"
        );
        Ok(snapshot)
    }
}

// ============================================================
// Cache
// ============================================================

/// Short-lived shared snapshot for concurrent viewers.
///
/// The lock is held while assembling, so concurrent callers inside the TTL
/// wait for and reuse one result instead of each querying the server.
pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Option<(Instant, Arc<Snapshot>)>>,
}

impl SnapshotCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cache with the configured `cache_ttl`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.cache_ttl)
    }

    pub fn get_or_assemble<F>(&self, assemble: F) -> Result<Arc<Snapshot>, MonitorError>
    where
        F: FnOnce() -> Result<Snapshot, MonitorError>,
    {
        if self.ttl.is_zero() {
            return assemble().map(Arc::new);
        }

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((at, snapshot)) = slot.as_ref() {
            if at.elapsed() < self.ttl {
                debug!(age = ?at.elapsed(), "serving cached snapshot");
                return Ok(Arc::clone(snapshot));
            }
        }

        let snapshot = Arc::new(assemble()?);
        *slot = Some((Instant::now(), Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::IndicatorId;
    use crate::collector::MockServer;
    use crate::error::ProbeError;
    use crate::inventory::ListingSource;
    use crate::rates::MetricId;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn assemble(server: &mut MockServer) -> Result<Snapshot, MonitorError> {
        SnapshotAssembler::new(MonitorConfig::default()).assemble_at(server, now())
    }

    #[test]
    fn typical_server_snapshot() {
        let mut server = MockServer::typical_server();
        let snap = assemble(&mut server).unwrap();

        assert_eq!(snap.timestamp, 1_704_110_400);
        assert_eq!(snap.server_version, "8.0.36");
        assert!(snap.failed_probes.is_empty());
        assert_eq!(snap.metrics.get(MetricId::QueriesPerSecond), 10.0);
        assert_eq!(snap.overall_status, HealthStatus::Healthy);
        assert_eq!(snap.saturation, SaturationOutlook::Stable);
        assert_eq!(snap.database_size_mb, Measure::Value(56.25));

        let inv = snap.inventory.ok().unwrap();
        assert_eq!(inv.schema, "shop");
        assert_eq!(inv.tables.len(), 3);

        assert_eq!(snap.projection.daily_growth_mb, Measure::Value(0.56));
        assert_eq!(snap.projection.remaining_space_mb, Measure::Value(943.75));
        assert_eq!(snap.projection.days_until_full, Measure::Value(1678));
        assert!(snap.timing.is_some());
    }

    #[test]
    fn ping_runs_first() {
        let mut server = MockServer::typical_server();
        assemble(&mut server).unwrap();
        assert_eq!(server.calls()[0], "ping");
    }

    #[test]
    fn overloaded_server_is_critical_and_at_risk() {
        let mut server = MockServer::overloaded_server();
        let snap = assemble(&mut server).unwrap();

        assert_eq!(snap.overall_status, HealthStatus::Critical);
        assert_eq!(snap.saturation, SaturationOutlook::AtRisk);
        let conn = snap.health.get(IndicatorId::ConnectionUsage).unwrap();
        assert_eq!(conn.status, HealthStatus::Critical);
    }

    #[test]
    fn fresh_server_has_unknown_slow_query_rate() {
        let mut server = MockServer::fresh_server();
        let snap = assemble(&mut server).unwrap();

        let slow = snap.health.get(IndicatorId::SlowQueryRate).unwrap();
        assert_eq!(slow.status, HealthStatus::Unknown);
        assert_eq!(slow.value, 0.0);
    }

    #[test]
    fn restricted_catalog_uses_fallback_listing() {
        let mut server = MockServer::restricted_catalog();
        let snap = assemble(&mut server).unwrap();

        let inv = snap.inventory.ok().unwrap();
        assert_eq!(inv.source, ListingSource::Fallback);
        assert_eq!(inv.tables.len(), 2);
    }

    #[test]
    fn unresolvable_schema_degrades_only_inventory() {
        let mut server = MockServer::typical_server();
        server.set_session_schema(None);
        server.set_current_schema(None);
        let snap = assemble(&mut server).unwrap();

        assert!(snap.inventory.is_degraded());
        assert_eq!(snap.overall_status, HealthStatus::Healthy);
        assert_eq!(snap.projection.days_until_full, Measure::Value(1678));
    }

    #[test]
    fn schema_hint_is_used() {
        let mut server = MockServer::typical_server();
        server.set_session_schema(None);
        server.set_current_schema(None);
        let snap = SnapshotAssembler::new(MonitorConfig::default())
            .with_schema_hint("shop")
            .assemble_at(&mut server, now())
            .unwrap();
        assert_eq!(snap.inventory.ok().unwrap().resolved_by, "session_hint");
    }

    #[test]
    fn missing_database_size_makes_projection_unavailable() {
        let mut server = MockServer::typical_server();
        server.set_database_size_mb(None);
        let snap = assemble(&mut server).unwrap();

        assert!(snap.database_size_mb.is_unavailable());
        assert!(snap.projection.days_until_full.is_unavailable());
        assert!(snap.projection.estimated_full_date.is_unavailable());
        assert_eq!(snap.saturation, SaturationOutlook::Stable);
    }

    #[test]
    fn failing_probe_is_substituted() {
        let mut server = MockServer::typical_server();
        server.fail_probe("Slow_queries", ProbeError::Query("denied".into()));
        server.fail_probe("version", ProbeError::Query("denied".into()));
        let snap = assemble(&mut server).unwrap();

        assert_eq!(snap.failed_probes.len(), 2);
        assert_eq!(snap.server_version, "unknown");
        let slow = snap.health.get(IndicatorId::SlowQueryRate).unwrap();
        assert_eq!(slow.status, HealthStatus::Unknown);
    }

    #[test]
    fn dead_connection_is_a_single_error() {
        let mut server = MockServer::typical_server();
        server.set_disconnected(true);
        let err = assemble(&mut server).unwrap_err();
        assert!(matches!(err, MonitorError::Connectivity(_)));
        assert_eq!(server.calls().len(), 1);
    }

    #[test]
    fn connection_lost_mid_snapshot_is_an_error() {
        let mut server = MockServer::typical_server();
        server.fail_probe("database_size", ProbeError::Connectivity("reset".into()));
        let err = assemble(&mut server).unwrap_err();
        assert!(matches!(err, MonitorError::Connectivity(_)));
    }

    #[test]
    fn invalid_config_is_rejected_before_querying() {
        let mut server = MockServer::typical_server();
        let err = SnapshotAssembler::new(MonitorConfig::default().with_table_listing_limit(0))
            .assemble_at(&mut server, now())
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfig(_)));
        assert!(server.calls().is_empty());
    }

    #[test]
    fn history_drives_projection() {
        let d = |day| chrono::NaiveDate::from_ymd_opt(2023, 12, day).unwrap();
        let samples = [SizeSample::new(d(1), 40.0), SizeSample::new(d(21), 50.0)];
        let mut server = MockServer::typical_server();
        let snap = SnapshotAssembler::new(MonitorConfig::default())
            .with_history(&samples)
            .assemble_at(&mut server, now())
            .unwrap();
        assert_eq!(snap.projection.daily_growth_mb, Measure::Value(0.5));
        assert_eq!(snap.projection.days_until_full, Measure::Value(1888));
    }

    #[test]
    fn snapshot_serializes_sections() {
        let mut server = MockServer::typical_server();
        server.set_session_schema(None);
        server.set_current_schema(None);
        server.set_database_size_mb(None);
        let snap = assemble(&mut server).unwrap();
        let json = serde_json::to_value(&snap).unwrap();

        assert_eq!(json["inventory"]["status"], "degraded");
        assert_eq!(json["database_size_mb"], "unavailable");
        assert_eq!(json["projection"]["days_until_full"], "unavailable");
        assert_eq!(json["overall_status"], "healthy");
        assert_eq!(json["counters"]["uptime"], 86_400);

        let snap = assemble(&mut MockServer::typical_server()).unwrap();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["inventory"]["status"], "ok");
        assert_eq!(json["inventory"]["schema"], "shop");
    }

    #[test]
    fn cache_reuses_snapshot_within_ttl() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let builds = Cell::new(0);
        let build = || {
            builds.set(builds.get() + 1);
            assemble(&mut MockServer::typical_server())
        };

        let a = cache.get_or_assemble(build).unwrap();
        let b = cache.get_or_assemble(build).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builds.get(), 1);

        cache.invalidate();
        cache.get_or_assemble(build).unwrap();
        assert_eq!(builds.get(), 2);
    }

    #[test]
    fn assembler_reuses_snapshot_within_configured_ttl() {
        let mut server = MockServer::typical_server();
        let assembler = SnapshotAssembler::new(
            MonitorConfig::default().with_cache_ttl(Duration::from_secs(60)),
        );

        let a = assembler.assemble(&mut server).unwrap();
        let b = assembler.assemble(&mut server).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let pings = server.calls().iter().filter(|c| *c == "ping").count();
        assert_eq!(pings, 1);
    }

    #[test]
    fn assembler_without_ttl_queries_every_time() {
        let mut server = MockServer::typical_server();
        let assembler = SnapshotAssembler::new(MonitorConfig::default());

        assembler.assemble(&mut server).unwrap();
        assembler.assemble(&mut server).unwrap();
        let pings = server.calls().iter().filter(|c| *c == "ping").count();
        assert_eq!(pings, 2);
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let cache = SnapshotCache::new(Duration::ZERO);
        let a = cache
            .get_or_assemble(|| assemble(&mut MockServer::typical_server()))
            .unwrap();
        let b = cache
            .get_or_assemble(|| assemble(&mut MockServer::typical_server()))
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failed_assembly_is_not_cached() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let err = cache.get_or_assemble(|| Err(MonitorError::Connectivity("down".into())));
        assert!(err.is_err());
        let ok = cache.get_or_assemble(|| assemble(&mut MockServer::typical_server()));
        assert!(ok.is_ok());
    }
}
