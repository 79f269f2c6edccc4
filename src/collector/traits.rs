//! Abstraction over the monitored server connection.
//!
//! The `ServerIntrospector` trait allows the engine to run against a live
//! MySQL connection or against the in-memory mock used by tests. Every
//! method is a read: the engine never mutates schema or data.

use crate::error::ProbeError;
use crate::models::TableStat;

/// Read-only introspection queries issued by the engine.
///
/// Implementations must be usable as `&mut dyn ServerIntrospector`; the
/// assembler borrows one connection for the whole snapshot and never shares
/// it across threads.
pub trait ServerIntrospector {
    /// Reads a `SHOW GLOBAL STATUS` value. `Ok(None)` if the server does not
    /// report the counter.
    fn status_value(&mut self, name: &str) -> Result<Option<String>, ProbeError>;

    /// Reads a `SHOW GLOBAL VARIABLES` value. `Ok(None)` if unknown.
    fn variable_value(&mut self, name: &str) -> Result<Option<String>, ProbeError>;

    /// Refreshes status counters before sampling (`FLUSH STATUS`).
    fn refresh_status(&mut self) -> Result<(), ProbeError>;

    /// Cheap round trip proving the connection is usable.
    fn ping(&mut self) -> Result<(), ProbeError>;

    /// Schema the connection was opened against, if any.
    fn session_schema(&self) -> Option<String>;

    /// Asks the server for its current schema (`SELECT DATABASE()`).
    fn current_schema(&mut self) -> Result<Option<String>, ProbeError>;

    /// Catalog metadata for base tables, largest first, at most `limit` rows.
    fn table_stats(&mut self, schema: &str, limit: usize) -> Result<Vec<TableStat>, ProbeError>;

    /// Names of base tables visible in the schema.
    fn table_names(&mut self, schema: &str) -> Result<Vec<String>, ProbeError>;

    /// Live row count of one table.
    fn row_count(&mut self, schema: &str, table: &str) -> Result<u64, ProbeError>;

    /// Catalog data+index size of one table in MB.
    fn table_size_mb(&mut self, schema: &str, table: &str) -> Result<f64, ProbeError>;

    /// Total data+index size of the current schema in MB.
    fn database_size_mb(&mut self) -> Result<f64, ProbeError>;
}
