//! In-memory mock server for testing the engine without MySQL.
//!
//! `MockServer` answers every `ServerIntrospector` query from maps filled in
//! by the test, and records the calls it received.

use std::collections::HashMap;

use crate::collector::traits::ServerIntrospector;
use crate::error::ProbeError;
use crate::models::TableStat;

/// In-memory introspector.
///
/// Status counters and settings are stored under their server names
/// (`Questions`, `max_connections`). Tables present in `tables` but missing
/// from `sizes` fail their individual size lookup.
#[derive(Debug, Clone, Default)]
pub struct MockServer {
    status: HashMap<String, String>,
    variables: HashMap<String, String>,
    failures: HashMap<String, ProbeError>,
    session_schema: Option<String>,
    current_schema: Option<String>,
    listing: Vec<TableStat>,
    tables: Vec<String>,
    row_counts: HashMap<String, u64>,
    sizes: HashMap<String, f64>,
    database_size_mb: Option<f64>,
    disconnected: bool,
    calls: Vec<String>,
}

impl MockServer {
    /// Creates an empty mock server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a `SHOW GLOBAL STATUS` value.
    pub fn add_status(&mut self, name: &str, value: impl ToString) {
        self.status.insert(name.to_string(), value.to_string());
    }

    /// Sets a `SHOW GLOBAL VARIABLES` value.
    pub fn add_variable(&mut self, name: &str, value: impl ToString) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    /// Makes every query touching `name` fail with `error`.
    ///
    /// `name` may be a status/variable name, a table name, or one of the
    /// operation names `refresh`, `current_schema`, `table_stats`,
    /// `table_names` and `database_size`.
    pub fn fail_probe(&mut self, name: &str, error: ProbeError) {
        self.failures.insert(name.to_string(), error);
    }

    pub fn set_session_schema(&mut self, schema: Option<&str>) {
        self.session_schema = schema.map(str::to_string);
    }

    pub fn set_current_schema(&mut self, schema: Option<&str>) {
        self.current_schema = schema.map(str::to_string);
    }

    /// Adds a table visible to both the catalog listing and the existence probe.
    pub fn add_table(&mut self, name: &str, rows: u64, size_mb: f64) {
        self.listing.push(TableStat::new(name, rows, size_mb));
        self.add_hidden_table(name, rows, Some(size_mb));
    }

    /// Adds a table that the catalog listing does not return.
    ///
    /// `size_mb: None` makes its individual size lookup fail.
    pub fn add_hidden_table(&mut self, name: &str, rows: u64, size_mb: Option<f64>) {
        self.tables.push(name.to_string());
        self.row_counts.insert(name.to_string(), rows);
        if let Some(size) = size_mb {
            self.sizes.insert(name.to_string(), size);
        }
    }

    /// Removes every table from the listing and the existence probe.
    pub fn clear_tables(&mut self) {
        self.listing.clear();
        self.tables.clear();
        self.row_counts.clear();
        self.sizes.clear();
    }

    pub fn set_database_size_mb(&mut self, size: Option<f64>) {
        self.database_size_mb = size;
    }

    /// Simulates a dead connection: every query fails with a connectivity error.
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.disconnected = disconnected;
    }

    /// Returns the queries received so far, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn enter(&mut self, call: String, key: &str) -> Result<(), ProbeError> {
        self.calls.push(call);
        if self.disconnected {
            return Err(ProbeError::Connectivity("server has gone away".to_string()));
        }
        match self.failures.get(key) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl ServerIntrospector for MockServer {
    fn status_value(&mut self, name: &str) -> Result<Option<String>, ProbeError> {
        self.enter(format!("status:{name}"), name)?;
        Ok(self.status.get(name).cloned())
    }

    fn variable_value(&mut self, name: &str) -> Result<Option<String>, ProbeError> {
        self.enter(format!("variable:{name}"), name)?;
        Ok(self.variables.get(name).cloned())
    }

    fn refresh_status(&mut self) -> Result<(), ProbeError> {
        self.enter("refresh".to_string(), "refresh")
    }

    fn ping(&mut self) -> Result<(), ProbeError> {
        self.enter("ping".to_string(), "ping")
    }

    fn session_schema(&self) -> Option<String> {
        self.session_schema.clone()
    }

    fn current_schema(&mut self) -> Result<Option<String>, ProbeError> {
        self.enter("current_schema".to_string(), "current_schema")?;
        Ok(self.current_schema.clone())
    }

    fn table_stats(&mut self, schema: &str, limit: usize) -> Result<Vec<TableStat>, ProbeError> {
        self.enter(format!("table_stats:{schema}"), "table_stats")?;
        let mut rows = self.listing.clone();
        rows.sort_by(|a, b| b.size_mb.total_cmp(&a.size_mb));
        rows.truncate(limit);
        Ok(rows)
    }

    fn table_names(&mut self, schema: &str) -> Result<Vec<String>, ProbeError> {
        self.enter(format!("table_names:{schema}"), "table_names")?;
        Ok(self.tables.clone())
    }

    fn row_count(&mut self, _schema: &str, table: &str) -> Result<u64, ProbeError> {
        self.enter(format!("row_count:{table}"), table)?;
        Ok(self.row_counts.get(table).copied().unwrap_or(0))
    }

    fn table_size_mb(&mut self, _schema: &str, table: &str) -> Result<f64, ProbeError> {
        self.calls.push(format!("table_size:{table}"));
        if self.disconnected {
            return Err(ProbeError::Connectivity("server has gone away".to_string()));
        }
        self.sizes
            .get(table)
            .copied()
            .ok_or_else(|| ProbeError::Query(format!("SELECT command denied for table '{table}'")))
    }

    fn database_size_mb(&mut self) -> Result<f64, ProbeError> {
        self.enter("database_size".to_string(), "database_size")?;
        self.database_size_mb
            .ok_or_else(|| ProbeError::Query("no rows from information_schema".to_string()))
    }
}
