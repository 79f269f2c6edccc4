//! MySQL introspector.
//!
//! Issues read-only introspection queries over one authenticated
//! connection:
//! - `SHOW GLOBAL STATUS` / `SHOW GLOBAL VARIABLES` for the probe catalog
//! - `information_schema.tables` for table listing and sizes
//! - `SHOW FULL TABLES` + `COUNT(*)` when catalog metadata is not visible
//!
//! The connection is opened once with driver-level read/write timeouts equal
//! to the probe budget and a short session setup, then borrowed by the
//! assembler for each snapshot.

mod queries;

use std::time::{Duration, Instant};

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use tracing::{debug, info};

use crate::collector::traits::ServerIntrospector;
use crate::config::MonitorConfig;
use crate::credentials::ConnectionParams;
use crate::error::{MonitorError, ProbeError};
use crate::models::TableStat;
use queries::*;

/// TCP connect timeout for new connections.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Introspector backed by a live MySQL connection.
pub struct MysqlIntrospector {
    conn: Conn,
    database: String,
    probe_timeout: Duration,
}

impl MysqlIntrospector {
    /// Connects and verifies that the requested schema is selected.
    ///
    /// Returns `MonitorError::Connectivity` if the server is unreachable,
    /// rejects the login, or reports a different current schema.
    pub fn connect(
        params: &ConnectionParams,
        config: &MonitorConfig,
    ) -> Result<Self, MonitorError> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(params.host()))
            .tcp_port(params.port())
            .user(Some(params.user()))
            .pass(Some(params.password()))
            .db_name(Some(params.database()))
            .tcp_connect_timeout(Some(CONNECT_TIMEOUT))
            .read_timeout(Some(config.probe_timeout))
            .write_timeout(Some(config.probe_timeout))
            .init(SESSION_INIT.to_vec());

        let conn = Conn::new(opts)
            .map_err(|e| MonitorError::Connectivity(format_mysql_error(&e)))?;

        let mut introspector = Self {
            conn,
            database: params.database().to_string(),
            probe_timeout: config.probe_timeout,
        };
        introspector.verify_database_selection(params.database())?;

        info!(host = params.host(), port = params.port(), database = params.database(),
            "connected to MySQL");
        Ok(introspector)
    }

    fn verify_database_selection(&mut self, expected: &str) -> Result<(), MonitorError> {
        let current = self.current_schema()?;
        match current.as_deref() {
            None | Some("") => Err(MonitorError::Connectivity(
                "no database selected after connection".to_string(),
            )),
            Some(db) if db != expected => Err(MonitorError::Connectivity(format!(
                "database mismatch: expected {}, got {}",
                expected, db
            ))),
            Some(_) => Ok(()),
        }
    }

    /// Runs `f` against the connection, classifying driver errors.
    fn timed<T>(
        &mut self,
        probe: &str,
        f: impl FnOnce(&mut Conn) -> mysql::Result<T>,
    ) -> Result<T, ProbeError> {
        let start = Instant::now();
        let result = f(&mut self.conn);
        let elapsed = start.elapsed();
        debug!(probe, ?elapsed, "introspection query finished");
        result.map_err(|e| classify_mysql_error(&e, probe, elapsed, self.probe_timeout))
    }

    fn show_value(&mut self, query: Option<String>, name: &str) -> Result<Option<String>, ProbeError> {
        let query = query.ok_or_else(|| ProbeError::Query(format!("invalid probe name '{}'", name)))?;
        let row = self.timed(name, |conn| conn.query_first::<(String, String), _>(query))?;
        Ok(row.map(|(_, value)| value))
    }
}

impl ServerIntrospector for MysqlIntrospector {
    fn status_value(&mut self, name: &str) -> Result<Option<String>, ProbeError> {
        self.show_value(build_status_query(name), name)
    }

    fn variable_value(&mut self, name: &str) -> Result<Option<String>, ProbeError> {
        self.show_value(build_variable_query(name), name)
    }

    fn refresh_status(&mut self) -> Result<(), ProbeError> {
        self.timed("refresh", |conn| conn.query_drop(REFRESH_QUERY))
    }

    fn ping(&mut self) -> Result<(), ProbeError> {
        self.timed("ping", |conn| conn.query_drop(PING_QUERY))
    }

    fn session_schema(&self) -> Option<String> {
        Some(self.database.clone()).filter(|db| !db.is_empty())
    }

    fn current_schema(&mut self) -> Result<Option<String>, ProbeError> {
        let row = self.timed("current_schema", |conn| {
            conn.query_first::<Option<String>, _>(CURRENT_SCHEMA_QUERY)
        })?;
        Ok(row.flatten())
    }

    fn table_stats(&mut self, schema: &str, limit: usize) -> Result<Vec<TableStat>, ProbeError> {
        let rows = self.timed("table_stats", |conn| {
            conn.exec::<(String, Option<u64>, Option<String>), _, _>(
                TABLE_STATS_QUERY,
                (schema, limit as u64),
            )
        })?;
        Ok(rows
            .into_iter()
            .map(|(name, rows, size)| TableStat::new(name, rows.unwrap_or(0), parse_mb(size)))
            .collect())
    }

    fn table_names(&mut self, schema: &str) -> Result<Vec<String>, ProbeError> {
        let query = build_show_tables_query(schema);
        let rows = self.timed("table_names", |conn| {
            conn.query::<(String, String), _>(query)
        })?;
        Ok(rows
            .into_iter()
            .filter(|(_, kind)| kind == "BASE TABLE")
            .map(|(name, _)| name)
            .collect())
    }

    fn row_count(&mut self, schema: &str, table: &str) -> Result<u64, ProbeError> {
        let query = build_row_count_query(schema, table);
        let count = self.timed("row_count", |conn| conn.query_first::<u64, _>(query))?;
        Ok(count.unwrap_or(0))
    }

    fn table_size_mb(&mut self, schema: &str, table: &str) -> Result<f64, ProbeError> {
        let size = self.timed("table_size", |conn| {
            conn.exec_first::<Option<String>, _, _>(TABLE_SIZE_QUERY, (schema, table))
        })?;
        match size {
            Some(value) => Ok(parse_mb(value)),
            None => Err(ProbeError::Query(format!(
                "table {} not visible in information_schema",
                table
            ))),
        }
    }

    fn database_size_mb(&mut self) -> Result<f64, ProbeError> {
        let size = self.timed("database_size", |conn| {
            conn.query_first::<Option<String>, _>(DATABASE_SIZE_QUERY)
        })?;
        // An empty schema has no rows to group.
        Ok(parse_mb(size.flatten()))
    }
}

fn parse_mb(value: Option<String>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Maps a driver error onto the probe error taxonomy.
///
/// Server-side errors are transient query failures. I/O errors are timeouts
/// when the probe ran past its budget and connectivity losses otherwise;
/// driver-level errors always mean the connection is unusable.
fn classify_mysql_error(
    e: &mysql::Error,
    probe: &str,
    elapsed: Duration,
    budget: Duration,
) -> ProbeError {
    match e {
        mysql::Error::MySqlError(_) => ProbeError::Query(format_mysql_error(e)),
        mysql::Error::IoError(io)
            if elapsed >= budget
                || matches!(
                    io.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                ) =>
        {
            ProbeError::Timeout {
                probe: probe.to_string(),
                elapsed,
            }
        }
        mysql::Error::IoError(_) | mysql::Error::DriverError(_) => {
            ProbeError::Connectivity(format_mysql_error(e))
        }
        _ => ProbeError::Query(format_mysql_error(e)),
    }
}

/// Formats MySQL error message for display.
pub(crate) fn format_mysql_error(e: &mysql::Error) -> String {
    match e {
        mysql::Error::MySqlError(err) => format!("ERROR {}: {}", err.code, err.message),
        _ => {
            let msg = e.to_string();
            if msg.contains("Connection refused") {
                "connection refused".to_string()
            } else if msg.contains("Access denied") {
                "access denied".to_string()
            } else {
                msg
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mb_handles_nulls_and_garbage() {
        assert_eq!(parse_mb(Some("12.50".to_string())), 12.5);
        assert_eq!(parse_mb(Some(" 3 ".to_string())), 3.0);
        assert_eq!(parse_mb(None), 0.0);
        assert_eq!(parse_mb(Some("NaN".to_string())), 0.0);
        assert_eq!(parse_mb(Some("-1".to_string())), 0.0);
    }

    #[test]
    fn io_errors_split_into_timeout_and_connectivity() {
        let budget = Duration::from_secs(5);
        let timed_out = mysql::Error::IoError(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "read timed out",
        ));
        let reset = mysql::Error::IoError(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ));

        assert!(matches!(
            classify_mysql_error(&timed_out, "uptime", Duration::from_secs(1), budget),
            ProbeError::Timeout { .. }
        ));
        assert!(
            classify_mysql_error(&reset, "uptime", Duration::from_millis(3), budget)
                .is_connectivity()
        );
        assert!(matches!(
            classify_mysql_error(&reset, "uptime", Duration::from_secs(6), budget),
            ProbeError::Timeout { .. }
        ));
    }
}
