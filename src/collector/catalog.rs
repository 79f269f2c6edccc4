//! Declarative probe catalog.
//!
//! Every raw value the engine reads from the server is listed here once:
//! the key it is stored under, where it comes from and its unit. The
//! collector walks this table; adding a metric means adding a row.

use crate::models::Unit;

/// Where a probe reads its value from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeSource {
    /// `SHOW GLOBAL STATUS` counter, parsed as an integer.
    Status(&'static str),
    /// `SHOW GLOBAL VARIABLES` setting, kept as a string.
    Variable(&'static str),
}

/// One catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Probe {
    pub key: &'static str,
    pub source: ProbeSource,
    pub unit: Unit,
}

impl Probe {
    const fn status(key: &'static str, name: &'static str, unit: Unit) -> Self {
        Self {
            key,
            source: ProbeSource::Status(name),
            unit,
        }
    }

    const fn variable(key: &'static str, name: &'static str, unit: Unit) -> Self {
        Self {
            key,
            source: ProbeSource::Variable(name),
            unit,
        }
    }
}

// Counter keys
pub const UPTIME: &str = "uptime";
pub const QUESTIONS: &str = "questions";
pub const QUERIES: &str = "queries";
pub const CONNECTIONS: &str = "connections";
pub const THREADS_CONNECTED: &str = "threads_connected";
pub const THREADS_RUNNING: &str = "threads_running";
pub const THREADS_CREATED: &str = "threads_created";
pub const THREADS_CACHED: &str = "threads_cached";
pub const MAX_USED_CONNECTIONS: &str = "max_used_connections";
pub const ABORTED_CONNECTS: &str = "aborted_connects";
pub const ABORTED_CLIENTS: &str = "aborted_clients";
pub const SLOW_QUERIES: &str = "slow_queries";
pub const BUFFER_READ_REQUESTS: &str = "buffer_read_requests";
pub const BUFFER_READS: &str = "buffer_reads";
pub const BUFFER_PAGES_TOTAL: &str = "buffer_pages_total";
pub const BUFFER_PAGES_FREE: &str = "buffer_pages_free";
pub const ROW_LOCK_WAITS: &str = "row_lock_waits";
pub const KEY_READ_REQUESTS: &str = "key_read_requests";
pub const KEY_READS: &str = "key_reads";
pub const TABLE_CACHE_HITS: &str = "table_cache_hits";
pub const TABLE_CACHE_MISSES: &str = "table_cache_misses";
pub const OPEN_TABLES: &str = "open_tables";
pub const OPENED_TABLES: &str = "opened_tables";
pub const TMP_TABLES: &str = "tmp_tables";
pub const TMP_DISK_TABLES: &str = "tmp_disk_tables";
pub const COM_SELECT: &str = "com_select";
pub const COM_INSERT: &str = "com_insert";
pub const COM_UPDATE: &str = "com_update";
pub const COM_DELETE: &str = "com_delete";
pub const BYTES_SENT: &str = "bytes_sent";
pub const BYTES_RECEIVED: &str = "bytes_received";
pub const SELECT_FULL_JOIN: &str = "select_full_join";
pub const SORT_MERGE_PASSES: &str = "sort_merge_passes";

// Setting keys
pub const MAX_CONNECTIONS: &str = "max_connections";
pub const VERSION: &str = "version";
pub const VERSION_COMMENT: &str = "version_comment";
pub const BUFFER_POOL_SIZE: &str = "buffer_pool_size";
pub const KEY_BUFFER_SIZE: &str = "key_buffer_size";
pub const TABLE_OPEN_CACHE: &str = "table_open_cache";
pub const TMP_TABLE_SIZE: &str = "tmp_table_size";
pub const LONG_QUERY_TIME: &str = "long_query_time";
pub const SLOW_QUERY_LOG: &str = "slow_query_log";

/// The default catalog sampled for every snapshot.
pub const CATALOG: &[Probe] = &[
    Probe::status(UPTIME, "Uptime", Unit::Seconds),
    Probe::status(QUESTIONS, "Questions", Unit::Count),
    Probe::status(QUERIES, "Queries", Unit::Count),
    Probe::status(CONNECTIONS, "Connections", Unit::Count),
    Probe::status(THREADS_CONNECTED, "Threads_connected", Unit::Count),
    Probe::status(THREADS_RUNNING, "Threads_running", Unit::Count),
    Probe::status(THREADS_CREATED, "Threads_created", Unit::Count),
    Probe::status(THREADS_CACHED, "Threads_cached", Unit::Count),
    Probe::status(MAX_USED_CONNECTIONS, "Max_used_connections", Unit::Count),
    Probe::status(ABORTED_CONNECTS, "Aborted_connects", Unit::Count),
    Probe::status(ABORTED_CLIENTS, "Aborted_clients", Unit::Count),
    Probe::status(SLOW_QUERIES, "Slow_queries", Unit::Count),
    Probe::status(
        BUFFER_READ_REQUESTS,
        "Innodb_buffer_pool_read_requests",
        Unit::Count,
    ),
    Probe::status(BUFFER_READS, "Innodb_buffer_pool_reads", Unit::Count),
    Probe::status(BUFFER_PAGES_TOTAL, "Innodb_buffer_pool_pages_total", Unit::Count),
    Probe::status(BUFFER_PAGES_FREE, "Innodb_buffer_pool_pages_free", Unit::Count),
    Probe::status(ROW_LOCK_WAITS, "Innodb_row_lock_waits", Unit::Count),
    Probe::status(KEY_READ_REQUESTS, "Key_read_requests", Unit::Count),
    Probe::status(KEY_READS, "Key_reads", Unit::Count),
    Probe::status(TABLE_CACHE_HITS, "Table_open_cache_hits", Unit::Count),
    Probe::status(TABLE_CACHE_MISSES, "Table_open_cache_misses", Unit::Count),
    Probe::status(OPEN_TABLES, "Open_tables", Unit::Count),
    Probe::status(OPENED_TABLES, "Opened_tables", Unit::Count),
    Probe::status(TMP_TABLES, "Created_tmp_tables", Unit::Count),
    Probe::status(TMP_DISK_TABLES, "Created_tmp_disk_tables", Unit::Count),
    Probe::status(COM_SELECT, "Com_select", Unit::Count),
    Probe::status(COM_INSERT, "Com_insert", Unit::Count),
    Probe::status(COM_UPDATE, "Com_update", Unit::Count),
    Probe::status(COM_DELETE, "Com_delete", Unit::Count),
    Probe::status(BYTES_SENT, "Bytes_sent", Unit::Bytes),
    Probe::status(BYTES_RECEIVED, "Bytes_received", Unit::Bytes),
    Probe::status(SELECT_FULL_JOIN, "Select_full_join", Unit::Count),
    Probe::status(SORT_MERGE_PASSES, "Sort_merge_passes", Unit::Count),
    Probe::variable(MAX_CONNECTIONS, "max_connections", Unit::Count),
    Probe::variable(VERSION, "version", Unit::Text),
    Probe::variable(VERSION_COMMENT, "version_comment", Unit::Text),
    Probe::variable(BUFFER_POOL_SIZE, "innodb_buffer_pool_size", Unit::Bytes),
    Probe::variable(KEY_BUFFER_SIZE, "key_buffer_size", Unit::Bytes),
    Probe::variable(TABLE_OPEN_CACHE, "table_open_cache", Unit::Count),
    Probe::variable(TMP_TABLE_SIZE, "tmp_table_size", Unit::Bytes),
    Probe::variable(LONG_QUERY_TIME, "long_query_time", Unit::Seconds),
    Probe::variable(SLOW_QUERY_LOG, "slow_query_log", Unit::Text),
];

/// Looks up a catalog entry by key.
pub fn find(key: &str) -> Option<&'static Probe> {
    CATALOG.iter().find(|p| p.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<&str> = CATALOG.iter().map(|p| p.key).collect();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn server_names_are_unique() {
        let names: HashSet<ProbeSource> = CATALOG.iter().map(|p| p.source).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn formula_inputs_are_cataloged() {
        for key in [
            UPTIME,
            QUESTIONS,
            CONNECTIONS,
            BUFFER_READ_REQUESTS,
            BUFFER_READS,
            KEY_READ_REQUESTS,
            KEY_READS,
            TABLE_CACHE_HITS,
            TABLE_CACHE_MISSES,
            THREADS_CONNECTED,
            ABORTED_CONNECTS,
            TMP_TABLES,
            TMP_DISK_TABLES,
            COM_SELECT,
            COM_INSERT,
            COM_UPDATE,
            COM_DELETE,
            BYTES_SENT,
            BYTES_RECEIVED,
            SLOW_QUERIES,
            MAX_CONNECTIONS,
        ] {
            assert!(find(key).is_some(), "{key} missing from catalog");
        }
    }

    #[test]
    fn settings_come_from_variables() {
        let probe = find(MAX_CONNECTIONS).unwrap();
        assert_eq!(probe.source, ProbeSource::Variable("max_connections"));
    }
}
