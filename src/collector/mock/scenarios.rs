//! Pre-built mock server scenarios for testing.
//!
//! These scenarios provide realistic server states for exercising the
//! collector, classifier and inventory end to end.

use super::server::MockServer;

#[allow(dead_code)]
impl MockServer {
    /// A healthy server that has been up for a day.
    ///
    /// Schema `shop` with three tables, full catalog visibility.
    pub fn typical_server() -> Self {
        let mut server = Self::new();

        server.add_status("Uptime", 86_400);
        server.add_status("Questions", 864_000);
        server.add_status("Queries", 900_000);
        server.add_status("Connections", 4_000);
        server.add_status("Threads_connected", 30);
        server.add_status("Threads_running", 3);
        server.add_status("Threads_created", 40);
        server.add_status("Threads_cached", 8);
        server.add_status("Max_used_connections", 55);
        server.add_status("Aborted_connects", 20);
        server.add_status("Aborted_clients", 4);
        server.add_status("Slow_queries", 12);
        server.add_status("Innodb_buffer_pool_read_requests", 1_000_000);
        server.add_status("Innodb_buffer_pool_reads", 10_000);
        server.add_status("Innodb_buffer_pool_pages_total", 8_192);
        server.add_status("Innodb_buffer_pool_pages_free", 2_048);
        server.add_status("Innodb_row_lock_waits", 3);
        server.add_status("Key_read_requests", 5_000);
        server.add_status("Key_reads", 50);
        server.add_status("Table_open_cache_hits", 9_900);
        server.add_status("Table_open_cache_misses", 100);
        server.add_status("Open_tables", 120);
        server.add_status("Opened_tables", 180);
        server.add_status("Created_tmp_tables", 1_000);
        server.add_status("Created_tmp_disk_tables", 50);
        server.add_status("Com_select", 600_000);
        server.add_status("Com_insert", 200_000);
        server.add_status("Com_update", 150_000);
        server.add_status("Com_delete", 50_000);
        server.add_status("Bytes_sent", 524_288_000);
        server.add_status("Bytes_received", 104_857_600);
        server.add_status("Select_full_join", 0);
        server.add_status("Sort_merge_passes", 0);

        server.add_variable("max_connections", "151");
        server.add_variable("version", "8.0.36");
        server.add_variable("version_comment", "MySQL Community Server - GPL");
        server.add_variable("innodb_buffer_pool_size", "134217728");
        server.add_variable("key_buffer_size", "8388608");
        server.add_variable("table_open_cache", "4000");
        server.add_variable("tmp_table_size", "16777216");
        server.add_variable("long_query_time", "10.000000");
        server.add_variable("slow_query_log", "OFF");

        server.set_session_schema(Some("shop"));
        server.set_current_schema(Some("shop"));
        server.add_table("orders", 120_000, 48.5);
        server.add_table("users", 8_000, 6.25);
        server.add_table("products", 1_500, 1.5);
        server.set_database_size_mb(Some(56.25));

        server
    }

    /// A server restarted 30 minutes ago; too young for a slow-query rate.
    pub fn fresh_server() -> Self {
        let mut server = Self::typical_server();
        server.add_status("Uptime", 1_800);
        server.add_status("Slow_queries", 40);
        server
    }

    /// A server under pressure: connections near the limit, cold buffer pool,
    /// most temporary tables spilling to disk.
    pub fn overloaded_server() -> Self {
        let mut server = Self::typical_server();
        server.add_status("Threads_connected", 140);
        server.add_status("Innodb_buffer_pool_read_requests", 100_000);
        server.add_status("Innodb_buffer_pool_reads", 20_000);
        server.add_status("Created_tmp_tables", 1_000);
        server.add_status("Created_tmp_disk_tables", 400);
        server.add_status("Slow_queries", 2_400);
        server.set_database_size_mb(Some(980.0));
        server
    }

    /// A login without `information_schema` visibility.
    ///
    /// The catalog listing is empty, the session carries no schema and only
    /// `SHOW TABLES` sees the tables. `users` also fails its size lookup.
    pub fn restricted_catalog() -> Self {
        let mut server = Self::typical_server();
        server.clear_tables();
        server.set_session_schema(None);
        server.add_hidden_table("orders", 120_000, Some(48.5));
        server.add_hidden_table("users", 8_000, None);
        server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::ServerIntrospector;

    #[test]
    fn typical_server_has_schema_and_tables() {
        let mut server = MockServer::typical_server();
        assert_eq!(server.session_schema().as_deref(), Some("shop"));
        assert_eq!(server.table_stats("shop", 20).unwrap().len(), 3);
    }

    #[test]
    fn restricted_catalog_hides_listing() {
        let mut server = MockServer::restricted_catalog();
        assert!(server.table_stats("shop", 20).unwrap().is_empty());
        assert_eq!(server.table_names("shop").unwrap(), vec!["orders", "users"]);
        assert!(server.table_size_mb("shop", "users").is_err());
    }
}
