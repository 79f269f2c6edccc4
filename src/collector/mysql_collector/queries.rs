//! SQL text for MySQL introspection queries.

/// Base tables of one schema with estimated rows and data+index size,
/// largest first. Parameters: schema, limit.
pub(super) const TABLE_STATS_QUERY: &str = r#"
    SELECT
        table_name,
        table_rows,
        CAST(ROUND((COALESCE(data_length, 0) + COALESCE(index_length, 0)) / 1024 / 1024, 2) AS CHAR)
    FROM information_schema.tables
    WHERE table_schema = ?
      AND table_type = 'BASE TABLE'
    ORDER BY (COALESCE(data_length, 0) + COALESCE(index_length, 0)) DESC
    LIMIT ?
"#;

/// Data+index size of one table in MB. Parameters: schema, table.
pub(super) const TABLE_SIZE_QUERY: &str = r#"
    SELECT
        CAST(ROUND((COALESCE(data_length, 0) + COALESCE(index_length, 0)) / 1024 / 1024, 2) AS CHAR)
    FROM information_schema.tables
    WHERE table_schema = ?
      AND table_name = ?
"#;

/// Total data+index size of the current schema in MB.
pub(super) const DATABASE_SIZE_QUERY: &str = r#"
    SELECT
        CAST(ROUND(SUM(data_length + index_length) / 1024 / 1024, 2) AS CHAR)
    FROM information_schema.tables
    WHERE table_schema = DATABASE()
    GROUP BY table_schema
"#;

pub(super) const CURRENT_SCHEMA_QUERY: &str = "SELECT DATABASE()";

pub(super) const PING_QUERY: &str = "SELECT 1";

pub(super) const REFRESH_QUERY: &str = "FLUSH STATUS";

/// Session setup issued on every new connection.
pub(super) const SESSION_INIT: &[&str] = &[
    "SET NAMES utf8mb4",
    "SET time_zone = '+00:00'",
    "SET SESSION wait_timeout = 300",
];

/// Builds `SHOW GLOBAL STATUS LIKE '<name>'`.
///
/// Returns `None` if `name` is not a plain identifier; catalog names never
/// need escaping, so anything else is rejected rather than quoted.
pub(super) fn build_status_query(name: &str) -> Option<String> {
    is_plain_name(name).then(|| format!("SHOW GLOBAL STATUS LIKE '{}'", name))
}

/// Builds `SHOW GLOBAL VARIABLES LIKE '<name>'`.
pub(super) fn build_variable_query(name: &str) -> Option<String> {
    is_plain_name(name).then(|| format!("SHOW GLOBAL VARIABLES LIKE '{}'", name))
}

/// Builds `SHOW FULL TABLES FROM <schema>`.
pub(super) fn build_show_tables_query(schema: &str) -> String {
    format!("SHOW FULL TABLES FROM {}", quote_ident(schema))
}

/// Builds an exact row count for one table.
pub(super) fn build_row_count_query(schema: &str, table: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {}.{}",
        quote_ident(schema),
        quote_ident(table)
    )
}

/// Quotes an identifier with backticks, doubling embedded backticks.
pub(super) fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_query_for_catalog_name() {
        assert_eq!(
            build_status_query("Innodb_buffer_pool_reads").as_deref(),
            Some("SHOW GLOBAL STATUS LIKE 'Innodb_buffer_pool_reads'")
        );
    }

    #[test]
    fn status_query_rejects_wildcards_and_quotes() {
        assert!(build_status_query("Com_%").is_none());
        assert!(build_variable_query("x' OR '1").is_none());
        assert!(build_variable_query("").is_none());
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("orders"), "`orders`");
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
        assert_eq!(
            build_row_count_query("shop", "order items"),
            "SELECT COUNT(*) FROM `shop`.`order items`"
        );
        assert_eq!(build_show_tables_query("shop"), "SHOW FULL TABLES FROM `shop`");
    }

    #[test]
    fn listing_query_filters_base_tables() {
        assert!(TABLE_STATS_QUERY.contains("table_type = 'BASE TABLE'"));
        assert!(TABLE_STATS_QUERY.contains("LIMIT ?"));
    }
}
