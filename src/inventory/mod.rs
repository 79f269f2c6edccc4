//! Schema inventory: which schema is active and what tables it holds.
//!
//! Listing uses catalog metadata first (`information_schema.tables`). When
//! that returns nothing but `SHOW TABLES` does see tables, typically a
//! login without catalog privileges, each table is counted and sized one
//! at a time. A table whose size lookup fails is still listed with zero
//! rows/size; a table known to exist is never dropped.

pub mod resolver;

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collector::traits::ServerIntrospector;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, ProbeError};
use crate::models::TableStat;
use resolver::{SchemaResolver, default_chain, resolve_schema};

/// Which listing path produced the tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSource {
    Catalog,
    Fallback,
}

/// Schema name plus its tables, largest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableInventory {
    pub schema: String,
    pub resolved_by: &'static str,
    pub source: ListingSource,
    pub tables: Vec<TableStat>,
}

pub struct SchemaInventory {
    resolvers: Vec<Box<dyn SchemaResolver>>,
    limit: usize,
}

impl SchemaInventory {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            resolvers: default_chain(),
            limit: config.table_listing_limit,
        }
    }

    /// Replaces the resolver chain.
    pub fn with_resolvers(mut self, resolvers: Vec<Box<dyn SchemaResolver>>) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Resolves the schema and lists its tables.
    ///
    /// Fails with `MonitorError::Resolution` if no schema name is found and
    /// with `MonitorError::Connectivity` if the connection drops.
    pub fn collect(
        &self,
        conn: &mut dyn ServerIntrospector,
        hint: Option<&str>,
    ) -> Result<TableInventory, MonitorError> {
        let schema = resolve_schema(&self.resolvers, conn, hint)?;
        let (tables, source) = self
            .list_tables(conn, &schema.name)
            .map_err(|e| match e {
                e if e.is_connectivity() => MonitorError::from(e),
                e => MonitorError::Resolution(format!(
                    "tables of {} not visible: {}",
                    schema.name, e
                )),
            })?;

        debug!(schema = %schema.name, tables = tables.len(), ?source, "inventory collected");
        Ok(TableInventory {
            schema: schema.name,
            resolved_by: schema.resolved_by,
            source,
            tables,
        })
    }

    fn list_tables(
        &self,
        conn: &mut dyn ServerIntrospector,
        schema: &str,
    ) -> Result<(Vec<TableStat>, ListingSource), ProbeError> {
        let primary = match conn.table_stats(schema, self.limit) {
            Ok(rows) => Ok(dedup_by_name(rows)),
            Err(e) if e.is_connectivity() => return Err(e),
            Err(e) => {
                warn!(schema, error = %e, "catalog table listing failed");
                Err(e)
            }
        };

        if let Ok(rows) = &primary {
            if !rows.is_empty() {
                return Ok((rows.clone(), ListingSource::Catalog));
            }
        }

        let names = match conn.table_names(schema) {
            Ok(names) => names,
            Err(e) if e.is_connectivity() => return Err(e),
            Err(e) => {
                warn!(schema, error = %e, "table existence probe failed");
                // Nothing more to learn: report the primary result or its error.
                return primary.map(|rows| (rows, ListingSource::Catalog));
            }
        };

        if names.is_empty() {
            return Ok((Vec::new(), ListingSource::Catalog));
        }

        info!(schema, tables = names.len(), "catalog listing empty, sizing tables individually");
        Ok((self.fallback(conn, schema, names)?, ListingSource::Fallback))
    }

    fn fallback(
        &self,
        conn: &mut dyn ServerIntrospector,
        schema: &str,
        names: Vec<String>,
    ) -> Result<Vec<TableStat>, ProbeError> {
        let mut seen = HashSet::new();
        let mut tables = Vec::with_capacity(names.len());

        for name in names {
            if !seen.insert(name.clone()) {
                continue;
            }

            let rows = match conn.row_count(schema, &name) {
                Ok(rows) => rows,
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => {
                    warn!(schema, table = %name, error = %e, "row count failed");
                    0
                }
            };
            let size_mb = match conn.table_size_mb(schema, &name) {
                Ok(size) => size,
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => {
                    warn!(schema, table = %name, error = %e, "size lookup failed");
                    0.0
                }
            };
            tables.push(TableStat::new(name, rows, size_mb));
        }

        tables.sort_by(|a, b| b.size_mb.total_cmp(&a.size_mb));
        Ok(tables)
    }
}

fn dedup_by_name(rows: Vec<TableStat>) -> Vec<TableStat> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|t| seen.insert(t.name.clone()))
        .collect()
}
