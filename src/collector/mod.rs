//! Server metrics collection.
//!
//! This module provides the raw-metric half of the engine: a declarative
//! probe catalog, the collector that walks it, and the connection seam the
//! collector runs against.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   RawMetricCollector                    │
//! │   catalog::CATALOG ──► status / variable probes         │
//! │                 │                                       │
//! │        ┌────────▼─────────┐                             │
//! │        │ ServerIntrospector│ (trait)                    │
//! │        └────────┬─────────┘                             │
//! └─────────────────┼───────────────────────────────────────┘
//!                   │
//!          ┌────────┴─────────┐
//!          │                  │
//!   ┌──────▼────────┐  ┌──────▼──────┐
//!   │MysqlIntrospector│ │ MockServer  │
//!   │ (live server) │  │ (testing)   │
//!   └───────────────┘  └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use dbpulse::collector::{MockServer, RawMetricCollector};
//! use dbpulse::config::MonitorConfig;
//!
//! let mut server = MockServer::typical_server();
//! let mut collector = RawMetricCollector::new(&MonitorConfig::default());
//! let sample = collector.collect(&mut server).unwrap();
//! assert_eq!(sample.counters.get("uptime"), 86_400);
//! ```

pub mod catalog;
#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
mod mysql_collector;
pub mod traits;

pub use collector::{CollectorTiming, RawMetricCollector, RawSample};
pub use mock::MockServer;
pub use mysql_collector::MysqlIntrospector;
pub use traits::ServerIntrospector;
