//! dbpulse - MySQL metrics aggregation and health classification.
//!
//! One call to [`SnapshotAssembler::assemble`] samples a server's status
//! counters and settings over a borrowed connection, derives rates and
//! ratios, classifies them into health indicators, lists the active
//! schema's largest tables and projects when storage runs out.
//!
//! The engine only reads: it issues introspection queries and never
//! changes schema or data.

pub mod analysis;
pub mod collector;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fmt;
pub mod inventory;
pub mod models;
pub mod projection;
pub mod rates;
pub mod snapshot;

pub use config::MonitorConfig;
pub use credentials::ConnectionParams;
pub use error::{MonitorError, ProbeError};
pub use snapshot::{Section, Snapshot, SnapshotAssembler, SnapshotCache};
