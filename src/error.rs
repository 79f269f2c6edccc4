//! Error types for the monitoring engine.
//!
//! Two levels exist. [`ProbeError`] describes a single failed introspection
//! query and is almost always absorbed where it happens. [`MonitorError`] is
//! what callers of the engine can see; only connectivity loss reaches them
//! during snapshot assembly.

use std::time::Duration;

/// Failure of one introspection query.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// The server rejected or failed the statement.
    Query(String),
    /// The statement did not complete within the probe budget.
    Timeout { probe: String, elapsed: Duration },
    /// The connection itself is unusable.
    Connectivity(String),
    /// A value came back in a shape that could not be interpreted.
    Parse(String),
}

impl ProbeError {
    /// Returns true if the failure means the shared connection is gone.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ProbeError::Connectivity(_))
    }
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Query(msg) => write!(f, "query error: {}", msg),
            ProbeError::Timeout { probe, elapsed } => {
                write!(f, "probe {} timed out after {:?}", probe, elapsed)
            }
            ProbeError::Connectivity(msg) => write!(f, "connection unusable: {}", msg),
            ProbeError::Parse(msg) => write!(f, "unexpected value: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Error surfaced by the engine to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// The shared connection is unusable; no snapshot can be produced.
    Connectivity(String),
    /// No resolver strategy could name the active schema.
    Resolution(String),
    /// A tunable is out of range.
    InvalidConfig(String),
    /// Connection parameters failed validation.
    InvalidCredentials(String),
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::Connectivity(msg) => write!(f, "MySQL: {}", msg),
            MonitorError::Resolution(msg) => write!(f, "schema resolution failed: {}", msg),
            MonitorError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            MonitorError::InvalidCredentials(msg) => {
                write!(f, "invalid connection parameters: {}", msg)
            }
        }
    }
}

impl std::error::Error for MonitorError {}

impl From<ProbeError> for MonitorError {
    fn from(e: ProbeError) -> Self {
        MonitorError::Connectivity(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connectivity_is_flagged() {
        assert!(ProbeError::Connectivity("gone".into()).is_connectivity());
        assert!(!ProbeError::Query("denied".into()).is_connectivity());
        assert!(
            !ProbeError::Timeout {
                probe: "uptime".into(),
                elapsed: Duration::from_secs(6),
            }
            .is_connectivity()
        );
    }

    #[test]
    fn display_includes_context() {
        let e = MonitorError::Connectivity("connection refused".into());
        assert_eq!(e.to_string(), "MySQL: connection refused");
    }
}
