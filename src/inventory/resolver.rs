//! Schema name resolution.
//!
//! The active schema is found by trying resolver strategies in order; the
//! first one that yields a non-empty name wins. A strategy that fails with
//! anything other than a connectivity error is skipped.

use tracing::{debug, warn};

use crate::collector::traits::ServerIntrospector;
use crate::error::{MonitorError, ProbeError};

pub trait SchemaResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the schema name this strategy sees, if any.
    fn resolve(
        &self,
        conn: &mut dyn ServerIntrospector,
        hint: Option<&str>,
    ) -> Result<Option<String>, ProbeError>;
}

/// Name carried by the connection itself.
pub struct SessionContextResolver;

impl SchemaResolver for SessionContextResolver {
    fn name(&self) -> &'static str {
        "session_context"
    }

    fn resolve(
        &self,
        conn: &mut dyn ServerIntrospector,
        _hint: Option<&str>,
    ) -> Result<Option<String>, ProbeError> {
        Ok(conn.session_schema())
    }
}

/// Name remembered by the caller from an earlier session.
pub struct SessionHintResolver;

impl SchemaResolver for SessionHintResolver {
    fn name(&self) -> &'static str {
        "session_hint"
    }

    fn resolve(
        &self,
        _conn: &mut dyn ServerIntrospector,
        hint: Option<&str>,
    ) -> Result<Option<String>, ProbeError> {
        Ok(hint.map(str::to_string))
    }
}

/// Asks the server directly.
pub struct CurrentSchemaResolver;

impl SchemaResolver for CurrentSchemaResolver {
    fn name(&self) -> &'static str {
        "current_schema"
    }

    fn resolve(
        &self,
        conn: &mut dyn ServerIntrospector,
        _hint: Option<&str>,
    ) -> Result<Option<String>, ProbeError> {
        conn.current_schema()
    }
}

pub fn default_chain() -> Vec<Box<dyn SchemaResolver>> {
    vec![
        Box::new(SessionContextResolver),
        Box::new(SessionHintResolver),
        Box::new(CurrentSchemaResolver),
    ]
}

/// A resolved schema name and the strategy that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub name: String,
    pub resolved_by: &'static str,
}

/// Runs the chain; first non-empty name wins.
pub fn resolve_schema(
    chain: &[Box<dyn SchemaResolver>],
    conn: &mut dyn ServerIntrospector,
    hint: Option<&str>,
) -> Result<ResolvedSchema, MonitorError> {
    for resolver in chain {
        match resolver.resolve(conn, hint) {
            Ok(Some(name)) if !name.trim().is_empty() => {
                debug!(schema = %name, resolver = resolver.name(), "schema resolved");
                return Ok(ResolvedSchema {
                    name: name.trim().to_string(),
                    resolved_by: resolver.name(),
                });
            }
            Ok(_) => {}
            Err(e) if e.is_connectivity() => return Err(MonitorError::from(e)),
            Err(e) => warn!(resolver = resolver.name(), error = %e, "schema resolver failed"),
        }
    }

    let tried: Vec<&str> = chain.iter().map(|r| r.name()).collect();
    Err(MonitorError::Resolution(format!(
        "no schema name from {}",
        tried.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockServer;

    fn resolve(server: &mut MockServer, hint: Option<&str>) -> Result<ResolvedSchema, MonitorError> {
        resolve_schema(&default_chain(), server, hint)
    }

    #[test]
    fn session_context_wins_first() {
        let mut server = MockServer::new();
        server.set_session_schema(Some("shop"));
        server.set_current_schema(Some("other"));

        let resolved = resolve(&mut server, Some("hinted")).unwrap();
        assert_eq!(resolved.name, "shop");
        assert_eq!(resolved.resolved_by, "session_context");
        assert!(server.calls().is_empty());
    }

    #[test]
    fn hint_used_when_session_is_empty() {
        let mut server = MockServer::new();
        server.set_session_schema(Some("  "));
        server.set_current_schema(Some("other"));

        let resolved = resolve(&mut server, Some("hinted")).unwrap();
        assert_eq!(resolved.name, "hinted");
        assert_eq!(resolved.resolved_by, "session_hint");
    }

    #[test]
    fn server_probe_is_last_resort() {
        let mut server = MockServer::new();
        server.set_current_schema(Some("shop"));

        let resolved = resolve(&mut server, None).unwrap();
        assert_eq!(resolved.name, "shop");
        assert_eq!(resolved.resolved_by, "current_schema");
    }

    #[test]
    fn all_empty_is_a_resolution_error() {
        let mut server = MockServer::new();
        let err = resolve(&mut server, Some("")).unwrap_err();
        assert!(matches!(err, MonitorError::Resolution(_)));
    }

    #[test]
    fn failing_probe_counts_as_empty() {
        let mut server = MockServer::new();
        server.fail_probe("current_schema", ProbeError::Query("denied".into()));
        let err = resolve(&mut server, None).unwrap_err();
        assert!(matches!(err, MonitorError::Resolution(_)));
    }

    #[test]
    fn connectivity_loss_escalates() {
        let mut server = MockServer::new();
        server.set_disconnected(true);
        let err = resolve(&mut server, None).unwrap_err();
        assert!(matches!(err, MonitorError::Connectivity(_)));
    }
}
