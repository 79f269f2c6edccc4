//! Connection parameters for the monitored server.
//!
//! The password lives only inside [`ConnectionParams`]; it is never printed
//! by `Debug` and never copied into snapshot data.

use std::net::IpAddr;

use crate::error::MonitorError;

/// Default MySQL TCP port.
pub const DEFAULT_PORT: u16 = 3306;

const MAX_DATABASE_LEN: usize = 64;
const MAX_USER_LEN: usize = 32;

/// Validated connection parameters.
#[derive(Clone)]
pub struct ConnectionParams {
    host: String,
    port: u16,
    user: String,
    password: String,
    database: String,
}

impl ConnectionParams {
    /// Validates and builds connection parameters.
    ///
    /// Host must be an IP address or consist of `[A-Za-z0-9.-]`; the database
    /// name must match `[A-Za-z0-9_]+` and be at most 64 characters; the user
    /// must be non-empty and at most 32 characters.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self, MonitorError> {
        let host = host.into().trim().to_string();
        let user = user.into();
        let database = database.into();

        validate_host(&host)?;
        validate_database(&database)?;
        validate_user(&user)?;

        Ok(Self {
            host,
            port,
            user,
            password: password.into(),
            database,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

fn validate_host(host: &str) -> Result<(), MonitorError> {
    if host.is_empty() {
        return Err(MonitorError::InvalidCredentials(
            "host cannot be empty".to_string(),
        ));
    }
    let plain = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if host.parse::<IpAddr>().is_err() && !plain {
        return Err(MonitorError::InvalidCredentials(format!(
            "invalid host format: {}",
            host
        )));
    }
    Ok(())
}

fn validate_database(database: &str) -> Result<(), MonitorError> {
    if database.is_empty() {
        return Err(MonitorError::InvalidCredentials(
            "database name cannot be empty".to_string(),
        ));
    }
    if !database
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(MonitorError::InvalidCredentials(format!(
            "invalid database name format: {}",
            database
        )));
    }
    if database.len() > MAX_DATABASE_LEN {
        return Err(MonitorError::InvalidCredentials(format!(
            "database name too long: {}",
            database
        )));
    }
    Ok(())
}

fn validate_user(user: &str) -> Result<(), MonitorError> {
    if user.is_empty() {
        return Err(MonitorError::InvalidCredentials(
            "username cannot be empty".to_string(),
        ));
    }
    if user.len() > MAX_USER_LEN {
        return Err(MonitorError::InvalidCredentials(format!(
            "username too long: {}",
            user
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(host: &str, user: &str, db: &str) -> Result<ConnectionParams, MonitorError> {
        ConnectionParams::new(host, DEFAULT_PORT, user, "s3cret", db)
    }

    #[test]
    fn accepts_hostname_and_ip() {
        assert!(params("db.internal-1.example", "app", "shop").is_ok());
        assert!(params("10.0.0.7", "app", "shop").is_ok());
        assert!(params("::1", "app", "shop").is_ok());
    }

    #[test]
    fn trims_host() {
        let p = params("  localhost ", "app", "shop").unwrap();
        assert_eq!(p.host(), "localhost");
    }

    #[test]
    fn rejects_bad_host() {
        assert!(params("", "app", "shop").is_err());
        assert!(params("db;drop", "app", "shop").is_err());
    }

    #[test]
    fn rejects_bad_database_name() {
        assert!(params("localhost", "app", "").is_err());
        assert!(params("localhost", "app", "shop-prod").is_err());
        assert!(params("localhost", "app", &"d".repeat(65)).is_err());
        assert!(params("localhost", "app", &"d".repeat(64)).is_ok());
    }

    #[test]
    fn rejects_bad_user() {
        assert!(params("localhost", "", "shop").is_err());
        assert!(params("localhost", &"u".repeat(33), "shop").is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let p = params("localhost", "app", "shop").unwrap();
        let dbg = format!("{:?}", p);
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("<redacted>"));
        assert_eq!(p.password(), "s3cret");
    }
}
