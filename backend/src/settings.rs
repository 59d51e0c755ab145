//! Service configuration loaded via OrthoConfig.
//!
//! Values come from command-line flags, `REVIEWER_*` environment variables
//! and configuration files, in decreasing order of precedence. Unset values
//! fall back to the defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::transaction::DEFAULT_TRANSACTION_TIMEOUT;
use crate::outbound::persistence::{DEFAULT_MAX_SIZE, DEFAULT_MIN_IDLE, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration values for the reviewer service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REVIEWER")]
pub struct ReviewerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept warm in the pool.
    pub pool_min_idle: Option<u32>,
    /// Deadline, in milliseconds, for each lifecycle transaction.
    pub transaction_timeout_ms: Option<u64>,
    /// Apply embedded migrations before serving; enabled when unset.
    pub run_migrations: Option<bool>,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value}: {message}")]
    InvalidBindAddr { value: String, message: String },
    /// `transaction_timeout_ms` is zero.
    #[error("transaction timeout must be greater than zero")]
    ZeroTimeout,
}

impl ReviewerSettings {
    /// Parsed bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the configured value is
    /// not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    /// Per-transaction deadline, falling back to five seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] when configured as zero.
    pub fn transaction_timeout(&self) -> Result<Duration, SettingsError> {
        match self.transaction_timeout_ms {
            None => Ok(DEFAULT_TRANSACTION_TIMEOUT),
            Some(0) => Err(SettingsError::ZeroTimeout),
            Some(ms) => Ok(Duration::from_millis(ms)),
        }
    }

    /// Whether embedded migrations run at startup, defaulting to `true`.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Pool configuration when a database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            PoolConfig::new(url.clone())
                .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_MAX_SIZE))
                .with_min_idle(Some(self.pool_min_idle.unwrap_or(DEFAULT_MIN_IDLE)))
        })
    }
}
