// crates/nft-sub-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: TOML-backed configuration for bind address, store, metadata.
// Purpose: Select the store backend explicitly at process start.
// Dependencies: nft-sub-store-sqlite, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded once from a TOML file into validated structs. The
//! store backend is an explicit tagged choice (`durable` with `SQLite`
//! connection info, or `memory`); it is never inferred from the environment
//! and never re-evaluated per request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;

use nft_sub_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Default base URL for subscription `external_url` values.
pub const DEFAULT_SUBSCRIPTION_URL_BASE: &str = "https://nft-sub.vercel.app/subscription";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config values failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level service configuration.
///
/// # Invariants
/// - `store` is always present; backend selection is explicit.
#[derive(Debug, Clone, Deserialize)]
pub struct NftSubConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,
    /// Store backend selection.
    pub store: StoreBackendConfig,
    /// NFT metadata synthesis settings.
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// HTTP listener settings.
///
/// # Invariants
/// - `bind_addr` must parse as a socket address.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Bind address in `host:port` form.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// NFT metadata synthesis settings.
///
/// # Invariants
/// - `subscription_url_base` is non-empty; a trailing slash is trimmed when
///   URLs are built.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataConfig {
    /// Base URL prefixed to `/{token_id}` in `external_url` values.
    #[serde(default = "default_subscription_url_base")]
    pub subscription_url_base: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            subscription_url_base: default_subscription_url_base(),
        }
    }
}

/// Store backend selection.
///
/// # Invariants
/// - Selected once at process start; never re-evaluated per call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// Durable `SQLite`-backed KV store with in-memory degraded mode.
    Durable(SqliteStoreConfig),
    /// In-memory map only (development).
    Memory,
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default bind address.
fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

/// Returns the default subscription URL base.
fn default_subscription_url_base() -> String {
    DEFAULT_SUBSCRIPTION_URL_BASE.to_string()
}

// ============================================================================
// SECTION: Loading + Validation
// ============================================================================

/// Loads and validates configuration from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, parsed, or
/// validated.
pub fn load_config(path: &Path) -> Result<NftSubConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    let config: NftSubConfig =
        toml::from_str(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
    config.validate()?;
    Ok(config)
}

impl NftSubConfig {
    /// Validates semantic constraints beyond what parsing enforces.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_socket_addr()?;
        if self.metadata.subscription_url_base.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "metadata.subscription_url_base must not be empty".to_string(),
            ));
        }
        if let StoreBackendConfig::Durable(sqlite) = &self.store
            && sqlite.path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parses the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_addr.parse().map_err(|_| {
            ConfigError::Invalid(format!("unparseable bind_addr: {}", self.server.bind_addr))
        })
    }

    /// Returns the subscription URL base without a trailing slash.
    #[must_use]
    pub fn subscription_url_base(&self) -> &str {
        self.metadata.subscription_url_base.trim_end_matches('/')
    }
}
