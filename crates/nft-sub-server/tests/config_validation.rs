// crates/nft-sub-server/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Parsing and validation tests for the TOML configuration.
// Purpose: Validate backend tagging, defaults, and semantic checks.
// ============================================================================

//! ## Overview
//! Integration tests for configuration loading:
//! - Tagged backend selection (`durable` | `memory`) parses explicitly
//! - Optional sections fall back to documented defaults
//! - Semantic validation rejects unusable values
//! - File loading reports I/O and parse failures distinctly

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::io::Write;

use nft_sub_server::ConfigError;
use nft_sub_server::NftSubConfig;
use nft_sub_server::StoreBackendConfig;
use nft_sub_server::config::DEFAULT_BIND_ADDR;
use nft_sub_server::config::DEFAULT_SUBSCRIPTION_URL_BASE;
use nft_sub_server::load_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse(raw: &str) -> NftSubConfig {
    toml::from_str(raw).expect("config parses")
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn durable_backend_parses_with_defaults() {
    let config = parse(
        r#"
        [store]
        backend = "durable"
        path = "/var/lib/nft-sub/merchants.db"
        "#,
    );
    config.validate().expect("valid");
    assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(config.metadata.subscription_url_base, DEFAULT_SUBSCRIPTION_URL_BASE);
    let StoreBackendConfig::Durable(sqlite) = &config.store else {
        panic!("expected durable backend");
    };
    assert_eq!(sqlite.busy_timeout_ms, nft_sub_store_sqlite::DEFAULT_BUSY_TIMEOUT_MS);
}

#[test]
fn memory_backend_needs_no_connection_info() {
    let config = parse(
        r#"
        [store]
        backend = "memory"
        "#,
    );
    config.validate().expect("valid");
    assert!(matches!(config.store, StoreBackendConfig::Memory));
}

#[test]
fn missing_store_section_fails_to_parse() {
    let result: Result<NftSubConfig, toml::de::Error> = toml::from_str(
        r#"
        [server]
        bind_addr = "127.0.0.1:9000"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn unknown_backend_tag_fails_to_parse() {
    let result: Result<NftSubConfig, toml::de::Error> = toml::from_str(
        r#"
        [store]
        backend = "redis"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn durable_backend_without_path_fails_to_parse() {
    let result: Result<NftSubConfig, toml::de::Error> = toml::from_str(
        r#"
        [store]
        backend = "durable"
        "#,
    );
    assert!(result.is_err());
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn unparseable_bind_addr_is_rejected() {
    let config = parse(
        r#"
        [server]
        bind_addr = "not-an-address"

        [store]
        backend = "memory"
        "#,
    );
    let error = config.validate().expect_err("invalid bind addr");
    assert!(matches!(error, ConfigError::Invalid(_)));
}

#[test]
fn empty_durable_path_is_rejected() {
    let config = parse(
        r#"
        [store]
        backend = "durable"
        path = ""
        "#,
    );
    let error = config.validate().expect_err("empty path");
    assert!(matches!(error, ConfigError::Invalid(_)));
}

#[test]
fn empty_subscription_url_base_is_rejected() {
    let config = parse(
        r#"
        [store]
        backend = "memory"

        [metadata]
        subscription_url_base = "  "
        "#,
    );
    let error = config.validate().expect_err("empty base");
    assert!(matches!(error, ConfigError::Invalid(_)));
}

#[test]
fn subscription_url_base_trailing_slash_is_trimmed() {
    let config = parse(
        r#"
        [store]
        backend = "memory"

        [metadata]
        subscription_url_base = "https://example.com/subscription/"
        "#,
    );
    assert_eq!(config.subscription_url_base(), "https://example.com/subscription");
}

#[test]
fn custom_bind_addr_parses_to_socket_addr() {
    let config = parse(
        r#"
        [server]
        bind_addr = "0.0.0.0:9000"

        [store]
        backend = "memory"
        "#,
    );
    let addr = config.bind_socket_addr().expect("socket addr");
    assert_eq!(addr.port(), 9000);
}

// ============================================================================
// SECTION: File Loading
// ============================================================================

#[test]
fn load_config_round_trips_through_a_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(
        file,
        r#"
        [store]
        backend = "memory"
        "#
    )
    .expect("write config");

    let config = load_config(file.path()).expect("load");
    assert!(matches!(config.store, StoreBackendConfig::Memory));
}

#[test]
fn load_config_reports_missing_files_as_io_errors() {
    let error = load_config(std::path::Path::new("/nonexistent/nft-sub.toml"))
        .expect_err("missing file");
    assert!(matches!(error, ConfigError::Io(_)));
}

#[test]
fn load_config_reports_invalid_toml_as_parse_errors() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "not [valid toml").expect("write config");
    let error = load_config(file.path()).expect_err("invalid toml");
    assert!(matches!(error, ConfigError::Parse(_)));
}
