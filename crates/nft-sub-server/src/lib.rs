// crates/nft-sub-server/src/lib.rs
// ============================================================================
// Module: NFT-Sub Server Library
// Description: HTTP surface for merchant registration and NFT metadata.
// Purpose: Wire the merchant store to axum handlers with CORS and auditing.
// Dependencies: axum, nft-sub-core, nft-sub-store-sqlite, serde, tokio, toml
// ============================================================================

//! ## Overview
//! NFT-Sub Server exposes the merchant metadata store over HTTP: a
//! registration endpoint (create/read), an NFT metadata endpoint that
//! synthesizes token metadata JSON on the fly, and health/readiness probes.
//! Handlers are stateless between requests; every request reconstructs what
//! it needs from the injected [`nft_sub_core::SharedMerchantStore`].
//! Invariants:
//! - Client input errors surface as 4xx with descriptive JSON.
//! - Storage failures are absorbed by the fallback store and never surface
//!   as HTTP failures; only malformed requests produce generic 500s.
//! - Every API response carries the permissive CORS headers of its endpoint.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod chains;
pub mod config;
pub mod cors;
pub mod metadata;
pub mod registration;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditSink;
pub use audit::ApiEndpoint;
pub use audit::ApiOutcome;
pub use audit::NoopApiAuditSink;
pub use audit::SharedApiAuditSink;
pub use audit::StoreFallbackAudit;
pub use audit::WriterAuditSink;
pub use chains::chain_display_name;
pub use config::ConfigError;
pub use config::HttpConfig;
pub use config::MetadataConfig;
pub use config::NftSubConfig;
pub use config::StoreBackendConfig;
pub use config::load_config;
pub use cors::CorsPolicy;
pub use cors::METADATA_CORS;
pub use cors::REGISTRATION_CORS;
pub use metadata::MetadataAttribute;
pub use metadata::TokenMetadata;
pub use metadata::build_token_metadata;
pub use registration::RegisterRequest;
pub use registration::RegisterResponse;
pub use registration::RegistrationError;
pub use registration::validate_registration;
pub use server::ServeError;
pub use server::ServerState;
pub use server::build_router;
pub use server::build_store;
pub use server::serve;
