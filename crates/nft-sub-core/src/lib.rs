// crates/nft-sub-core/src/lib.rs
// ============================================================================
// Module: NFT-Sub Core Library
// Description: Domain model, storage interfaces, and reference stores.
// Purpose: Define merchant metadata types and the backend-agnostic store seam.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! NFT-Sub Core defines the merchant metadata domain model, the
//! [`MerchantStore`] interface shared by every backend, and two reference
//! store implementations: an infallible in-memory map and a degraded-mode
//! fallback wrapper around a durable backend.
//! Invariants:
//! - `merchant_id` is immutable once a record exists.
//! - Timestamps are supplied through the [`Clock`] seam; the core never reads
//!   wall-clock time directly.
//! - Logo payloads are validated against a configurable byte cap before any
//!   store write.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::identifiers::ChainId;
pub use crate::core::identifiers::MerchantId;
pub use crate::core::logo::LOGO_PLACEHOLDER;
pub use crate::core::logo::LogoError;
pub use crate::core::logo::MAX_LOGO_BYTES;
pub use crate::core::logo::estimated_decoded_bytes;
pub use crate::core::logo::is_embedded_image;
pub use crate::core::logo::normalize_logo;
pub use crate::core::logo::validate_logo_size;
pub use crate::core::merchant::MerchantDraft;
pub use crate::core::merchant::MerchantRecord;
pub use crate::core::merchant::MerchantUpdate;
pub use crate::core::time::Clock;
pub use crate::core::time::FixedClock;
pub use crate::core::time::SharedClock;
pub use crate::core::time::SystemClock;
pub use crate::interfaces::MerchantStore;
pub use crate::interfaces::NoopStoreEventSink;
pub use crate::interfaces::SharedMerchantStore;
pub use crate::interfaces::SharedStoreEventSink;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::StoreEventSink;
pub use crate::interfaces::StoreOperation;
pub use crate::store::fallback::FallbackMerchantStore;
pub use crate::store::memory::InMemoryMerchantStore;
