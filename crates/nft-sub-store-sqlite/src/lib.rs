// crates/nft-sub-store-sqlite/src/lib.rs
// ============================================================================
// Module: NFT-Sub SQLite Store Library
// Description: Durable MerchantStore backed by SQLite WAL.
// Purpose: Persist merchant metadata in a KV-shaped schema across restarts.
// Dependencies: nft-sub-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate provides the durable backend for the merchant metadata store:
//! a `SQLite` database holding one KV entry per merchant plus a set-type
//! membership table used for enumeration without key scans. Unknown schema
//! versions and corrupted rows fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::SqliteJournalMode;
pub use store::SqliteMerchantStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
