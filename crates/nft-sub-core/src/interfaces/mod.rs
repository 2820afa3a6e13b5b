// crates/nft-sub-core/src/interfaces/mod.rs
// ============================================================================
// Module: NFT-Sub Interfaces
// Description: Backend-agnostic interfaces for merchant metadata storage.
// Purpose: Define the contract surfaces used by stores and HTTP handlers.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how NFT-Sub integrates with storage backends without
//! embedding backend-specific details. Absence is modeled with `Option`, not
//! errors: a missing merchant id is a valid lookup outcome. Backend failures
//! surface as [`StoreError`] and are absorbed by the degraded-mode fallback
//! wrapper before they reach HTTP callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::identifiers::MerchantId;
use crate::core::merchant::MerchantDraft;
use crate::core::merchant::MerchantRecord;
use crate::core::merchant::MerchantUpdate;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Merchant store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Missing records are never reported through this type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("merchant store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("merchant store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("merchant store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("merchant store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("merchant store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Merchant Store
// ============================================================================

/// Merchant metadata store for persistence.
pub trait MerchantStore: Send + Sync {
    /// Creates or overwrites a merchant record (upsert semantics).
    ///
    /// Preserves `created_at` when a record already exists for the id and
    /// refreshes `updated_at` on every call.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn create_merchant(&self, draft: MerchantDraft) -> Result<MerchantRecord, StoreError>;

    /// Loads a merchant record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails; missing ids are `Ok(None)`.
    fn get_merchant(&self, id: &MerchantId) -> Result<Option<MerchantRecord>, StoreError>;

    /// Lists all merchant records.
    ///
    /// Records that fail to resolve are silently dropped from the result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the enumeration itself fails.
    fn get_all_merchants(&self) -> Result<Vec<MerchantRecord>, StoreError>;

    /// Merges partial fields into an existing record.
    ///
    /// Preserves `merchant_id` and `created_at`, refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails; missing ids are `Ok(None)`.
    fn update_merchant(
        &self,
        id: &MerchantId,
        update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, StoreError>;

    /// Removes a record and its enumeration-set membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails; the boolean reports
    /// whether a record existed.
    fn delete_merchant(&self, id: &MerchantId) -> Result<bool, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Shared handle to a merchant store implementation.
///
/// # Invariants
/// - Cloning shares the underlying store; no state is duplicated.
#[derive(Clone)]
pub struct SharedMerchantStore(Arc<dyn MerchantStore>);

impl SharedMerchantStore {
    /// Wraps a concrete store in a shared handle.
    pub fn from_store<S: MerchantStore + 'static>(store: S) -> Self {
        Self(Arc::new(store))
    }

    /// Wraps an already-shared store.
    #[must_use]
    pub const fn from_arc(store: Arc<dyn MerchantStore>) -> Self {
        Self(store)
    }
}

impl fmt::Debug for SharedMerchantStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedMerchantStore")
    }
}

impl MerchantStore for SharedMerchantStore {
    fn create_merchant(&self, draft: MerchantDraft) -> Result<MerchantRecord, StoreError> {
        self.0.create_merchant(draft)
    }

    fn get_merchant(&self, id: &MerchantId) -> Result<Option<MerchantRecord>, StoreError> {
        self.0.get_merchant(id)
    }

    fn get_all_merchants(&self) -> Result<Vec<MerchantRecord>, StoreError> {
        self.0.get_all_merchants()
    }

    fn update_merchant(
        &self,
        id: &MerchantId,
        update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, StoreError> {
        self.0.update_merchant(id, update)
    }

    fn delete_merchant(&self, id: &MerchantId) -> Result<bool, StoreError> {
        self.0.delete_merchant(id)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.0.readiness()
    }
}

// ============================================================================
// SECTION: Store Event Sink
// ============================================================================

/// Store operation classification for degraded-mode events.
///
/// # Invariants
/// - Variants are stable for observability labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    /// Backend open/initialization at process start.
    Open,
    /// Create/overwrite of a merchant record.
    Create,
    /// Single-record lookup.
    Get,
    /// Full enumeration.
    GetAll,
    /// Partial-field update.
    Update,
    /// Record removal.
    Delete,
}

impl StoreOperation {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Create => "create",
            Self::Get => "get",
            Self::GetAll => "get_all",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Observability sink for store-level degradation events.
pub trait StoreEventSink: Send + Sync {
    /// Records a durable-backend failure that was recovered by fallback.
    fn record_fallback(&self, operation: StoreOperation, error: &StoreError);
}

/// Shared handle to a store event sink.
pub type SharedStoreEventSink = Arc<dyn StoreEventSink>;

/// No-op event sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStoreEventSink;

impl StoreEventSink for NoopStoreEventSink {
    fn record_fallback(&self, _operation: StoreOperation, _error: &StoreError) {}
}
