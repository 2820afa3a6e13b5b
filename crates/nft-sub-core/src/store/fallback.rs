// crates/nft-sub-core/src/store/fallback.rs
// ============================================================================
// Module: NFT-Sub Fallback Store
// Description: Degraded-mode wrapper shielding callers from backend failures.
// Purpose: Retry failed durable operations against an in-memory map.
// Dependencies: crate::core, crate::interfaces, crate::store::memory
// ============================================================================

//! ## Overview
//! [`FallbackMerchantStore`] wraps a durable [`MerchantStore`] plus a private
//! in-memory fallback. Every operation first targets the durable store; on
//! any [`StoreError`] the operation is transparently replayed against the
//! fallback map and the failure is recorded through the configured
//! [`crate::interfaces::StoreEventSink`]. Callers never observe durable
//! failures.
//! Invariants:
//! - Fallback is one-way per operation; no write-back occurs when the
//!   durable backend recovers.
//! - No retries are attempted against the durable backend; a single failure
//!   triggers fallback immediately.
//! - `readiness` reports the durable store truthfully so probes can observe
//!   degraded mode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::core::identifiers::MerchantId;
use crate::core::merchant::MerchantDraft;
use crate::core::merchant::MerchantRecord;
use crate::core::merchant::MerchantUpdate;
use crate::interfaces::MerchantStore;
use crate::interfaces::SharedStoreEventSink;
use crate::interfaces::StoreError;
use crate::interfaces::StoreOperation;
use crate::store::memory::InMemoryMerchantStore;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Degraded-mode store wrapper around a durable backend.
///
/// # Invariants
/// - Operations never return `Err`: durable failures are absorbed by the
///   in-memory fallback, which is itself infallible.
/// - Under durable outage, data written before the outage is invisible until
///   the backend recovers (accepted tradeoff).
pub struct FallbackMerchantStore {
    /// Durable backend targeted first by every operation.
    durable: Arc<dyn MerchantStore>,
    /// In-memory fallback serving operations under durable outage.
    fallback: InMemoryMerchantStore,
    /// Sink receiving one event per recovered failure.
    events: SharedStoreEventSink,
    /// Count of operations served by the fallback map.
    fallback_ops: AtomicU64,
}

impl FallbackMerchantStore {
    /// Wraps a durable store with an in-memory fallback.
    #[must_use]
    pub fn new(
        durable: Arc<dyn MerchantStore>,
        fallback: InMemoryMerchantStore,
        events: SharedStoreEventSink,
    ) -> Self {
        Self {
            durable,
            fallback,
            events,
            fallback_ops: AtomicU64::new(0),
        }
    }

    /// Returns how many operations have been served by the fallback map.
    #[must_use]
    pub fn fallback_count(&self) -> u64 {
        self.fallback_ops.load(Ordering::Relaxed)
    }

    /// Records a recovered failure and replays the operation on the fallback.
    fn recover<T>(
        &self,
        operation: StoreOperation,
        error: &StoreError,
        replay: impl FnOnce(&InMemoryMerchantStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.events.record_fallback(operation, error);
        self.fallback_ops.fetch_add(1, Ordering::Relaxed);
        replay(&self.fallback)
    }
}

impl MerchantStore for FallbackMerchantStore {
    fn create_merchant(&self, draft: MerchantDraft) -> Result<MerchantRecord, StoreError> {
        match self.durable.create_merchant(draft.clone()) {
            Ok(record) => Ok(record),
            Err(error) => self.recover(StoreOperation::Create, &error, |fallback| {
                fallback.create_merchant(draft)
            }),
        }
    }

    fn get_merchant(&self, id: &MerchantId) -> Result<Option<MerchantRecord>, StoreError> {
        match self.durable.get_merchant(id) {
            Ok(record) => Ok(record),
            Err(error) => self.recover(StoreOperation::Get, &error, |fallback| {
                fallback.get_merchant(id)
            }),
        }
    }

    fn get_all_merchants(&self) -> Result<Vec<MerchantRecord>, StoreError> {
        match self.durable.get_all_merchants() {
            Ok(records) => Ok(records),
            Err(error) => self.recover(StoreOperation::GetAll, &error, |fallback| {
                fallback.get_all_merchants()
            }),
        }
    }

    fn update_merchant(
        &self,
        id: &MerchantId,
        update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, StoreError> {
        match self.durable.update_merchant(id, update.clone()) {
            Ok(record) => Ok(record),
            Err(error) => self.recover(StoreOperation::Update, &error, |fallback| {
                fallback.update_merchant(id, update)
            }),
        }
    }

    fn delete_merchant(&self, id: &MerchantId) -> Result<bool, StoreError> {
        match self.durable.delete_merchant(id) {
            Ok(existed) => Ok(existed),
            Err(error) => self.recover(StoreOperation::Delete, &error, |fallback| {
                fallback.delete_merchant(id)
            }),
        }
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.durable.readiness()
    }
}
