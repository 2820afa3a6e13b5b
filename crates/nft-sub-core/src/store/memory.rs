// crates/nft-sub-core/src/store/memory.rs
// ============================================================================
// Module: NFT-Sub In-Memory Store
// Description: Map-backed MerchantStore for development and degraded mode.
// Purpose: Serve reads/writes without external dependencies, never failing.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryMerchantStore`] keeps merchant records in a mutex-guarded map.
//! It is the development backend and the degraded-mode target behind
//! [`crate::store::fallback::FallbackMerchantStore`]. Poisoned locks are
//! recovered rather than propagated, so every operation returns `Ok`.
//! Invariants:
//! - Listing order is deterministic (sorted by merchant id).
//! - Contents do not survive process restarts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::core::identifiers::MerchantId;
use crate::core::merchant::MerchantDraft;
use crate::core::merchant::MerchantRecord;
use crate::core::merchant::MerchantUpdate;
use crate::core::time::SharedClock;
use crate::interfaces::MerchantStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Store
// ============================================================================

/// In-memory merchant store backed by a mutex-guarded map.
///
/// # Invariants
/// - Operations never return `Err`; poisoned locks are recovered.
/// - Timestamps come from the injected clock only.
pub struct InMemoryMerchantStore {
    /// Timestamp source for record stamps.
    clock: SharedClock,
    /// Records keyed by raw merchant id.
    entries: Mutex<BTreeMap<String, MerchantRecord>>,
}

impl InMemoryMerchantStore {
    /// Creates an empty in-memory store with the provided clock.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Returns true when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Returns the entries guard, recovering from poisoned locks.
    fn guard(&self) -> MutexGuard<'_, BTreeMap<String, MerchantRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MerchantStore for InMemoryMerchantStore {
    fn create_merchant(&self, draft: MerchantDraft) -> Result<MerchantRecord, StoreError> {
        let now = self.clock.now_utc();
        let mut entries = self.guard();
        let created_at =
            entries.get(draft.merchant_id.as_str()).map_or(now, |existing| existing.created_at);
        let record = draft.into_record(created_at, now);
        entries.insert(record.merchant_id.as_str().to_string(), record.clone());
        Ok(record)
    }

    fn get_merchant(&self, id: &MerchantId) -> Result<Option<MerchantRecord>, StoreError> {
        Ok(self.guard().get(id.as_str()).cloned())
    }

    fn get_all_merchants(&self) -> Result<Vec<MerchantRecord>, StoreError> {
        Ok(self.guard().values().cloned().collect())
    }

    fn update_merchant(
        &self,
        id: &MerchantId,
        update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, StoreError> {
        let now = self.clock.now_utc();
        let mut entries = self.guard();
        let Some(existing) = entries.get(id.as_str()) else {
            return Ok(None);
        };
        let merged = update.merged_into(existing, now);
        entries.insert(id.as_str().to_string(), merged.clone());
        Ok(Some(merged))
    }

    fn delete_merchant(&self, id: &MerchantId) -> Result<bool, StoreError> {
        Ok(self.guard().remove(id.as_str()).is_some())
    }
}
