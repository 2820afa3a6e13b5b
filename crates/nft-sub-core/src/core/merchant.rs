// crates/nft-sub-core/src/core/merchant.rs
// ============================================================================
// Module: NFT-Sub Merchant Records
// Description: Persisted merchant metadata record and write payloads.
// Purpose: Model the single persisted entity with store-managed timestamps.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! [`MerchantRecord`] is the only persisted entity in the system: off-chain
//! display metadata for an on-chain merchant. Wire serialization uses
//! camelCase field names and RFC 3339 timestamps. Callers submit
//! [`MerchantDraft`] values; timestamps are always stamped by the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::MerchantId;

// ============================================================================
// SECTION: Record
// ============================================================================

/// Persisted merchant display metadata.
///
/// # Invariants
/// - `merchant_id` is immutable once the record exists.
/// - `created_at` is preserved across overwrites; `updated_at` is refreshed
///   on every write.
/// - `logo`, when present, is an embedded-image data URI within the
///   configured byte cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantRecord {
    /// Stable merchant identifier supplied by the caller.
    pub merchant_id: MerchantId,
    /// Non-empty display name.
    pub name: String,
    /// Free-text description; empty string when not provided.
    pub description: String,
    /// Optional data-URI-encoded logo image.
    pub logo: Option<String>,
    /// Creation timestamp stamped by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last-write timestamp stamped by the store.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// ============================================================================
// SECTION: Write Payloads
// ============================================================================

/// Caller-supplied fields for a create/overwrite operation.
///
/// # Invariants
/// - `name` is validated as non-empty before reaching a store.
/// - `logo` is already normalized and size-checked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantDraft {
    /// Stable merchant identifier supplied by the caller.
    pub merchant_id: MerchantId,
    /// Non-empty display name.
    pub name: String,
    /// Free-text description; empty string when not provided.
    pub description: String,
    /// Optional data-URI-encoded logo image.
    pub logo: Option<String>,
}

impl MerchantDraft {
    /// Materializes the draft into a record with store-stamped timestamps.
    #[must_use]
    pub fn into_record(
        self,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> MerchantRecord {
        MerchantRecord {
            merchant_id: self.merchant_id,
            name: self.name,
            description: self.description,
            logo: self.logo,
            created_at,
            updated_at,
        }
    }
}

/// Partial-field update applied to an existing record.
///
/// # Invariants
/// - `None` leaves the existing field untouched.
/// - `logo: Some(None)` clears the stored logo; `logo: None` preserves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantUpdate {
    /// Replacement display name when present.
    pub name: Option<String>,
    /// Replacement description when present.
    pub description: Option<String>,
    /// Replacement logo when present (outer `Some` with inner `None` clears).
    pub logo: Option<Option<String>>,
}

impl MerchantUpdate {
    /// Merges the update into an existing record.
    ///
    /// Preserves `merchant_id` and `created_at`, refreshes `updated_at`.
    #[must_use]
    pub fn merged_into(self, existing: &MerchantRecord, updated_at: OffsetDateTime) -> MerchantRecord {
        MerchantRecord {
            merchant_id: existing.merchant_id.clone(),
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            description: self.description.unwrap_or_else(|| existing.description.clone()),
            logo: self.logo.unwrap_or_else(|| existing.logo.clone()),
            created_at: existing.created_at,
            updated_at,
        }
    }
}
