// crates/nft-sub-server/src/metadata.rs
// ============================================================================
// Module: Token Metadata Synthesis
// Description: ERC-1155-style metadata JSON built from merchant records.
// Purpose: Shape stored merchant data into what wallets and marketplaces
//          expect when resolving a token's metadata URI.
// Dependencies: nft-sub-core, serde
// ============================================================================

//! ## Overview
//! Every metadata request is a pure read-and-transform: the merchant record
//! keyed by the token id is reshaped into a metadata document with a fixed,
//! ordered attribute list. Nothing is persisted and no cross-call state
//! exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use nft_sub_core::ChainId;
use nft_sub_core::MerchantId;
use nft_sub_core::MerchantRecord;
use serde::Serialize;

use crate::chains::chain_display_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Suffix appended to merchant names in metadata titles.
const NAME_SUFFIX: &str = " - Subscription";

/// Error label for unregistered merchants.
pub const NOT_REGISTERED_ERROR: &str = "Merchant not registered";

/// Error label for unexpected metadata failures.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Detail message for unexpected metadata failures.
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate NFT metadata";

// ============================================================================
// SECTION: Document Types
// ============================================================================

/// Single trait/value pair in the metadata attribute list.
///
/// # Invariants
/// - Serializes with the conventional `trait_type` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataAttribute {
    /// Trait label.
    pub trait_type: String,
    /// Trait value.
    pub value: String,
}

/// Synthesized token metadata document.
///
/// # Invariants
/// - `attributes` keeps its fixed order: Merchant, Token ID, Chain, Status,
///   Type.
/// - `image` serializes as `null` when no logo is stored.
#[derive(Debug, Clone, Serialize)]
pub struct TokenMetadata {
    /// Display name: merchant name plus subscription suffix.
    pub name: String,
    /// Stored description, or a generated default referencing the merchant.
    pub description: String,
    /// Logo data URI when present.
    pub image: Option<String>,
    /// Subscription page URL for the token.
    pub external_url: String,
    /// Fixed ordered trait list.
    pub attributes: Vec<MetadataAttribute>,
}

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Builds one attribute pair.
fn attribute(trait_type: &str, value: impl Into<String>) -> MetadataAttribute {
    MetadataAttribute {
        trait_type: trait_type.to_string(),
        value: value.into(),
    }
}

/// Synthesizes the metadata document for a registered merchant.
#[must_use]
pub fn build_token_metadata(
    record: &MerchantRecord,
    chain_id: &ChainId,
    token_id: &MerchantId,
    subscription_url_base: &str,
) -> TokenMetadata {
    let description = if record.description.is_empty() {
        format!("Active subscription to {}", record.name)
    } else {
        record.description.clone()
    };
    TokenMetadata {
        name: format!("{}{NAME_SUFFIX}", record.name),
        description,
        image: record.logo.clone(),
        external_url: format!("{subscription_url_base}/{token_id}"),
        attributes: vec![
            attribute("Merchant", record.name.clone()),
            attribute("Token ID", token_id.as_str()),
            attribute("Chain", chain_display_name(chain_id)),
            attribute("Status", "Active"),
            attribute("Type", "Premium Subscription"),
        ],
    }
}

/// Builds the remediation hint returned for unregistered merchants.
#[must_use]
pub fn remediation_message(token_id: &MerchantId) -> String {
    format!(
        "Merchant {token_id} has not completed metadata registration. Please visit \
         /merchant/setup/{token_id} to add your business information."
    )
}
