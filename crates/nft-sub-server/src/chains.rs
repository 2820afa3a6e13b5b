// crates/nft-sub-server/src/chains.rs
// ============================================================================
// Module: Chain Name Table
// Description: Static chain-id to human-readable name mapping.
// Purpose: Resolve the Chain attribute in synthesized token metadata.
// Dependencies: nft-sub-core
// ============================================================================

//! ## Overview
//! Metadata consumers route requests with a decimal chain id. Known ids map
//! to display names; unknown ids fall back to the literal `Chain {id}` form
//! rather than failing the lookup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use nft_sub_core::ChainId;

// ============================================================================
// SECTION: Table
// ============================================================================

/// Known chain ids and their display names.
const CHAIN_NAMES: &[(&str, &str)] = &[
    ("1", "Ethereum"),
    ("10", "Optimism"),
    ("56", "BSC"),
    ("137", "Polygon"),
    ("8453", "Base"),
    ("42161", "Arbitrum"),
    ("43114", "Avalanche"),
    ("11155111", "Sepolia"),
];

/// Resolves a chain id to its display name.
///
/// Unknown ids resolve to `Chain {id}`.
#[must_use]
pub fn chain_display_name(chain_id: &ChainId) -> String {
    CHAIN_NAMES
        .iter()
        .find(|(id, _)| *id == chain_id.as_str())
        .map_or_else(|| format!("Chain {chain_id}"), |(_, name)| (*name).to_string())
}
