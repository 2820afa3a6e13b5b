// crates/nft-sub-core/src/core/logo.rs
// ============================================================================
// Module: NFT-Sub Logo Validation
// Description: Size validation for data-URI-encoded merchant logos.
// Purpose: Enforce the logo byte cap before any store write.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Merchant logos arrive as embedded-image data URIs. This module estimates
//! the decoded byte size from the base64 payload length without decoding and
//! rejects payloads over the configured cap. The same validation function
//! serves both the upload path and the HTTP registration endpoint.
//! Invariants:
//! - Size is estimated as `floor(encoded_len * 3 / 4)` minus padding.
//! - Values not in embedded-image form are dropped, never rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum estimated decoded logo size in bytes (500 KiB).
pub const MAX_LOGO_BYTES: usize = 500 * 1024;

/// Placeholder substituted for non-null logos in bulk listings.
pub const LOGO_PLACEHOLDER: &str = "base64...";

/// Prefix identifying an embedded-image data URI.
const DATA_URI_IMAGE_PREFIX: &str = "data:image";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logo validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogoError {
    /// Estimated decoded size exceeds the configured cap.
    #[error("logo too large: estimated {estimated_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed decoded bytes.
        max_bytes: usize,
        /// Estimated decoded bytes of the submitted payload.
        estimated_bytes: usize,
    },
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Returns true when the value is an embedded-image data URI.
#[must_use]
pub fn is_embedded_image(value: &str) -> bool {
    value.starts_with(DATA_URI_IMAGE_PREFIX)
}

/// Estimates the decoded byte size of a data URI's base64 payload.
///
/// The payload is everything after the first `,`; when no separator is
/// present the whole value is treated as payload. Padding characters are
/// subtracted from the `floor(len * 3 / 4)` estimate.
#[must_use]
pub fn estimated_decoded_bytes(value: &str) -> usize {
    let payload = value.split_once(',').map_or(value, |(_, rest)| rest);
    let padding = payload.bytes().rev().take_while(|byte| *byte == b'=').count();
    (payload.len().saturating_mul(3) / 4).saturating_sub(padding)
}

/// Validates a data URI's estimated decoded size against a byte cap.
///
/// # Errors
///
/// Returns [`LogoError::TooLarge`] when the estimate exceeds `max_bytes`.
pub fn validate_logo_size(value: &str, max_bytes: usize) -> Result<(), LogoError> {
    let estimated_bytes = estimated_decoded_bytes(value);
    if estimated_bytes > max_bytes {
        return Err(LogoError::TooLarge {
            max_bytes,
            estimated_bytes,
        });
    }
    Ok(())
}

/// Normalizes a submitted logo value for storage.
///
/// Absent values and values not in embedded-image form normalize to `None`;
/// embedded images are size-checked and stored verbatim.
///
/// # Errors
///
/// Returns [`LogoError::TooLarge`] when an embedded image exceeds `max_bytes`.
pub fn normalize_logo(logo: Option<&str>, max_bytes: usize) -> Result<Option<String>, LogoError> {
    match logo {
        None => Ok(None),
        Some(value) if !is_embedded_image(value) => Ok(None),
        Some(value) => {
            validate_logo_size(value, max_bytes)?;
            Ok(Some(value.to_string()))
        }
    }
}
