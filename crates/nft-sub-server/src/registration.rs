// crates/nft-sub-server/src/registration.rs
// ============================================================================
// Module: Registration Payloads
// Description: Wire types and input validation for merchant registration.
// Purpose: Turn untrusted request bodies into validated store drafts.
// Dependencies: nft-sub-core, serde, thiserror
// ============================================================================

//! ## Overview
//! Registration accepts camelCase JSON bodies. `merchantId` arrives as a
//! string or a number (on-chain ids); numbers normalize to their decimal
//! string form. Validation rejects missing required fields and oversized
//! logos before any store write; logos outside embedded-image form are
//! silently dropped rather than rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use nft_sub_core::LogoError;
use nft_sub_core::MerchantDraft;
use nft_sub_core::MerchantId;
use nft_sub_core::MerchantRecord;
use nft_sub_core::normalize_logo;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Success message echoed after a registration write.
pub const SAVED_MESSAGE: &str = "Merchant metadata saved successfully";

/// Generic message for unexpected registration failures.
pub const SAVE_FAILED_ERROR: &str = "Failed to save merchant metadata";

/// Generic message for unexpected lookup failures.
pub const FETCH_FAILED_ERROR: &str = "Failed to fetch merchants";

/// Error label for direct lookups of unknown merchants.
pub const NOT_FOUND_ERROR: &str = "Merchant not found";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration input validation errors.
///
/// # Invariants
/// - Messages are client-facing and stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A required field is missing or blank.
    #[error("merchantId and name are required")]
    MissingFields,
    /// The submitted logo exceeds the size cap.
    #[error("Logo too large. Max size is {max_kib}KB")]
    LogoTooLarge {
        /// Size cap in KiB.
        max_kib: usize,
    },
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Merchant id as submitted on the wire.
///
/// # Invariants
/// - Numbers normalize to their decimal string form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MerchantIdValue {
    /// String-form identifier.
    Text(String),
    /// Numeric identifier from on-chain callers.
    Number(u64),
}

impl MerchantIdValue {
    /// Normalizes to a merchant id, rejecting blank strings.
    #[must_use]
    pub fn into_non_blank_id(self) -> Option<MerchantId> {
        match self {
            Self::Text(value) => {
                if value.trim().is_empty() {
                    None
                } else {
                    Some(MerchantId::new(value))
                }
            }
            Self::Number(value) => Some(MerchantId::new(value.to_string())),
        }
    }
}

/// Registration request body.
///
/// # Invariants
/// - All fields are optional on the wire; validation enforces requirements.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Merchant identifier (required).
    #[serde(default)]
    pub merchant_id: Option<MerchantIdValue>,
    /// Display name (required).
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Logo data URI.
    #[serde(default)]
    pub logo: Option<String>,
}

/// Registration success response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Echo of the submitted merchant id (normalized).
    pub merchant_id: String,
    /// Human-readable confirmation.
    pub message: String,
    /// The persisted record.
    pub merchant: MerchantRecord,
}

/// Error response body shared by both endpoints.
///
/// # Invariants
/// - `message` is present only when a remediation hint exists.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Error label.
    pub error: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Builds an error body without a remediation hint.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    /// Builds an error body with a remediation hint.
    #[must_use]
    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Registration read query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationQuery {
    /// Merchant id for single-record lookup; absent lists all records.
    #[serde(default)]
    pub merchant_id: Option<String>,
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a registration request into a store draft.
///
/// # Errors
///
/// Returns [`RegistrationError`] when required fields are missing or the
/// logo exceeds `max_logo_bytes`.
pub fn validate_registration(
    request: RegisterRequest,
    max_logo_bytes: usize,
) -> Result<MerchantDraft, RegistrationError> {
    let merchant_id = request.merchant_id.and_then(MerchantIdValue::into_non_blank_id);
    let name = request.name.filter(|value| !value.trim().is_empty());
    let (Some(merchant_id), Some(name)) = (merchant_id, name) else {
        return Err(RegistrationError::MissingFields);
    };
    let logo = normalize_logo(request.logo.as_deref(), max_logo_bytes).map_err(
        |LogoError::TooLarge {
             max_bytes, ..
         }| RegistrationError::LogoTooLarge {
            max_kib: max_bytes / 1024,
        },
    )?;
    Ok(MerchantDraft {
        merchant_id,
        name,
        description: request.description.unwrap_or_default(),
        logo,
    })
}
