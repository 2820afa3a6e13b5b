// crates/nft-sub-core/tests/proptest_logo.rs
// ============================================================================
// Module: Logo Estimation Property Tests
// Description: Property-based checks for base64 size estimation.
// Purpose: Validate the estimate against real encodings across payload sizes.
// ============================================================================

//! ## Overview
//! Property tests asserting that the decoded-size estimate is exact for any
//! valid padded base64 payload, and monotone in the validation cap.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use nft_sub_core::estimated_decoded_bytes;
use nft_sub_core::validate_logo_size;
use proptest::prelude::proptest;

proptest! {
    #[test]
    fn estimate_is_exact_for_encoded_payloads(bytes in proptest::collection::vec(0u8..=255, 0..2048)) {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(&bytes));
        assert_eq!(estimated_decoded_bytes(&uri), bytes.len());
    }

    #[test]
    fn validation_accepts_exactly_up_to_the_cap(bytes in proptest::collection::vec(0u8..=255, 0..2048)) {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(&bytes));
        assert!(validate_logo_size(&uri, bytes.len()).is_ok());
        if !bytes.is_empty() {
            assert!(validate_logo_size(&uri, bytes.len() - 1).is_err());
        }
    }
}
