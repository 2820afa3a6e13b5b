// crates/nft-sub-server/src/server/tests.rs
// ============================================================================
// Module: Server Unit Tests
// Description: Handler-level tests for registration, metadata, and probes.
// Purpose: Validate response shaping, CORS headers, and the error policy
//          with in-memory fixtures.
// ============================================================================

//! ## Overview
//! Exercises the HTTP surface with in-memory fixtures:
//! - Registration submit/read round-trips and input-error responses
//! - Logo size rejection before any store write
//! - Bulk-listing logo redaction versus direct lookup
//! - Metadata synthesis (names, default descriptions, chain table, order)
//! - Degraded-mode behavior: storage failures never produce 500s

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::body::Body;
use axum::body::to_bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;
use axum::http::header::ACCESS_CONTROL_ALLOW_METHODS;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use nft_sub_core::FallbackMerchantStore;
use nft_sub_core::FixedClock;
use nft_sub_core::InMemoryMerchantStore;
use nft_sub_core::MAX_LOGO_BYTES;
use nft_sub_core::MerchantDraft;
use nft_sub_core::MerchantId;
use nft_sub_core::MerchantRecord;
use nft_sub_core::MerchantStore;
use nft_sub_core::MerchantUpdate;
use nft_sub_core::NoopStoreEventSink;
use nft_sub_core::SharedClock;
use nft_sub_core::SharedMerchantStore;
use nft_sub_core::StoreError;
use serde_json::Value;
use serde_json::json;
use tower::util::ServiceExt;

use super::ServerState;
use super::build_router;
use super::handle_metadata;
use super::handle_metadata_preflight;
use super::handle_register_preflight;
use super::handle_register_query;
use super::handle_register_submit;
use super::handle_ready;
use crate::audit::NoopApiAuditSink;
use crate::config::DEFAULT_SUBSCRIPTION_URL_BASE;
use crate::registration::RegisterRequest;
use crate::registration::RegistrationQuery;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Durable store stand-in that fails every operation.
struct FailingStore;

impl MerchantStore for FailingStore {
    fn create_merchant(&self, _draft: MerchantDraft) -> Result<MerchantRecord, StoreError> {
        Err(StoreError::Store("backend offline".to_string()))
    }

    fn get_merchant(&self, _id: &MerchantId) -> Result<Option<MerchantRecord>, StoreError> {
        Err(StoreError::Store("backend offline".to_string()))
    }

    fn get_all_merchants(&self) -> Result<Vec<MerchantRecord>, StoreError> {
        Err(StoreError::Store("backend offline".to_string()))
    }

    fn update_merchant(
        &self,
        _id: &MerchantId,
        _update: MerchantUpdate,
    ) -> Result<Option<MerchantRecord>, StoreError> {
        Err(StoreError::Store("backend offline".to_string()))
    }

    fn delete_merchant(&self, _id: &MerchantId) -> Result<bool, StoreError> {
        Err(StoreError::Store("backend offline".to_string()))
    }

    fn readiness(&self) -> Result<(), StoreError> {
        Err(StoreError::Store("backend offline".to_string()))
    }
}

fn clock() -> SharedClock {
    Arc::new(FixedClock::at_epoch())
}

fn memory_state() -> Arc<ServerState> {
    let store = SharedMerchantStore::from_store(InMemoryMerchantStore::new(clock()));
    Arc::new(ServerState::new(store, Arc::new(NoopApiAuditSink), DEFAULT_SUBSCRIPTION_URL_BASE))
}

fn degraded_state() -> Arc<ServerState> {
    let store = SharedMerchantStore::from_store(FallbackMerchantStore::new(
        Arc::new(FailingStore),
        InMemoryMerchantStore::new(clock()),
        Arc::new(NoopStoreEventSink),
    ));
    Arc::new(ServerState::new(store, Arc::new(NoopApiAuditSink), DEFAULT_SUBSCRIPTION_URL_BASE))
}

fn submit_request(merchant_id: &str, name: &str) -> RegisterRequest {
    serde_json::from_value(json!({ "merchantId": merchant_id, "name": name }))
        .expect("request json")
}

async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("body json")
}

async fn submit(state: &Arc<ServerState>, request: RegisterRequest) -> Response {
    handle_register_submit(State(Arc::clone(state)), Ok(axum::Json(request))).await
}

async fn query_single(state: &Arc<ServerState>, merchant_id: &str) -> Response {
    let query = RegistrationQuery {
        merchant_id: Some(merchant_id.to_string()),
    };
    handle_register_query(State(Arc::clone(state)), Ok(Query(query))).await
}

async fn query_all(state: &Arc<ServerState>) -> Response {
    handle_register_query(State(Arc::clone(state)), Ok(Query(RegistrationQuery::default()))).await
}

async fn metadata(state: &Arc<ServerState>, chain_id: &str, token_id: &str) -> Response {
    handle_metadata(
        State(Arc::clone(state)),
        Path((chain_id.to_string(), token_id.to_string())),
    )
    .await
}

// ============================================================================
// SECTION: Registration Submit
// ============================================================================

#[tokio::test]
async fn submit_then_read_back_round_trips() {
    let state = memory_state();
    let response = submit(&state, submit_request("42", "Acme")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["merchantId"], json!("42"));
    assert_eq!(body["message"], json!("Merchant metadata saved successfully"));
    assert_eq!(body["merchant"]["name"], json!("Acme"));
    assert_eq!(body["merchant"]["description"], json!(""));
    assert_eq!(body["merchant"]["logo"], Value::Null);

    let lookup = query_single(&state, "42").await;
    assert_eq!(lookup.status(), StatusCode::OK);
    let record = response_json(lookup).await;
    assert_eq!(record["merchantId"], json!("42"));
    assert_eq!(record["name"], json!("Acme"));
}

#[tokio::test]
async fn submit_missing_required_fields_is_rejected() {
    let state = memory_state();
    let request: RegisterRequest =
        serde_json::from_value(json!({ "name": "Acme" })).expect("request json");
    let response = submit(&state, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("merchantId and name are required"));

    let request: RegisterRequest =
        serde_json::from_value(json!({ "merchantId": "42", "name": "" })).expect("request json");
    let response = submit(&state, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_accepts_numeric_merchant_id() {
    let state = memory_state();
    let request: RegisterRequest =
        serde_json::from_value(json!({ "merchantId": 42, "name": "Acme" })).expect("request json");
    let response = submit(&state, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["merchantId"], json!("42"));
    assert_eq!(body["merchant"]["merchantId"], json!("42"));
}

#[tokio::test]
async fn oversized_logo_is_rejected_before_any_store_write() {
    let state = memory_state();
    let oversized = format!(
        "data:image/png;base64,{}",
        "A".repeat(MAX_LOGO_BYTES / 3 * 4 + 8)
    );
    let request: RegisterRequest =
        serde_json::from_value(json!({ "merchantId": "42", "name": "Acme", "logo": oversized }))
            .expect("request json");
    let response = submit(&state, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Logo too large. Max size is 500KB"));

    let listing = response_json(query_all(&state).await).await;
    assert_eq!(listing, json!([]));
}

#[tokio::test]
async fn non_embedded_logo_is_silently_dropped() {
    let state = memory_state();
    let request: RegisterRequest = serde_json::from_value(json!({
        "merchantId": "42",
        "name": "Acme",
        "logo": "https://example.com/logo.png"
    }))
    .expect("request json");
    let response = submit(&state, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["merchant"]["logo"], Value::Null);
}

#[tokio::test]
async fn second_submit_overwrites_display_fields() {
    let state = memory_state();
    submit(&state, submit_request("42", "First")).await;
    let response = submit(&state, submit_request("42", "Second")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let record = response_json(query_single(&state, "42").await).await;
    assert_eq!(record["name"], json!("Second"));
}

// ============================================================================
// SECTION: Registration Read
// ============================================================================

#[tokio::test]
async fn lookup_of_unknown_merchant_is_not_found() {
    let state = memory_state();
    let response = query_single(&state, "missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Merchant not found"));
}

#[tokio::test]
async fn bulk_listing_redacts_logos_while_direct_lookup_keeps_them() {
    let state = memory_state();
    let logo = "data:image/png;base64,bG9nbw==";
    let request: RegisterRequest = serde_json::from_value(
        json!({ "merchantId": "42", "name": "Acme", "logo": logo }),
    )
    .expect("request json");
    submit(&state, request).await;
    submit(&state, submit_request("7", "NoLogo")).await;

    let listing = response_json(query_all(&state).await).await;
    let entries = listing.as_array().expect("array listing");
    assert_eq!(entries.len(), 2);
    for entry in entries {
        let redacted = &entry["logo"];
        assert!(redacted.is_null() || redacted == &json!("base64..."));
        assert_ne!(redacted, &json!(logo));
    }

    let record = response_json(query_single(&state, "42").await).await;
    assert_eq!(record["logo"], json!(logo));
}

// ============================================================================
// SECTION: CORS
// ============================================================================

#[tokio::test]
async fn registration_responses_carry_permissive_cors_headers() {
    let state = memory_state();
    let response = submit(&state, submit_request("42", "Acme")).await;
    let headers = response.headers();
    assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).expect("origin"), "*");
    assert_eq!(
        headers.get(ACCESS_CONTROL_ALLOW_METHODS).expect("methods"),
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        headers.get(ACCESS_CONTROL_ALLOW_HEADERS).expect("headers"),
        "Content-Type, Authorization"
    );
}

#[tokio::test]
async fn preflight_requests_succeed_with_empty_bodies() {
    let registration = handle_register_preflight().await;
    assert_eq!(registration.status(), StatusCode::OK);
    assert_eq!(registration.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).expect("origin"), "*");
    let bytes = to_bytes(registration.into_body(), usize::MAX).await.expect("body");
    assert!(bytes.is_empty());

    let metadata = handle_metadata_preflight().await;
    assert_eq!(metadata.status(), StatusCode::OK);
    assert_eq!(
        metadata.headers().get(ACCESS_CONTROL_ALLOW_METHODS).expect("methods"),
        "GET, OPTIONS"
    );
    let bytes = to_bytes(metadata.into_body(), usize::MAX).await.expect("body");
    assert!(bytes.is_empty());
}

// ============================================================================
// SECTION: NFT Metadata
// ============================================================================

#[tokio::test]
async fn metadata_for_registered_merchant_has_fixed_attribute_order() {
    let state = memory_state();
    submit(&state, submit_request("42", "Acme")).await;

    let response = metadata(&state, "1", "42").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["name"], json!("Acme - Subscription"));
    assert_eq!(body["description"], json!("Active subscription to Acme"));
    assert_eq!(body["image"], Value::Null);
    assert_eq!(
        body["external_url"],
        json!("https://nft-sub.vercel.app/subscription/42")
    );

    let attributes = body["attributes"].as_array().expect("attributes");
    let traits: Vec<&str> =
        attributes.iter().map(|a| a["trait_type"].as_str().expect("trait")).collect();
    assert_eq!(traits, vec!["Merchant", "Token ID", "Chain", "Status", "Type"]);
    assert_eq!(attributes[0]["value"], json!("Acme"));
    assert_eq!(attributes[1]["value"], json!("42"));
    assert_eq!(attributes[2]["value"], json!("Ethereum"));
    assert_eq!(attributes[3]["value"], json!("Active"));
    assert_eq!(attributes[4]["value"], json!("Premium Subscription"));
}

#[tokio::test]
async fn metadata_chain_trait_resolves_known_and_unknown_ids() {
    let state = memory_state();
    submit(&state, submit_request("42", "Acme")).await;

    for (chain_id, expected) in [("1", "Ethereum"), ("8453", "Base"), ("999999", "Chain 999999")] {
        let body = response_json(metadata(&state, chain_id, "42").await).await;
        assert_eq!(body["attributes"][2]["value"], json!(expected), "chain {chain_id}");
    }
}

#[tokio::test]
async fn metadata_keeps_stored_description_and_logo() {
    let state = memory_state();
    let logo = "data:image/png;base64,bG9nbw==";
    let request: RegisterRequest = serde_json::from_value(json!({
        "merchantId": "42",
        "name": "Acme",
        "description": "Best widgets",
        "logo": logo
    }))
    .expect("request json");
    submit(&state, request).await;

    let body = response_json(metadata(&state, "137", "42").await).await;
    assert_eq!(body["description"], json!("Best widgets"));
    assert_eq!(body["image"], json!(logo));
}

#[tokio::test]
async fn metadata_for_unregistered_merchant_returns_remediation_hint() {
    let state = memory_state();
    let response = metadata(&state, "1", "42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Merchant not registered"));
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("Merchant 42"));
    assert!(message.contains("/merchant/setup/42"));
}

// ============================================================================
// SECTION: Degraded Mode
// ============================================================================

#[tokio::test]
async fn storage_outage_never_produces_500s() {
    let state = degraded_state();

    let response = submit(&state, submit_request("42", "Acme")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let lookup = query_single(&state, "42").await;
    assert_eq!(lookup.status(), StatusCode::OK);

    let missing = query_single(&state, "absent").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let document = metadata(&state, "1", "42").await;
    assert_eq!(document.status(), StatusCode::OK);

    let unregistered = metadata(&state, "1", "absent").await;
    assert_eq!(unregistered.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn readiness_reports_degraded_mode() {
    let degraded = degraded_state();
    let response = handle_ready(State(degraded)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let healthy = memory_state();
    let response = handle_ready(State(healthy)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// SECTION: Router
// ============================================================================

#[tokio::test]
async fn malformed_body_yields_generic_500() {
    let router = build_router(memory_state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/merchant/register")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("Failed to save merchant metadata"));
}

#[tokio::test]
async fn routes_dispatch_to_expected_handlers() {
    let state = memory_state();
    submit(&state, submit_request("42", "Acme")).await;
    let router = build_router(state);

    let request = Request::builder()
        .method("GET")
        .uri("/api/metadata/8453/42")
        .body(Body::empty())
        .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["attributes"][2]["value"], json!("Base"));

    let request =
        Request::builder().method("GET").uri("/health").body(Body::empty()).expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}
