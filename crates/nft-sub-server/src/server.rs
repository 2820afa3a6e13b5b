// crates/nft-sub-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: Axum router, handlers, and store assembly for the API.
// Purpose: Serve registration, NFT metadata, and probe endpoints.
// Dependencies: axum, nft-sub-core, nft-sub-store-sqlite, serde_json, tokio
// ============================================================================

//! ## Overview
//! Handlers are stateless between requests and hold only the shared store,
//! audit sink, and metadata settings. Error propagation follows the service
//! policy: input errors become 4xx with descriptive JSON, storage failures
//! are absorbed by the fallback store before reaching handlers, and anything
//! unexpected (such as a malformed body) becomes a generic 500 with no
//! internal detail leaked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use nft_sub_core::ChainId;
use nft_sub_core::FallbackMerchantStore;
use nft_sub_core::InMemoryMerchantStore;
use nft_sub_core::LOGO_PLACEHOLDER;
use nft_sub_core::MAX_LOGO_BYTES;
use nft_sub_core::MerchantId;
use nft_sub_core::MerchantStore;
use nft_sub_core::SharedClock;
use nft_sub_core::SharedMerchantStore;
use nft_sub_core::SharedStoreEventSink;
use nft_sub_core::StoreError;
use nft_sub_core::StoreOperation;
use nft_sub_store_sqlite::SqliteMerchantStore;
use serde_json::json;
use thiserror::Error;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiEndpoint;
use crate::audit::ApiOutcome;
use crate::audit::SharedApiAuditSink;
use crate::config::StoreBackendConfig;
use crate::cors::METADATA_CORS;
use crate::cors::REGISTRATION_CORS;
use crate::cors::json_with_cors;
use crate::metadata::GENERATE_FAILED_MESSAGE;
use crate::metadata::INTERNAL_ERROR;
use crate::metadata::NOT_REGISTERED_ERROR;
use crate::metadata::build_token_metadata;
use crate::metadata::remediation_message;
use crate::registration::ErrorBody;
use crate::registration::FETCH_FAILED_ERROR;
use crate::registration::NOT_FOUND_ERROR;
use crate::registration::RegisterRequest;
use crate::registration::RegisterResponse;
use crate::registration::RegistrationQuery;
use crate::registration::SAVE_FAILED_ERROR;
use crate::registration::SAVED_MESSAGE;
use crate::registration::validate_registration;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup/runtime errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Listener could not bind the configured address.
    #[error("bind failed: {0}")]
    Bind(String),
    /// Server I/O failure after startup.
    #[error("server io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared handler state.
///
/// # Invariants
/// - Handlers hold no other state between requests.
pub struct ServerState {
    /// Merchant store serving every request.
    pub store: SharedMerchantStore,
    /// Audit sink for request outcomes.
    pub audit: SharedApiAuditSink,
    /// Logo size cap enforced before store writes.
    pub max_logo_bytes: usize,
    /// Base URL prefixed to token ids in `external_url` values.
    pub subscription_url_base: String,
}

impl ServerState {
    /// Creates handler state with the default logo cap.
    #[must_use]
    pub fn new(
        store: SharedMerchantStore,
        audit: SharedApiAuditSink,
        subscription_url_base: impl Into<String>,
    ) -> Self {
        Self {
            store,
            audit,
            max_logo_bytes: MAX_LOGO_BYTES,
            subscription_url_base: subscription_url_base.into(),
        }
    }

    /// Records a completed request in the audit sink.
    fn record_request(
        &self,
        endpoint: ApiEndpoint,
        outcome: ApiOutcome,
        status: StatusCode,
        merchant_id: Option<&MerchantId>,
        detail: Option<String>,
    ) {
        self.audit.record(&ApiAuditEvent::Request {
            endpoint,
            outcome,
            status: status.as_u16(),
            merchant_id: merchant_id.map(|id| id.as_str().to_string()),
            detail,
        });
    }
}

// ============================================================================
// SECTION: Store Assembly
// ============================================================================

/// Builds the configured store, wrapping durable backends in degraded-mode
/// fallback.
///
/// A durable backend that fails to open is reported through the event sink
/// and replaced by the in-memory store; callers never observe the failure.
#[must_use]
pub fn build_store(
    config: &StoreBackendConfig,
    clock: SharedClock,
    events: SharedStoreEventSink,
) -> SharedMerchantStore {
    match config {
        StoreBackendConfig::Memory => {
            SharedMerchantStore::from_store(InMemoryMerchantStore::new(clock))
        }
        StoreBackendConfig::Durable(sqlite) => {
            match SqliteMerchantStore::new(sqlite, Arc::clone(&clock)) {
                Ok(durable) => SharedMerchantStore::from_store(FallbackMerchantStore::new(
                    Arc::new(durable),
                    InMemoryMerchantStore::new(clock),
                    events,
                )),
                Err(error) => {
                    events.record_fallback(StoreOperation::Open, &StoreError::from(error));
                    SharedMerchantStore::from_store(InMemoryMerchantStore::new(clock))
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the API router over the provided state.
#[must_use]
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route(
            "/api/merchant/register",
            post(handle_register_submit)
                .get(handle_register_query)
                .options(handle_register_preflight),
        )
        .route(
            "/api/metadata/{chain_id}/{token_id}",
            get(handle_metadata).options(handle_metadata_preflight),
        )
        .with_state(state)
}

/// Binds the listener and serves the router until shutdown.
///
/// # Errors
///
/// Returns [`ServeError`] when binding or serving fails.
pub async fn serve(bind_addr: SocketAddr, state: Arc<ServerState>) -> Result<(), ServeError> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|err| ServeError::Bind(err.to_string()))?;
    axum::serve(listener, build_router(state))
        .await
        .map_err(|err| ServeError::Io(err.to_string()))
}

// ============================================================================
// SECTION: Registration Handlers
// ============================================================================

/// Handles `POST /api/merchant/register`.
pub(crate) async fn handle_register_submit(
    State(state): State<Arc<ServerState>>,
    payload: Result<axum::Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => {
            state.record_request(
                ApiEndpoint::Registration,
                ApiOutcome::InternalError,
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                Some(rejection.to_string()),
            );
            return json_with_cors(
                &REGISTRATION_CORS,
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(SAVE_FAILED_ERROR),
            );
        }
    };
    let draft = match validate_registration(request, state.max_logo_bytes) {
        Ok(draft) => draft,
        Err(error) => {
            state.record_request(
                ApiEndpoint::Registration,
                ApiOutcome::ClientError,
                StatusCode::BAD_REQUEST,
                None,
                Some(error.to_string()),
            );
            return json_with_cors(
                &REGISTRATION_CORS,
                StatusCode::BAD_REQUEST,
                ErrorBody::new(error.to_string()),
            );
        }
    };
    let merchant_id = draft.merchant_id.clone();
    match state.store.create_merchant(draft) {
        Ok(record) => {
            state.record_request(
                ApiEndpoint::Registration,
                ApiOutcome::Ok,
                StatusCode::OK,
                Some(&merchant_id),
                None,
            );
            json_with_cors(
                &REGISTRATION_CORS,
                StatusCode::OK,
                RegisterResponse {
                    success: true,
                    merchant_id: merchant_id.to_string(),
                    message: SAVED_MESSAGE.to_string(),
                    merchant: record,
                },
            )
        }
        Err(error) => {
            state.record_request(
                ApiEndpoint::Registration,
                ApiOutcome::InternalError,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(&merchant_id),
                Some(error.to_string()),
            );
            json_with_cors(
                &REGISTRATION_CORS,
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(SAVE_FAILED_ERROR),
            )
        }
    }
}

/// Handles `GET /api/merchant/register`.
pub(crate) async fn handle_register_query(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<RegistrationQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            state.record_request(
                ApiEndpoint::Registration,
                ApiOutcome::InternalError,
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                Some(rejection.to_string()),
            );
            return json_with_cors(
                &REGISTRATION_CORS,
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(FETCH_FAILED_ERROR),
            );
        }
    };
    // An empty id parameter falls through to the bulk listing.
    match query.merchant_id.filter(|raw_id| !raw_id.is_empty()) {
        Some(raw_id) => {
            let merchant_id = MerchantId::new(raw_id);
            match state.store.get_merchant(&merchant_id) {
                Ok(Some(record)) => {
                    state.record_request(
                        ApiEndpoint::Registration,
                        ApiOutcome::Ok,
                        StatusCode::OK,
                        Some(&merchant_id),
                        None,
                    );
                    json_with_cors(&REGISTRATION_CORS, StatusCode::OK, record)
                }
                Ok(None) => {
                    state.record_request(
                        ApiEndpoint::Registration,
                        ApiOutcome::ClientError,
                        StatusCode::NOT_FOUND,
                        Some(&merchant_id),
                        None,
                    );
                    json_with_cors(
                        &REGISTRATION_CORS,
                        StatusCode::NOT_FOUND,
                        ErrorBody::new(NOT_FOUND_ERROR),
                    )
                }
                Err(error) => {
                    state.record_request(
                        ApiEndpoint::Registration,
                        ApiOutcome::InternalError,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Some(&merchant_id),
                        Some(error.to_string()),
                    );
                    json_with_cors(
                        &REGISTRATION_CORS,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::new(FETCH_FAILED_ERROR),
                    )
                }
            }
        }
        None => match state.store.get_all_merchants() {
            Ok(records) => {
                let listed: Vec<_> = records
                    .into_iter()
                    .map(|mut record| {
                        // Bulk listings never carry raw logo payloads.
                        if record.logo.is_some() {
                            record.logo = Some(LOGO_PLACEHOLDER.to_string());
                        }
                        record
                    })
                    .collect();
                state.record_request(
                    ApiEndpoint::Registration,
                    ApiOutcome::Ok,
                    StatusCode::OK,
                    None,
                    None,
                );
                json_with_cors(&REGISTRATION_CORS, StatusCode::OK, listed)
            }
            Err(error) => {
                state.record_request(
                    ApiEndpoint::Registration,
                    ApiOutcome::InternalError,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    Some(error.to_string()),
                );
                json_with_cors(
                    &REGISTRATION_CORS,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(FETCH_FAILED_ERROR),
                )
            }
        },
    }
}

/// Handles `OPTIONS /api/merchant/register`.
pub(crate) async fn handle_register_preflight() -> Response {
    REGISTRATION_CORS.preflight()
}

// ============================================================================
// SECTION: Metadata Handlers
// ============================================================================

/// Handles `GET /api/metadata/{chain_id}/{token_id}`.
pub(crate) async fn handle_metadata(
    State(state): State<Arc<ServerState>>,
    Path((chain_id, token_id)): Path<(String, String)>,
) -> Response {
    let chain_id = ChainId::new(chain_id);
    let token_id = MerchantId::new(token_id);
    match state.store.get_merchant(&token_id) {
        Ok(Some(record)) => {
            let document =
                build_token_metadata(&record, &chain_id, &token_id, &state.subscription_url_base);
            state.record_request(
                ApiEndpoint::Metadata,
                ApiOutcome::Ok,
                StatusCode::OK,
                Some(&token_id),
                None,
            );
            json_with_cors(&METADATA_CORS, StatusCode::OK, document)
        }
        Ok(None) => {
            state.record_request(
                ApiEndpoint::Metadata,
                ApiOutcome::ClientError,
                StatusCode::NOT_FOUND,
                Some(&token_id),
                None,
            );
            json_with_cors(
                &METADATA_CORS,
                StatusCode::NOT_FOUND,
                ErrorBody::with_message(NOT_REGISTERED_ERROR, remediation_message(&token_id)),
            )
        }
        Err(error) => {
            state.record_request(
                ApiEndpoint::Metadata,
                ApiOutcome::InternalError,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(&token_id),
                Some(error.to_string()),
            );
            json_with_cors(
                &METADATA_CORS,
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::with_message(INTERNAL_ERROR, GENERATE_FAILED_MESSAGE),
            )
        }
    }
}

/// Handles `OPTIONS /api/metadata/{chain_id}/{token_id}`.
pub(crate) async fn handle_metadata_preflight() -> Response {
    METADATA_CORS.preflight()
}

// ============================================================================
// SECTION: Probe Handlers
// ============================================================================

/// Handles `GET /health`.
pub(crate) async fn handle_health() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}

/// Handles `GET /ready`.
pub(crate) async fn handle_ready(State(state): State<Arc<ServerState>>) -> Response {
    match state.store.readiness() {
        Ok(()) => {
            state.record_request(ApiEndpoint::Readiness, ApiOutcome::Ok, StatusCode::OK, None, None);
            (StatusCode::OK, axum::Json(json!({ "status": "ready" }))).into_response()
        }
        Err(error) => {
            state.record_request(
                ApiEndpoint::Readiness,
                ApiOutcome::InternalError,
                StatusCode::SERVICE_UNAVAILABLE,
                None,
                Some(error.to_string()),
            );
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(json!({ "status": "unavailable" })))
                .into_response()
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
