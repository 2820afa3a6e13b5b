// crates/nft-sub-server/src/cors.rs
// ============================================================================
// Module: CORS Policy
// Description: Permissive cross-origin headers for API responses.
// Purpose: Let arbitrary front-end origins call the API endpoints.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! Both API endpoints answer with a wildcard origin plus an explicit
//! per-endpoint method/header allowlist, and satisfy pre-flight `OPTIONS`
//! requests with an empty 200. Policies are compile-time constants; handlers
//! attach them to every response they build.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;
use axum::http::header::ACCESS_CONTROL_ALLOW_METHODS;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Per-endpoint CORS policy.
///
/// # Invariants
/// - Origin is always the wildcard; only methods/headers vary per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Allowed methods header value.
    pub allow_methods: &'static str,
    /// Allowed request headers header value.
    pub allow_headers: &'static str,
}

/// CORS policy for the registration endpoint.
pub const REGISTRATION_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, OPTIONS",
    allow_headers: "Content-Type, Authorization",
};

/// CORS policy for the NFT metadata endpoint.
pub const METADATA_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, OPTIONS",
    allow_headers: "Content-Type",
};

impl CorsPolicy {
    /// Returns the header pairs attached to every response.
    #[must_use]
    pub fn header_pairs(&self) -> [(HeaderName, HeaderValue); 3] {
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(self.allow_methods)),
            (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(self.allow_headers)),
        ]
    }

    /// Attaches the policy headers to a response.
    pub fn apply(&self, response: &mut Response) {
        for (name, value) in self.header_pairs() {
            response.headers_mut().insert(name, value);
        }
    }

    /// Builds the empty 200 answer for a pre-flight request.
    #[must_use]
    pub fn preflight(&self) -> Response {
        let mut response = StatusCode::OK.into_response();
        self.apply(&mut response);
        response
    }
}

// ============================================================================
// SECTION: Response Helper
// ============================================================================

/// Builds a JSON response carrying the endpoint's CORS headers.
pub(crate) fn json_with_cors<T: Serialize>(
    policy: &CorsPolicy,
    status: StatusCode,
    body: T,
) -> Response {
    let mut response = (status, axum::Json(body)).into_response();
    policy.apply(&mut response);
    response
}
