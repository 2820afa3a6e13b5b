// crates/nft-sub-server/src/audit.rs
// ============================================================================
// Module: API Audit Sink
// Description: Observability hooks for request outcomes and store fallbacks.
// Purpose: Record operability events without hard logging dependencies.
// Dependencies: nft-sub-core, serde, serde_json
// ============================================================================

//! ## Overview
//! This module exposes a thin audit interface for API request outcomes and
//! degraded-mode store events. It is intentionally dependency-light so
//! deployments can plug in structured logging or metrics without redesign.
//! Storage failures recovered by fallback are recorded here for operability;
//! they are never surfaced to HTTP callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use nft_sub_core::StoreError;
use nft_sub_core::StoreEventSink;
use nft_sub_core::StoreOperation;
use serde::Serialize;

// ============================================================================
// SECTION: Event Labels
// ============================================================================

/// API endpoint classification.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiEndpoint {
    /// Merchant registration endpoint.
    Registration,
    /// NFT metadata endpoint.
    Metadata,
    /// Liveness probe.
    Health,
    /// Readiness probe.
    Readiness,
}

impl ApiEndpoint {
    /// Returns a stable label for the endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Metadata => "metadata",
            Self::Health => "health",
            Self::Readiness => "readiness",
        }
    }
}

/// API request outcome classification.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// Successful request.
    Ok,
    /// Client input error (4xx).
    ClientError,
    /// Unexpected internal error (5xx).
    InternalError,
}

impl ApiOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ClientError => "client_error",
            Self::InternalError => "internal_error",
        }
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit event payload.
///
/// # Invariants
/// - Events never embed logo payloads or other bulky record fields.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiAuditEvent {
    /// Completed HTTP request.
    Request {
        /// Endpoint that served the request.
        endpoint: ApiEndpoint,
        /// Outcome classification.
        outcome: ApiOutcome,
        /// HTTP status code returned.
        status: u16,
        /// Merchant id involved, when known.
        merchant_id: Option<String>,
        /// Free-text detail for non-ok outcomes.
        detail: Option<String>,
    },
    /// Durable-store failure recovered by the in-memory fallback.
    StoreFallback {
        /// Store operation that fell back.
        operation: &'static str,
        /// Failure description.
        error: String,
    },
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Audit sink for API and store events.
pub trait ApiAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &ApiAuditEvent);
}

/// Shared handle to an audit sink.
pub type SharedApiAuditSink = Arc<dyn ApiAuditSink>;

/// No-op audit sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopApiAuditSink;

impl ApiAuditSink for NoopApiAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}
}

// ============================================================================
// SECTION: Writer Sink
// ============================================================================

/// Audit sink emitting one JSON line per event to a writer.
///
/// # Invariants
/// - Write failures are swallowed; auditing never fails a request.
pub struct WriterAuditSink {
    /// Destination writer guarded for concurrent handler access.
    writer: Mutex<Box<dyn Write + Send>>,
}

impl WriterAuditSink {
    /// Creates a sink writing to the provided destination.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Creates a sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }
}

impl ApiAuditSink for WriterAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        let Ok(line) = serde_json::to_string(event) else {
            return;
        };
        let mut guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(guard, "{line}");
    }
}

// ============================================================================
// SECTION: Store Event Adapter
// ============================================================================

/// Adapter forwarding store fallback events into an API audit sink.
///
/// # Invariants
/// - Only the error description is captured, never record payloads.
pub struct StoreFallbackAudit {
    /// Destination audit sink.
    sink: SharedApiAuditSink,
}

impl StoreFallbackAudit {
    /// Creates an adapter forwarding into the provided sink.
    #[must_use]
    pub const fn new(sink: SharedApiAuditSink) -> Self {
        Self {
            sink,
        }
    }
}

impl StoreEventSink for StoreFallbackAudit {
    fn record_fallback(&self, operation: StoreOperation, error: &StoreError) {
        self.sink.record(&ApiAuditEvent::StoreFallback {
            operation: operation.as_str(),
            error: error.to_string(),
        });
    }
}
