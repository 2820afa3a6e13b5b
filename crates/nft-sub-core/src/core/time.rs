// crates/nft-sub-core/src/core/time.rs
// ============================================================================
// Module: NFT-Sub Time Model
// Description: Clock seam for store-managed record timestamps.
// Purpose: Keep record timestamps injectable so store behavior stays replayable.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Stores stamp `created_at`/`updated_at` on every write, but the core never
//! reads wall-clock time directly. Hosts inject a [`Clock`]; production code
//! uses [`SystemClock`] and tests use [`FixedClock`] to make timestamp
//! assertions deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Clock Seam
// ============================================================================

/// Timestamp source injected into store implementations.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Shared handle to a clock implementation.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock backed clock for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns a shared system clock handle.
    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// # Invariants
/// - Time only changes through [`FixedClock::set`] or [`FixedClock::advance`].
#[derive(Debug)]
pub struct FixedClock {
    /// Current instant served to callers.
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    /// Creates a fixed clock starting at the provided instant.
    #[must_use]
    pub const fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Creates a fixed clock starting at the unix epoch.
    #[must_use]
    pub const fn at_epoch() -> Self {
        Self::new(OffsetDateTime::UNIX_EPOCH)
    }

    /// Replaces the current instant.
    pub fn set(&self, value: OffsetDateTime) {
        *self.guard() = value;
    }

    /// Moves the current instant forward by the provided duration.
    pub fn advance(&self, duration: Duration) {
        let mut guard = self.guard();
        *guard += duration;
    }

    /// Returns the inner guard, recovering from poisoned locks.
    fn guard(&self) -> std::sync::MutexGuard<'_, OffsetDateTime> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        *self.guard()
    }
}
