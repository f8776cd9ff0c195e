//! Idempotency ledger rows for booking finalization.

use serde::Serialize;
use sqlx::FromRow;

use mentorbook_core::types::{DbId, Timestamp};

/// Attempt row created before the gateway is called.
pub const ATTEMPT_STARTED: &str = "started";
/// Gateway charge succeeded; engagement creation still outstanding.
pub const ATTEMPT_CHARGED: &str = "charged";
/// Engagement created; the attempt is complete.
pub const ATTEMPT_FINALIZED: &str = "finalized";
/// Gateway declined or errored; the key may be retried.
pub const ATTEMPT_FAILED: &str = "failed";

/// A row from the `booking_attempts` table.
///
/// One row per logical booking attempt, keyed by the caller-supplied
/// idempotency key. A retried call with the same key lands on the same row
/// instead of producing a second charge or engagement.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingAttempt {
    pub id: DbId,
    pub idempotency_key: String,
    pub request_id: DbId,
    pub engagement_id: Option<DbId>,
    pub charge_id: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
