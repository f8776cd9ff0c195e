//! Booking lifecycle constants and end-date math.

use chrono::Duration;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// MentorRequest status values
// ---------------------------------------------------------------------------

/// Mentor has not yet decided on the request.
pub const ACCEPTANCE_PENDING: &str = "pending";
/// Mentor accepted; the user may proceed to payment and the request's slot
/// counts as locked.
pub const ACCEPTANCE_ACCEPTED: &str = "accepted";
/// Mentor rejected; payment must not proceed.
pub const ACCEPTANCE_REJECTED: &str = "rejected";

// ---------------------------------------------------------------------------
// Engagement period
// ---------------------------------------------------------------------------

/// Default engagement length when no per-mentor override is configured.
pub const DEFAULT_ENGAGEMENT_PERIOD_DAYS: i64 = 30;

/// Compute an engagement's end date from its start date and period length.
pub fn compute_end_date(start: Timestamp, period_days: i64) -> Timestamp {
    start + Duration::days(period_days)
}
