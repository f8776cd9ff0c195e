//! Pending booking intents ("mentor requests").

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use mentorbook_core::slot::TimeSlot;
use mentorbook_core::types::{DbId, Timestamp};

/// A row from the `mentor_requests` table.
///
/// Hard-deleted on conversion into an engagement; a request absent by id is
/// the confirmation that conversion happened.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MentorRequest {
    pub id: DbId,
    pub mentor_id: DbId,
    pub user_id: DbId,
    pub slot: Json<TimeSlot>,
    pub price_cents: i64,
    /// Stays `pending` for the row's lifetime: a paid request is converted
    /// into an engagement and deleted, and a failed charge leaves the row
    /// untouched for retry. Charge outcomes live in `booking_attempts`.
    pub payment_status: String,
    pub acceptance_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMentorRequest {
    pub mentor_id: DbId,
    pub user_id: DbId,
    pub slot: TimeSlot,
    pub price_cents: i64,
}
