//! Confirmed, time-boxed mentor-user engagements.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use mentorbook_core::slot::TimeSlot;
use mentorbook_core::types::{DbId, Timestamp};

use crate::models::amendment::Amendment;

/// A row from the `engagements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Engagement {
    pub id: DbId,
    pub mentor_id: DbId,
    pub user_id: DbId,
    pub selected_slot: Json<Vec<TimeSlot>>,
    pub price_cents: i64,
    pub payment_confirmed: bool,
    pub is_active: bool,
    pub feedback_given: bool,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An engagement together with its amendment history.
#[derive(Debug, Serialize)]
pub struct EngagementDetail {
    #[serde(flatten)]
    pub engagement: Engagement,
    pub amendments: Vec<Amendment>,
}
