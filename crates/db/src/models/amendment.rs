//! Amendment sub-entries owned by an engagement.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use mentorbook_core::amendment::AmendmentKind;
use mentorbook_core::types::{DbId, Timestamp};

/// One calendar date marked unavailable, with the requester's reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// One calendar date with the replacement time-of-day labels proposed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotChangeDate {
    pub date: NaiveDate,
    pub new_time_slots: Vec<String>,
}

/// Kind-specific amendment payload.
///
/// Untagged on the wire: the `kind` column on the row is the discriminant,
/// and the two variants have disjoint field names (`reason` vs
/// `new_time_slots`), so decoding is unambiguous for the non-empty lists the
/// workflow accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmendmentDetails {
    UnavailableDays(Vec<UnavailableDate>),
    SlotChange(Vec<SlotChangeDate>),
}

impl AmendmentDetails {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> AmendmentKind {
        match self {
            AmendmentDetails::UnavailableDays(_) => AmendmentKind::UnavailableDays,
            AmendmentDetails::SlotChange(_) => AmendmentKind::SlotChange,
        }
    }

    /// Number of dates covered by the payload.
    pub fn len(&self) -> usize {
        match self {
            AmendmentDetails::UnavailableDays(dates) => dates.len(),
            AmendmentDetails::SlotChange(dates) => dates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A row from the `amendments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Amendment {
    pub id: DbId,
    pub engagement_id: DbId,
    pub kind: String,
    pub details: Json<AmendmentDetails>,
    pub requested_by: String,
    pub requester_id: DbId,
    pub approval_state: String,
    pub approver_id: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for appending a new amendment proposal.
#[derive(Debug, Clone)]
pub struct CreateAmendment {
    pub engagement_id: DbId,
    pub kind: AmendmentKind,
    pub details: AmendmentDetails,
    pub requested_by: String,
    pub requester_id: DbId,
}
