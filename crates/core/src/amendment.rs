//! Amendment kinds, approval states, and the workflow rule set.
//!
//! An amendment is a mid-engagement proposal by one party, resolved by the
//! other. Each sub-entry moves `pending -> approved` or `pending -> rejected`
//! and never transitions again. The proposal predicates live here, in one
//! place, so every caller goes through the same rule set.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Awaiting the counter-party's decision.
pub const APPROVAL_PENDING: &str = "pending";
/// Counter-party approved. Terminal.
pub const APPROVAL_APPROVED: &str = "approved";
/// Counter-party rejected. Terminal.
pub const APPROVAL_REJECTED: &str = "rejected";

/// Requesting-party labels.
pub const PARTY_USER: &str = "user";
pub const PARTY_MENTOR: &str = "mentor";

/// Cap on outstanding pending proposals by one requester, per kind.
pub const MAX_PENDING_PER_REQUESTER: usize = 3;

// ---------------------------------------------------------------------------
// AmendmentKind
// ---------------------------------------------------------------------------

/// The two supported amendment kinds.
///
/// Selected by exhaustive matching; the string forms are the `kind` column
/// values in the amendments table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendmentKind {
    /// Mark specific calendar dates unavailable, each with a reason.
    UnavailableDays,
    /// Swap the time slots used on specific calendar dates.
    SlotChange,
}

impl AmendmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmendmentKind::UnavailableDays => "unavailable_days",
            AmendmentKind::SlotChange => "slot_change",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unavailable_days" => Some(AmendmentKind::UnavailableDays),
            "slot_change" => Some(AmendmentKind::SlotChange),
            _ => None,
        }
    }
}

impl std::fmt::Display for AmendmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Proposal rules
// ---------------------------------------------------------------------------

/// The standing of one existing amendment of a given kind, as seen by the
/// proposal rule set.
#[derive(Debug, Clone)]
pub struct AmendmentStanding {
    pub requester_id: DbId,
    pub approval_state: String,
}

/// Validate a new proposal of one kind against the engagement's existing
/// amendments of that same kind.
///
/// The four predicates, checked in order:
///
/// 1. the engagement's end date has not passed;
/// 2. no amendment of this kind has ever been approved;
/// 3. the requester has fewer than [`MAX_PENDING_PER_REQUESTER`] pending;
/// 4. no amendment of this kind is pending from either party.
///
/// Returns a human-readable rule violation on failure.
pub fn validate_proposal(
    existing: &[AmendmentStanding],
    requester_id: DbId,
    now: Timestamp,
    end_date: Option<Timestamp>,
) -> Result<(), String> {
    if let Some(end) = end_date {
        if end <= now {
            return Err("the engagement has ended; no further changes can be proposed".into());
        }
    }

    if existing
        .iter()
        .any(|a| a.approval_state == APPROVAL_APPROVED)
    {
        return Err("an amendment of this kind has already been approved".into());
    }

    let pending_by_requester = existing
        .iter()
        .filter(|a| a.approval_state == APPROVAL_PENDING && a.requester_id == requester_id)
        .count();
    if pending_by_requester >= MAX_PENDING_PER_REQUESTER {
        return Err(format!(
            "at most {MAX_PENDING_PER_REQUESTER} pending proposals are allowed per requester"
        ));
    }

    if existing
        .iter()
        .any(|a| a.approval_state == APPROVAL_PENDING)
    {
        return Err("an amendment of this kind is already awaiting a decision".into());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Resolution rules
// ---------------------------------------------------------------------------

/// Validate a resolution decision against an amendment's current state.
///
/// Only `approved` and `rejected` are valid decisions, and only a `pending`
/// amendment can be resolved; both terminal states stay terminal.
pub fn validate_resolution(current_state: &str, decision: &str) -> Result<(), String> {
    if decision != APPROVAL_APPROVED && decision != APPROVAL_REJECTED {
        return Err(format!(
            "invalid decision '{decision}': must be '{APPROVAL_APPROVED}' or '{APPROVAL_REJECTED}'"
        ));
    }
    if current_state != APPROVAL_PENDING {
        return Err(format!(
            "amendment is already {current_state}; resolutions are terminal"
        ));
    }
    Ok(())
}

/// True for the two recognized requesting-party labels.
pub fn is_valid_party(requested_by: &str) -> bool {
    requested_by == PARTY_USER || requested_by == PARTY_MENTOR
}
