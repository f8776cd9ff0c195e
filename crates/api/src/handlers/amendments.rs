//! Handlers for the mid-engagement amendment workflow.
//!
//! Either party proposes; the counter-party approves or rejects. The four
//! proposal predicates (engagement not ended, no prior approval of the kind,
//! nothing of the kind pending, per-requester pending cap) are enforced here
//! in the engine, regardless of caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use mentorbook_core::amendment::{
    self, AmendmentKind, AmendmentStanding, APPROVAL_APPROVED, APPROVAL_REJECTED,
};
use mentorbook_core::error::CoreError;
use mentorbook_core::types::{DbId, Timestamp};
use mentorbook_db::models::amendment::{
    AmendmentDetails, CreateAmendment, SlotChangeDate, UnavailableDate,
};
use mentorbook_db::models::engagement::{Engagement, EngagementDetail};
use mentorbook_db::repositories::{AmendmentRepo, EngagementRepo};
use mentorbook_events::{bus, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for proposing unavailable days.
#[derive(Debug, Deserialize)]
pub struct ProposeUnavailableDaysRequest {
    pub dates: Vec<UnavailableDate>,
    pub requested_by: String,
    pub requester_id: DbId,
}

/// Request body for proposing temporary slot changes.
#[derive(Debug, Deserialize)]
pub struct ProposeSlotChangeRequest {
    pub dates: Vec<SlotChangeDate>,
    pub requested_by: String,
    pub requester_id: DbId,
}

/// Request body for resolving a pending amendment.
#[derive(Debug, Deserialize)]
pub struct ResolveAmendmentRequest {
    pub decision: String,
    pub approver_id: DbId,
    /// Supplied with approvals that push the engagement's end date out
    /// (typically unavailable-day grants).
    pub new_end_date: Option<Timestamp>,
}

/// POST /api/v1/engagements/{id}/amendments/unavailable-days
pub async fn propose_unavailable_days(
    State(state): State<AppState>,
    Path(engagement_id): Path<DbId>,
    Json(input): Json<ProposeUnavailableDaysRequest>,
) -> AppResult<impl IntoResponse> {
    if input.dates.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "at least one date is required".to_string(),
        )));
    }
    if input.dates.iter().any(|d| d.reason.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "every unavailable date needs a reason".to_string(),
        )));
    }

    propose(
        state,
        engagement_id,
        AmendmentDetails::UnavailableDays(input.dates),
        input.requested_by,
        input.requester_id,
    )
    .await
}

/// POST /api/v1/engagements/{id}/amendments/slot-changes
pub async fn propose_slot_change(
    State(state): State<AppState>,
    Path(engagement_id): Path<DbId>,
    Json(input): Json<ProposeSlotChangeRequest>,
) -> AppResult<impl IntoResponse> {
    if input.dates.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "at least one date is required".to_string(),
        )));
    }
    if input
        .dates
        .iter()
        .any(|d| d.new_time_slots.iter().all(|s| s.trim().is_empty()))
    {
        return Err(AppError::Core(CoreError::Validation(
            "every date needs at least one replacement time slot".to_string(),
        )));
    }

    propose(
        state,
        engagement_id,
        AmendmentDetails::SlotChange(input.dates),
        input.requested_by,
        input.requester_id,
    )
    .await
}

/// Shared proposal path for both amendment kinds.
async fn propose(
    state: AppState,
    engagement_id: DbId,
    details: AmendmentDetails,
    requested_by: String,
    requester_id: DbId,
) -> AppResult<(StatusCode, Json<DataResponse<EngagementDetail>>)> {
    let engagement = find_engagement(&state, engagement_id).await?;

    if !amendment::is_valid_party(&requested_by) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "requested_by must be 'user' or 'mentor', got '{requested_by}'"
        ))));
    }
    let expected_requester = match requested_by.as_str() {
        amendment::PARTY_MENTOR => engagement.mentor_id,
        _ => engagement.user_id,
    };
    if requester_id != expected_requester {
        return Err(AppError::Core(CoreError::Validation(format!(
            "requester {requester_id} is not the {requested_by} on this engagement"
        ))));
    }

    if !engagement.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "the engagement has been cancelled".to_string(),
        )));
    }

    let kind = details.kind();
    let existing = AmendmentRepo::list_for_engagement_kind(&state.pool, engagement_id, kind)
        .await?
        .into_iter()
        .map(|a| AmendmentStanding {
            requester_id: a.requester_id,
            approval_state: a.approval_state,
        })
        .collect::<Vec<_>>();

    amendment::validate_proposal(&existing, requester_id, Utc::now(), engagement.end_date)
        .map_err(|rule| AppError::Core(CoreError::Conflict(rule)))?;

    let created = AmendmentRepo::create(
        &state.pool,
        &CreateAmendment {
            engagement_id,
            kind,
            details,
            requested_by: requested_by.clone(),
            requester_id,
        },
    )
    .await?;

    tracing::info!(
        engagement_id,
        amendment_id = created.id,
        kind = %kind,
        requested_by = %requested_by,
        "Amendment proposed"
    );

    let event = DomainEvent::new(bus::AMENDMENT_PROPOSED)
        .with_source("engagement", engagement_id)
        .with_actor(requester_id)
        .with_payload(serde_json::json!({
            "amendment_id": created.id,
            "kind": kind.as_str(),
            "requested_by": requested_by,
        }));
    state.event_bus.publish(event);

    let detail = engagement_detail(&state, engagement).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// POST /api/v1/engagements/{id}/amendments/{amendment_id}/resolve
///
/// Approve or reject a pending amendment. Both outcomes are terminal. An
/// approval carrying `new_end_date` moves the engagement's end date in the
/// same atomic operation; the at-most-one-approved-per-kind invariant is
/// enforced at the write.
pub async fn resolve_amendment(
    State(state): State<AppState>,
    Path((engagement_id, amendment_id)): Path<(DbId, DbId)>,
    Json(input): Json<ResolveAmendmentRequest>,
) -> AppResult<impl IntoResponse> {
    let engagement = find_engagement(&state, engagement_id).await?;

    let existing = AmendmentRepo::find_by_id(&state.pool, engagement_id, amendment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Amendment",
            id: amendment_id,
        }))?;

    if input.decision != APPROVAL_APPROVED && input.decision != APPROVAL_REJECTED {
        return Err(AppError::Core(CoreError::Validation(format!(
            "decision must be '{APPROVAL_APPROVED}' or '{APPROVAL_REJECTED}'"
        ))));
    }
    amendment::validate_resolution(&existing.approval_state, &input.decision)
        .map_err(|rule| AppError::Core(CoreError::Conflict(rule)))?;

    let resolved = AmendmentRepo::resolve(
        &state.pool,
        engagement_id,
        amendment_id,
        &input.decision,
        input.approver_id,
        input.new_end_date,
    )
    .await?
    .ok_or_else(|| {
        // Lost a race, or an approval of this kind already exists.
        AppError::Core(CoreError::Conflict(
            "amendment could not be resolved: it is no longer pending or an \
             approval of this kind already exists"
                .to_string(),
        ))
    })?;

    tracing::info!(
        engagement_id,
        amendment_id,
        decision = %input.decision,
        new_end_date = ?input.new_end_date,
        "Amendment resolved"
    );

    let event = DomainEvent::new(bus::AMENDMENT_RESOLVED)
        .with_source("engagement", engagement_id)
        .with_actor(input.approver_id)
        .with_payload(serde_json::json!({
            "amendment_id": amendment_id,
            "kind": resolved.kind,
            "decision": input.decision,
            "new_end_date": input.new_end_date,
        }));
    state.event_bus.publish(event);

    // Re-read: an approved end-date extension must show in the response.
    let engagement = find_engagement(&state, engagement.id).await?;
    let detail = engagement_detail(&state, engagement).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/engagements/{id}/amendments
pub async fn list_amendments(
    State(state): State<AppState>,
    Path(engagement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_engagement(&state, engagement_id).await?;
    let amendments = AmendmentRepo::list_for_engagement(&state.pool, engagement_id).await?;
    Ok(Json(DataResponse { data: amendments }))
}

pub(crate) async fn find_engagement(
    state: &AppState,
    engagement_id: DbId,
) -> AppResult<Engagement> {
    EngagementRepo::find_by_id(&state.pool, engagement_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Engagement",
            id: engagement_id,
        }))
}

pub(crate) async fn engagement_detail(
    state: &AppState,
    engagement: Engagement,
) -> AppResult<EngagementDetail> {
    let amendments = AmendmentRepo::list_for_engagement(&state.pool, engagement.id).await?;
    Ok(EngagementDetail {
        engagement,
        amendments,
    })
}
