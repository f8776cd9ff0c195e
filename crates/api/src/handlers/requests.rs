//! Handlers for request intake and the mentor's accept/reject actions.
//!
//! Intake records intent only: the slot is not re-checked against the
//! mentor's locked slots here. Conflict avoidance is guaranteed at the
//! booking step, which re-runs the lock check atomically.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use mentorbook_core::booking::{ACCEPTANCE_ACCEPTED, ACCEPTANCE_PENDING, ACCEPTANCE_REJECTED};
use mentorbook_core::error::CoreError;
use mentorbook_core::types::DbId;
use mentorbook_db::models::mentor_request::CreateMentorRequest;
use mentorbook_db::repositories::{MentorRepo, MentorRequestRepo, UserRepo};
use mentorbook_events::{bus, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/requests
///
/// Submit a pending booking intent for one mentor slot. Both the payment and
/// acceptance statuses start `pending`; persistence is the only side effect.
pub async fn submit_request(
    State(state): State<AppState>,
    Json(mut input): Json<CreateMentorRequest>,
) -> AppResult<impl IntoResponse> {
    if input.slot.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "slot must carry at least one time-of-day label".to_string(),
        )));
    }
    if input.price_cents <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "price_cents must be positive".to_string(),
        )));
    }

    MentorRepo::find_by_id(&state.pool, input.mentor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Mentor",
            id: input.mentor_id,
        }))?;
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    input.slot.normalize();
    let request = MentorRequestRepo::create(&state.pool, &input).await?;

    tracing::info!(
        request_id = request.id,
        mentor_id = request.mentor_id,
        user_id = request.user_id,
        "Mentor request submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = MentorRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MentorRequest",
            id,
        }))?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/accept
///
/// Record the mentor's acceptance. This does not create an engagement; it
/// signals that payment may proceed, and from here on the request's slot
/// counts toward the mentor's locked slots.
pub async fn accept_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    decide_request(state, id, ACCEPTANCE_ACCEPTED).await
}

/// POST /api/v1/requests/{id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    decide_request(state, id, ACCEPTANCE_REJECTED).await
}

/// Shared accept/reject path. Acceptance decisions are one-shot: only a
/// `pending` request transitions, anything else conflicts.
async fn decide_request(
    state: AppState,
    id: DbId,
    decision: &'static str,
) -> AppResult<impl IntoResponse> {
    let existing = MentorRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MentorRequest",
            id,
        }))?;

    if existing.acceptance_status != ACCEPTANCE_PENDING {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "request is already {}",
            existing.acceptance_status
        ))));
    }

    let Some(request) = MentorRequestRepo::set_acceptance(&state.pool, id, decision).await? else {
        // Raced with another decision between the read and the update.
        return Err(AppError::Core(CoreError::Conflict(
            "request was decided concurrently".to_string(),
        )));
    };

    tracing::info!(request_id = id, decision, "Mentor request decided");

    let event = DomainEvent::new(bus::REQUEST_DECIDED)
        .with_source("mentor_request", id)
        .with_actor(request.mentor_id)
        .with_payload(serde_json::json!({
            "decision": decision,
            "user_id": request.user_id,
        }));
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: request }))
}

/// GET /api/v1/mentors/{mentor_id}/requests
///
/// The mentor's inbox: every request addressed to them, newest first.
pub async fn list_requests_for_mentor(
    State(state): State<AppState>,
    Path(mentor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    MentorRepo::find_by_id(&state.pool, mentor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Mentor",
            id: mentor_id,
        }))?;

    let requests = MentorRequestRepo::list_for_mentor(&state.pool, mentor_id).await?;
    Ok(Json(DataResponse { data: requests }))
}
