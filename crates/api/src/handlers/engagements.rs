//! Handlers for engagement reads and cancellation.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use mentorbook_core::error::CoreError;
use mentorbook_core::types::DbId;
use mentorbook_db::repositories::{EngagementRepo, MentorRepo, UserRepo};
use mentorbook_events::{bus, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::amendments::{engagement_detail, find_engagement};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for cancellation.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

/// GET /api/v1/engagements/{id}
pub async fn get_engagement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let engagement = find_engagement(&state, id).await?;
    let detail = engagement_detail(&state, engagement).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/mentors/{mentor_id}/engagements
pub async fn list_for_mentor(
    State(state): State<AppState>,
    Path(mentor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let engagements = EngagementRepo::list_for_mentor(&state.pool, mentor_id).await?;
    Ok(Json(DataResponse { data: engagements }))
}

/// GET /api/v1/users/{user_id}/engagements
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let engagements = EngagementRepo::list_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: engagements }))
}

/// POST /api/v1/engagements/{id}/cancel
///
/// Terminate an engagement early: flip `is_active` exactly once and notify
/// the mentor. History and payment records stay; refunds are a separate
/// financial workflow.
pub async fn cancel_engagement(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CancelRequest>,
) -> AppResult<impl IntoResponse> {
    if input.reason.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "reason is required".to_string(),
        )));
    }

    let engagement = find_engagement(&state, id).await?;

    // Identities must resolve to compose the notification. A dangling
    // reference here is inconsistent data, not a routine not-found.
    let mentor = MentorRepo::find_by_id(&state.pool, engagement.mentor_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Integrity(format!(
                "engagement {id} references missing mentor {}",
                engagement.mentor_id
            )))
        })?;
    let user = UserRepo::find_by_id(&state.pool, engagement.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Integrity(format!(
                "engagement {id} references missing user {}",
                engagement.user_id
            )))
        })?;

    let Some(cancelled) = EngagementRepo::cancel(&state.pool, id).await? else {
        return Err(AppError::Core(CoreError::Conflict(
            "engagement is already cancelled".to_string(),
        )));
    };

    tracing::info!(
        engagement_id = id,
        mentor_id = mentor.id,
        reason = %input.reason,
        "Engagement cancelled"
    );

    let event = DomainEvent::new(bus::ENGAGEMENT_CANCELLED)
        .with_source("engagement", id)
        .with_actor(user.id)
        .with_payload(serde_json::json!({
            "reason": input.reason,
            "mentor_id": mentor.id,
            "mentor_name": mentor.name,
            "mentor_email": mentor.email,
            "user_name": user.name,
        }));
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: cancelled }))
}
