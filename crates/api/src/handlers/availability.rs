//! The slot lock calculator: which weekly slots a mentor is locked into.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use mentorbook_core::error::CoreError;
use mentorbook_core::slot::{self, TimeSlot};
use mentorbook_core::types::DbId;
use mentorbook_db::repositories::{EngagementRepo, MentorRepo, MentorRequestRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/mentors/{mentor_id}/locked-slots
///
/// The deduplicated union of day/time-slot pairs claimed by the mentor's
/// in-force engagements and accepted-but-unfinalized requests. Read-only;
/// callers use it to render availability and gate new intake at the UI
/// boundary. The booking step re-checks under a lock, so this read needs no
/// transaction.
pub async fn locked_slots(
    State(state): State<AppState>,
    Path(mentor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    MentorRepo::find_by_id(&state.pool, mentor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Mentor",
            id: mentor_id,
        }))?;

    let mut sources: Vec<TimeSlot> = EngagementRepo::list_in_force_slots(&state.pool, mentor_id)
        .await?
        .into_iter()
        .flatten()
        .collect();

    // Accepted requests come back untyped: a single malformed legacy payload
    // must not make the mentor's whole availability unreadable.
    for (request_id, value) in
        MentorRequestRepo::list_accepted_slots(&state.pool, mentor_id).await?
    {
        match serde_json::from_value::<TimeSlot>(value) {
            Ok(slot) => sources.push(slot),
            Err(err) => {
                tracing::warn!(
                    request_id,
                    mentor_id,
                    %err,
                    "Skipping malformed slot on accepted request"
                );
            }
        }
    }

    let locked = slot::merge_slots(sources);
    Ok(Json(DataResponse { data: locked }))
}
