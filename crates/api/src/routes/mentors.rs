//! Mentor- and user-scoped read routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::{availability, engagements, requests};
use crate::state::AppState;

/// Mentor-scoped routes, nested under `/mentors`.
///
/// ```text
/// GET    /{mentor_id}/requests        list_requests_for_mentor
/// GET    /{mentor_id}/locked-slots    locked_slots
/// GET    /{mentor_id}/engagements     list_for_mentor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{mentor_id}/requests", get(requests::list_requests_for_mentor))
        .route("/{mentor_id}/locked-slots", get(availability::locked_slots))
        .route("/{mentor_id}/engagements", get(engagements::list_for_mentor))
}

/// User-scoped routes, nested under `/users`.
///
/// ```text
/// GET    /{user_id}/engagements       list_for_user
/// ```
pub fn users_router() -> Router<AppState> {
    Router::new().route("/{user_id}/engagements", get(engagements::list_for_user))
}
