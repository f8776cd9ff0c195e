//! Route definitions for request intake and booking finalization.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{bookings, requests};
use crate::state::AppState;

/// Request-scoped routes, nested under `/requests`.
///
/// ```text
/// POST   /                submit_request
/// GET    /{id}            get_request
/// POST   /{id}/accept     accept_request
/// POST   /{id}/reject     reject_request
/// POST   /{id}/finalize   finalize_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(requests::submit_request))
        .route("/{id}", get(requests::get_request))
        .route("/{id}/accept", post(requests::accept_request))
        .route("/{id}/reject", post(requests::reject_request))
        .route("/{id}/finalize", post(bookings::finalize_booking))
}
