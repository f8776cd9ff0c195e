//! Route definitions for engagements and the amendment workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{amendments, engagements};
use crate::state::AppState;

/// Engagement-scoped routes, nested under `/engagements`.
///
/// ```text
/// GET    /{id}                                     get_engagement
/// POST   /{id}/cancel                              cancel_engagement
/// GET    /{id}/amendments                          list_amendments
/// POST   /{id}/amendments/unavailable-days         propose_unavailable_days
/// POST   /{id}/amendments/slot-changes             propose_slot_change
/// POST   /{id}/amendments/{amendment_id}/resolve   resolve_amendment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(engagements::get_engagement))
        .route("/{id}/cancel", post(engagements::cancel_engagement))
        .route("/{id}/amendments", get(amendments::list_amendments))
        .route(
            "/{id}/amendments/unavailable-days",
            post(amendments::propose_unavailable_days),
        )
        .route(
            "/{id}/amendments/slot-changes",
            post(amendments::propose_slot_change),
        )
        .route(
            "/{id}/amendments/{amendment_id}/resolve",
            post(amendments::resolve_amendment),
        )
}
