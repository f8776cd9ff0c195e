pub mod engagements;
pub mod health;
pub mod mentors;
pub mod requests;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /requests                                        submit (POST)
/// /requests/{id}                                   get
/// /requests/{id}/accept                            mentor accepts (POST)
/// /requests/{id}/reject                            mentor rejects (POST)
/// /requests/{id}/finalize                          finalize booking (POST)
///
/// /mentors/{mentor_id}/requests                    mentor's request inbox
/// /mentors/{mentor_id}/locked-slots                slot lock calculator
/// /mentors/{mentor_id}/engagements                 engagements by mentor
///
/// /users/{user_id}/engagements                     engagements by user
///
/// /engagements/{id}                                detail incl. amendments
/// /engagements/{id}/cancel                         cancel (POST)
/// /engagements/{id}/amendments                     list
/// /engagements/{id}/amendments/unavailable-days    propose (POST)
/// /engagements/{id}/amendments/slot-changes        propose (POST)
/// /engagements/{id}/amendments/{aid}/resolve       approve/reject (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests::router())
        .nest("/mentors", mentors::router())
        .nest("/users", mentors::users_router())
        .nest("/engagements", engagements::router())
}
