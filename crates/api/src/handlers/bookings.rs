//! Booking finalization: payment capture plus conditional engagement insert.
//!
//! The two-step "check availability, then book" sequence is not trusted
//! here: the engagement insert re-runs the slot-lock check in the same
//! transaction (see `EngagementRepo::create_from_request`), so a stale
//! availability read cannot double-book a mentor.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use mentorbook_core::booking::{self, ACCEPTANCE_ACCEPTED};
use mentorbook_core::error::CoreError;
use mentorbook_core::types::DbId;
use mentorbook_db::models::booking_attempt::{BookingAttempt, ATTEMPT_FAILED};
use mentorbook_db::models::engagement::Engagement;
use mentorbook_db::repositories::{
    BookingAttemptRepo, EngagementRepo, FinalizeOutcome, MentorRequestRepo,
};
use mentorbook_events::{bus, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::payments::ChargeStatus;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for booking finalization.
#[derive(Debug, Deserialize)]
pub struct FinalizeBookingRequest {
    /// Caller-generated key; retries of the same logical booking reuse it.
    pub idempotency_key: String,
    pub amount_cents: i64,
    pub payer_email: String,
}

/// POST /api/v1/requests/{id}/finalize
///
/// Charge the payment gateway (at most once per idempotency key) and, on
/// success, convert the accepted request into an engagement and delete the
/// request. A replayed key whose attempt already produced an engagement
/// returns that engagement without calling the gateway again.
pub async fn finalize_booking(
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<FinalizeBookingRequest>,
) -> AppResult<impl IntoResponse> {
    if input.idempotency_key.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "idempotency_key is required".to_string(),
        )));
    }
    if input.payer_email.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "payer_email is required".to_string(),
        )));
    }
    if input.amount_cents <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "amount_cents must be positive".to_string(),
        )));
    }

    // Replay / in-flight handling for this idempotency key. A key is bound
    // to the request it first named; replays against any other request are
    // conflicts, even after the attempt finalized.
    let existing = BookingAttemptRepo::find_by_key(&state.pool, &input.idempotency_key).await?;
    if let Some(existing) = &existing {
        if existing.request_id != request_id {
            return Err(AppError::Core(CoreError::Conflict(
                "idempotency key was already used for a different request".to_string(),
            )));
        }
        if let Some(engagement_id) = existing.engagement_id {
            return replay_finalized(&state, engagement_id).await;
        }
        if existing.status != ATTEMPT_FAILED {
            return Err(AppError::Core(CoreError::Conflict(
                "a booking attempt with this idempotency key is in progress".to_string(),
            )));
        }
    }

    // Preconditions are checked before the ledger claim; a rejected call
    // leaves the key free for a later retry.
    let request = MentorRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MentorRequest",
            id: request_id,
        }))?;

    if request.acceptance_status != ACCEPTANCE_ACCEPTED {
        return Err(AppError::Core(CoreError::Conflict(
            "request has not been accepted by the mentor".to_string(),
        )));
    }

    let attempt = match existing {
        Some(failed) => BookingAttemptRepo::reopen_failed(&state.pool, failed.id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "booking attempt is already being retried".to_string(),
                ))
            })?,
        None => claim_attempt(&state, request_id, &input.idempotency_key).await?,
    };

    // The only external synchronous dependency in the engine.
    let outcome = state
        .payment_gateway
        .charge(input.amount_cents, &input.payer_email, &input.idempotency_key)
        .await;

    let charge = match outcome {
        Ok(charge) => charge,
        Err(err) => {
            BookingAttemptRepo::mark_failed(&state.pool, attempt.id).await?;
            tracing::warn!(request_id, %err, "Payment gateway call failed");
            return Err(AppError::Core(CoreError::Payment(err.to_string())));
        }
    };

    match charge.status {
        ChargeStatus::Succeeded => {}
        ChargeStatus::RequiresAction | ChargeStatus::Failed => {
            BookingAttemptRepo::mark_failed(&state.pool, attempt.id).await?;
            tracing::warn!(
                request_id,
                charge_id = %charge.id,
                status = ?charge.status,
                "Payment not completed"
            );
            return Err(AppError::Core(CoreError::Payment(format!(
                "payment was not completed (charge {})",
                charge.id
            ))));
        }
    }

    BookingAttemptRepo::mark_charged(&state.pool, attempt.id, &charge.id).await?;

    let start_date = Utc::now();
    let end_date = booking::compute_end_date(start_date, state.config.engagement_period_days);

    let engagement =
        match EngagementRepo::create_from_request(&state.pool, request_id, start_date, end_date)
            .await?
        {
            FinalizeOutcome::Created(engagement) => engagement,
            FinalizeOutcome::RequestMissing => {
                // Charged, but the request was finalized or withdrawn under a
                // different key. Needs operator reconciliation.
                tracing::error!(
                    request_id,
                    charge_id = %charge.id,
                    "Charge succeeded but the request no longer exists"
                );
                return Err(AppError::Core(CoreError::Conflict(
                    "request was already finalized or withdrawn".to_string(),
                )));
            }
            FinalizeOutcome::SlotTaken => {
                tracing::error!(
                    request_id,
                    charge_id = %charge.id,
                    "Charge succeeded but the slot is no longer available"
                );
                return Err(AppError::Core(CoreError::Conflict(
                    "the requested slot is no longer available".to_string(),
                )));
            }
        };

    BookingAttemptRepo::mark_finalized(&state.pool, attempt.id, engagement.id).await?;

    tracing::info!(
        engagement_id = engagement.id,
        mentor_id = engagement.mentor_id,
        user_id = engagement.user_id,
        charge_id = %charge.id,
        "Booking finalized"
    );

    let event = DomainEvent::new(bus::BOOKING_FINALIZED)
        .with_source("engagement", engagement.id)
        .with_actor(engagement.user_id)
        .with_payload(serde_json::json!({
            "mentor_id": engagement.mentor_id,
            "charge_id": charge.id,
            "end_date": engagement.end_date,
        }));
    state.event_bus.publish(event);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: engagement }),
    ))
}

/// Return the engagement a replayed idempotency key already produced.
async fn replay_finalized(
    state: &AppState,
    engagement_id: DbId,
) -> AppResult<(StatusCode, Json<DataResponse<Engagement>>)> {
    let engagement = EngagementRepo::find_by_id(&state.pool, engagement_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Engagement",
            id: engagement_id,
        }))?;
    Ok((StatusCode::OK, Json(DataResponse { data: engagement })))
}

/// Claim a fresh attempt row, coping with a concurrent claim on the same key.
async fn claim_attempt(
    state: &AppState,
    request_id: DbId,
    idempotency_key: &str,
) -> AppResult<BookingAttempt> {
    BookingAttemptRepo::begin(&state.pool, idempotency_key, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "a booking attempt with this idempotency key is in progress".to_string(),
            ))
        })
}
