//! Repository for the `engagements` table.
//!
//! [`EngagementRepo::create_from_request`] is the booking finalizer's write
//! path. It re-runs the slot-lock check inside the same transaction that
//! creates the engagement and deletes the source request, so a stale
//! availability read taken before the call can never produce a double
//! booking.

use sqlx::types::Json;
use sqlx::PgPool;

use mentorbook_core::slot::{self, TimeSlot};
use mentorbook_core::types::{DbId, Timestamp};

use crate::models::engagement::Engagement;
use crate::models::mentor_request::MentorRequest;

/// Column list for engagements queries.
const COLUMNS: &str = "id, mentor_id, user_id, selected_slot, price_cents, \
    payment_confirmed, is_active, feedback_given, start_date, end_date, \
    created_at, updated_at";

/// Column list for mentor_requests reads inside the finalize transaction.
const REQUEST_COLUMNS: &str = "id, mentor_id, user_id, slot, price_cents, \
    payment_status, acceptance_status, created_at, updated_at";

/// Result of the conditional finalize insert.
#[derive(Debug)]
pub enum FinalizeOutcome {
    /// Engagement created, source request deleted.
    Created(Engagement),
    /// The source request no longer exists (finalized or withdrawn elsewhere).
    RequestMissing,
    /// The requested slot is locked by an in-force engagement or another
    /// accepted request for the same mentor.
    SlotTaken,
}

/// Provides reads and the transactional finalize for engagements.
pub struct EngagementRepo;

impl EngagementRepo {
    /// Find an engagement by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Engagement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM engagements WHERE id = $1");
        sqlx::query_as::<_, Engagement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all engagements for a mentor, newest first.
    pub async fn list_for_mentor(
        pool: &PgPool,
        mentor_id: DbId,
    ) -> Result<Vec<Engagement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM engagements
             WHERE mentor_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Engagement>(&query)
            .bind(mentor_id)
            .fetch_all(pool)
            .await
    }

    /// List all engagements for a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Engagement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM engagements
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Engagement>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Slot lists of a mentor's in-force engagements (active, not yet ended).
    pub async fn list_in_force_slots(
        pool: &PgPool,
        mentor_id: DbId,
    ) -> Result<Vec<Vec<TimeSlot>>, sqlx::Error> {
        let rows: Vec<(Json<Vec<TimeSlot>>,)> = sqlx::query_as(
            "SELECT selected_slot FROM engagements
             WHERE mentor_id = $1
               AND is_active
               AND (end_date IS NULL OR end_date > now())",
        )
        .bind(mentor_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(Json(slots),)| slots).collect())
    }

    /// Convert an accepted request into an engagement, atomically.
    ///
    /// In one transaction: lock the source request row and the mentor row,
    /// recompute the mentor's locked slots from in-force engagements and
    /// other accepted requests, refuse on overlap, insert the engagement
    /// with `payment_confirmed = true`, and hard-delete the request.
    ///
    /// Locking the mentor row serializes concurrent finalizes for the same
    /// mentor, which is what closes the check-then-book race.
    pub async fn create_from_request(
        pool: &PgPool,
        request_id: DbId,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<FinalizeOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let req_query =
            format!("SELECT {REQUEST_COLUMNS} FROM mentor_requests WHERE id = $1 FOR UPDATE");
        let Some(request) = sqlx::query_as::<_, MentorRequest>(&req_query)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(FinalizeOutcome::RequestMissing);
        };

        sqlx::query("SELECT id FROM mentors WHERE id = $1 FOR UPDATE")
            .bind(request.mentor_id)
            .execute(&mut *tx)
            .await?;

        // Locked slots as of this transaction: in-force engagements plus
        // accepted requests other than the one being finalized.
        let engaged: Vec<(Json<Vec<TimeSlot>>,)> = sqlx::query_as(
            "SELECT selected_slot FROM engagements
             WHERE mentor_id = $1
               AND is_active
               AND (end_date IS NULL OR end_date > now())",
        )
        .bind(request.mentor_id)
        .fetch_all(&mut *tx)
        .await?;

        let accepted: Vec<(DbId, serde_json::Value)> = sqlx::query_as(
            "SELECT id, slot FROM mentor_requests
             WHERE mentor_id = $1 AND acceptance_status = 'accepted' AND id <> $2",
        )
        .bind(request.mentor_id)
        .bind(request_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut sources: Vec<TimeSlot> = engaged
            .into_iter()
            .flat_map(|(Json(slots),)| slots)
            .collect();
        for (id, value) in accepted {
            match serde_json::from_value::<TimeSlot>(value) {
                Ok(slot) => sources.push(slot),
                Err(err) => {
                    tracing::warn!(request_id = id, %err, "Skipping malformed request slot");
                }
            }
        }

        let locked = slot::merge_slots(sources);
        if slot::overlaps(&locked, &request.slot.0) {
            tx.rollback().await?;
            return Ok(FinalizeOutcome::SlotTaken);
        }

        let insert_query = format!(
            "INSERT INTO engagements
                (mentor_id, user_id, selected_slot, price_cents, payment_confirmed,
                 is_active, start_date, end_date)
             VALUES ($1, $2, $3, $4, true, true, $5, $6)
             RETURNING {COLUMNS}"
        );
        let engagement = sqlx::query_as::<_, Engagement>(&insert_query)
            .bind(request.mentor_id)
            .bind(request.user_id)
            .bind(Json(vec![request.slot.0.clone()]))
            .bind(request.price_cents)
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM mentor_requests WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(FinalizeOutcome::Created(engagement))
    }

    /// Cancel an engagement, exactly once.
    ///
    /// Returns `None` when the engagement is missing or already inactive;
    /// `is_active` never transitions back to true.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Engagement>, sqlx::Error> {
        let query = format!(
            "UPDATE engagements
             SET is_active = false, updated_at = now()
             WHERE id = $1 AND is_active
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Engagement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
