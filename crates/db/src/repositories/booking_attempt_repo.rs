//! Repository for the `booking_attempts` idempotency ledger.

use sqlx::PgPool;

use mentorbook_core::types::DbId;

use crate::models::booking_attempt::BookingAttempt;

/// Column list for booking_attempts queries.
const COLUMNS: &str = "id, idempotency_key, request_id, engagement_id, charge_id, \
    status, created_at, updated_at";

/// Provides the idempotency-key ledger used by booking finalization.
pub struct BookingAttemptRepo;

impl BookingAttemptRepo {
    /// Find an attempt by its idempotency key.
    pub async fn find_by_key(
        pool: &PgPool,
        idempotency_key: &str,
    ) -> Result<Option<BookingAttempt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM booking_attempts WHERE idempotency_key = $1");
        sqlx::query_as::<_, BookingAttempt>(&query)
            .bind(idempotency_key)
            .fetch_optional(pool)
            .await
    }

    /// Claim a key for a new attempt.
    ///
    /// `ON CONFLICT DO NOTHING` makes this safe under concurrent retries:
    /// exactly one caller gets `Some`, everyone else must consult the
    /// existing row via [`find_by_key`](Self::find_by_key).
    pub async fn begin(
        pool: &PgPool,
        idempotency_key: &str,
        request_id: DbId,
    ) -> Result<Option<BookingAttempt>, sqlx::Error> {
        let query = format!(
            "INSERT INTO booking_attempts (idempotency_key, request_id)
             VALUES ($1, $2)
             ON CONFLICT (idempotency_key) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingAttempt>(&query)
            .bind(idempotency_key)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Re-open a previously failed attempt for a retry with the same key.
    pub async fn reopen_failed(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BookingAttempt>, sqlx::Error> {
        let query = format!(
            "UPDATE booking_attempts
             SET status = 'started', updated_at = now()
             WHERE id = $1 AND status = 'failed'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingAttempt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful gateway charge.
    pub async fn mark_charged(
        pool: &PgPool,
        id: DbId,
        charge_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE booking_attempts
             SET status = 'charged', charge_id = $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(charge_id)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Record the engagement produced by this attempt.
    pub async fn mark_finalized(
        pool: &PgPool,
        id: DbId,
        engagement_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE booking_attempts
             SET status = 'finalized', engagement_id = $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(engagement_id)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Record a gateway failure; the key stays retryable.
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE booking_attempts
             SET status = 'failed', updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
    }
}
