//! Repository for the `mentor_requests` table.

use sqlx::types::Json;
use sqlx::PgPool;

use mentorbook_core::types::DbId;

use crate::models::mentor_request::{CreateMentorRequest, MentorRequest};

/// Column list for mentor_requests queries.
const COLUMNS: &str = "id, mentor_id, user_id, slot, price_cents, payment_status, \
    acceptance_status, created_at, updated_at";

/// Provides CRUD operations for pending booking intents.
pub struct MentorRequestRepo;

impl MentorRequestRepo {
    /// Insert a new request with both statuses `pending`, returning the row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMentorRequest,
    ) -> Result<MentorRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO mentor_requests (mentor_id, user_id, slot, price_cents)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(input.mentor_id)
            .bind(input.user_id)
            .bind(Json(&input.slot))
            .bind(input.price_cents)
            .fetch_one(pool)
            .await
    }

    /// Find a request by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MentorRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM mentor_requests WHERE id = $1");
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record the mentor's acceptance decision.
    ///
    /// Only a request still `pending` transitions; returns `None` when the
    /// request is missing or already decided.
    pub async fn set_acceptance(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<MentorRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE mentor_requests
             SET acceptance_status = $2, updated_at = now()
             WHERE id = $1 AND acceptance_status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// List all requests addressed to a mentor, newest first.
    pub async fn list_for_mentor(
        pool: &PgPool,
        mentor_id: DbId,
    ) -> Result<Vec<MentorRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM mentor_requests
             WHERE mentor_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, MentorRequest>(&query)
            .bind(mentor_id)
            .fetch_all(pool)
            .await
    }

    /// Raw slot payloads of a mentor's accepted requests.
    ///
    /// Returned as untyped JSON so the lock calculator can skip (rather than
    /// fail on) malformed legacy payloads.
    pub async fn list_accepted_slots(
        pool: &PgPool,
        mentor_id: DbId,
    ) -> Result<Vec<(DbId, serde_json::Value)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, serde_json::Value)>(
            "SELECT id, slot FROM mentor_requests
             WHERE mentor_id = $1 AND acceptance_status = 'accepted'
             ORDER BY id",
        )
        .bind(mentor_id)
        .fetch_all(pool)
        .await
    }
}
