//! Repository for the `amendments` table.

use sqlx::types::Json;
use sqlx::PgPool;

use mentorbook_core::amendment::{AmendmentKind, APPROVAL_APPROVED};
use mentorbook_core::types::{DbId, Timestamp};

use crate::models::amendment::{Amendment, CreateAmendment};

/// Column list for amendments queries.
const COLUMNS: &str = "id, engagement_id, kind, details, requested_by, requester_id, \
    approval_state, approver_id, resolved_at, created_at, updated_at";

/// Provides append and resolve operations for amendment sub-entries.
pub struct AmendmentRepo;

impl AmendmentRepo {
    /// Append a new proposal with `approval_state = 'pending'`.
    pub async fn create(pool: &PgPool, input: &CreateAmendment) -> Result<Amendment, sqlx::Error> {
        let query = format!(
            "INSERT INTO amendments (engagement_id, kind, details, requested_by, requester_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Amendment>(&query)
            .bind(input.engagement_id)
            .bind(input.kind.as_str())
            .bind(Json(&input.details))
            .bind(&input.requested_by)
            .bind(input.requester_id)
            .fetch_one(pool)
            .await
    }

    /// All amendments of an engagement, in arrival order.
    pub async fn list_for_engagement(
        pool: &PgPool,
        engagement_id: DbId,
    ) -> Result<Vec<Amendment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM amendments
             WHERE engagement_id = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, Amendment>(&query)
            .bind(engagement_id)
            .fetch_all(pool)
            .await
    }

    /// Amendments of one kind for an engagement, in arrival order.
    pub async fn list_for_engagement_kind(
        pool: &PgPool,
        engagement_id: DbId,
        kind: AmendmentKind,
    ) -> Result<Vec<Amendment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM amendments
             WHERE engagement_id = $1 AND kind = $2
             ORDER BY id"
        );
        sqlx::query_as::<_, Amendment>(&query)
            .bind(engagement_id)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Find one amendment scoped by its engagement.
    pub async fn find_by_id(
        pool: &PgPool,
        engagement_id: DbId,
        amendment_id: DbId,
    ) -> Result<Option<Amendment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM amendments WHERE id = $1 AND engagement_id = $2");
        sqlx::query_as::<_, Amendment>(&query)
            .bind(amendment_id)
            .bind(engagement_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a pending amendment, atomically.
    ///
    /// The update only matches a still-pending row, and an approval
    /// additionally requires that no other amendment of the same kind on
    /// this engagement has already been approved (the at-most-one-approved
    /// invariant, enforced at the write). When the decision is an approval
    /// and `new_end_date` is supplied, the engagement's end date moves in
    /// the same transaction.
    ///
    /// Returns `None` when no row matched (missing, already terminal, or
    /// second-approval attempt).
    pub async fn resolve(
        pool: &PgPool,
        engagement_id: DbId,
        amendment_id: DbId,
        decision: &str,
        approver_id: DbId,
        new_end_date: Option<Timestamp>,
    ) -> Result<Option<Amendment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE amendments
             SET approval_state = $3, approver_id = $4, resolved_at = now(), updated_at = now()
             WHERE id = $2
               AND engagement_id = $1
               AND approval_state = 'pending'
               AND ($3 <> 'approved' OR NOT EXISTS (
                   SELECT 1 FROM amendments prior
                   WHERE prior.engagement_id = $1
                     AND prior.kind = amendments.kind
                     AND prior.approval_state = 'approved'))
             RETURNING {COLUMNS}"
        );
        let resolved = sqlx::query_as::<_, Amendment>(&query)
            .bind(engagement_id)
            .bind(amendment_id)
            .bind(decision)
            .bind(approver_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(amendment) = resolved else {
            tx.rollback().await?;
            return Ok(None);
        };

        if decision == APPROVAL_APPROVED {
            if let Some(end_date) = new_end_date {
                sqlx::query(
                    "UPDATE engagements SET end_date = $2, updated_at = now() WHERE id = $1",
                )
                .bind(engagement_id)
                .bind(end_date)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(amendment))
    }
}
