//! Repositories for the `mentors` and `users` tables.
//!
//! The engine treats these as identity-resolution lookups; profile
//! management proper lives outside this service.

use sqlx::types::Json;
use sqlx::PgPool;

use mentorbook_core::types::DbId;

use crate::models::participant::{CreateMentor, CreateUser, Mentor, User};

/// Column list for mentors queries.
const MENTOR_COLUMNS: &str = "id, name, email, available_slots, created_at, updated_at";

/// Column list for users queries.
const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

/// Provides lookups (and bootstrap inserts) for mentor records.
pub struct MentorRepo;

impl MentorRepo {
    /// Insert a new mentor, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMentor) -> Result<Mentor, sqlx::Error> {
        let query = format!(
            "INSERT INTO mentors (name, email, available_slots)
             VALUES ($1, $2, $3)
             RETURNING {MENTOR_COLUMNS}"
        );
        sqlx::query_as::<_, Mentor>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(Json(&input.available_slots))
            .fetch_one(pool)
            .await
    }

    /// Find a mentor by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Mentor>, sqlx::Error> {
        let query = format!("SELECT {MENTOR_COLUMNS} FROM mentors WHERE id = $1");
        sqlx::query_as::<_, Mentor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides lookups (and bootstrap inserts) for user records.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email)
             VALUES ($1, $2)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
