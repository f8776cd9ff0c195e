//! Mentor and user rows.
//!
//! Profile CRUD lives outside the engine; these models exist so the engine
//! can reference parties by id and resolve identities for notifications.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use mentorbook_core::slot::TimeSlot;
use mentorbook_core::types::{DbId, Timestamp};

/// A row from the `mentors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mentor {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub available_slots: Json<Vec<TimeSlot>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a mentor record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMentor {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub available_slots: Vec<TimeSlot>,
}

/// DTO for creating a user record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}
