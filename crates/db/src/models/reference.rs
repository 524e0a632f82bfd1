//! Read-only reference data: courses, teachers, programs.

use registrar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `courses` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub code: String,
    pub title: String,
    pub created_at: Timestamp,
}

/// A row from the `teachers` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Teacher {
    pub id: DbId,
    pub user_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub created_at: Timestamp,
}

/// A row from the `programs` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub created_at: Timestamp,
}
