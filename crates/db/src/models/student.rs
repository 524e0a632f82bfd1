//! Student entity model.

use registrar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `students` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub user_id: DbId,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub program_id: DbId,
    pub year_level: String,
    pub section: String,
    pub created_at: Timestamp,
}
