//! Course offering entity model and DTOs.

use registrar_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `course_offerings` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CourseOffering {
    pub id: DbId,
    pub code: String,
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub program_id: DbId,
    pub semester: String,
    pub school_year: String,
    pub units: i16,
    pub offering_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new offering. The code is already resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseOffering {
    pub code: String,
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub program_id: DbId,
    pub semester: String,
    pub school_year: String,
    pub units: i16,
    pub offering_type: String,
}

/// DTO for updating an offering. The code is immutable and absent here.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourseOffering {
    pub course_id: DbId,
    pub teacher_id: DbId,
    pub program_id: DbId,
    pub semester: String,
    pub school_year: String,
    pub units: i16,
    pub offering_type: String,
}
