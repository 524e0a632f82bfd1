//! Lookups over reference data: courses, teachers, programs.

use registrar_core::types::DbId;
use sqlx::PgConnection;

use crate::models::reference::{Course, Program, Teacher};

/// Provides lookups over courses.
pub struct CourseRepo;

impl CourseRepo {
    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>("SELECT id, code, title, created_at FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}

/// Provides lookups over teachers.
pub struct TeacherRepo;

impl TeacherRepo {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Teacher>, sqlx::Error> {
        sqlx::query_as::<_, Teacher>(
            "SELECT id, user_id, first_name, last_name, created_at FROM teachers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }
}

/// Provides lookups over programs.
pub struct ProgramRepo;

impl ProgramRepo {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Program>, sqlx::Error> {
        sqlx::query_as::<_, Program>("SELECT id, code, name, created_at FROM programs WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
