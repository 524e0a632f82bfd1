//! Repository for the `course_offerings` table.

use registrar_core::types::DbId;
use sqlx::PgConnection;

use crate::models::course_offering::{CourseOffering, CreateCourseOffering, UpdateCourseOffering};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, code, course_id, teacher_id, program_id, semester, school_year, \
    units, offering_type, created_at, updated_at";

/// Provides CRUD operations for course offerings.
pub struct CourseOfferingRepo;

impl CourseOfferingRepo {
    /// Insert a new offering, returning the created row.
    ///
    /// Fails with a unique violation on `uq_course_offerings_code` if the
    /// code is already taken.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateCourseOffering,
    ) -> Result<CourseOffering, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_offerings \
                (code, course_id, teacher_id, program_id, semester, school_year, units, offering_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseOffering>(&query)
            .bind(&input.code)
            .bind(input.course_id)
            .bind(input.teacher_id)
            .bind(input.program_id)
            .bind(&input.semester)
            .bind(&input.school_year)
            .bind(input.units)
            .bind(&input.offering_type)
            .fetch_one(conn)
            .await
    }

    /// Find an offering by its internal ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CourseOffering>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_offerings WHERE id = $1");
        sqlx::query_as::<_, CourseOffering>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find an offering and take a row lock on it until the transaction ends.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CourseOffering>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_offerings WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, CourseOffering>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Check whether any offering already uses `code`.
    pub async fn code_exists(conn: &mut PgConnection, code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM course_offerings WHERE code = $1)")
            .bind(code)
            .fetch_one(conn)
            .await
    }

    /// Update every mutable field of an offering.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateCourseOffering,
    ) -> Result<Option<CourseOffering>, sqlx::Error> {
        let query = format!(
            "UPDATE course_offerings SET \
                course_id = $2, \
                teacher_id = $3, \
                program_id = $4, \
                semester = $5, \
                school_year = $6, \
                units = $7, \
                offering_type = $8, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseOffering>(&query)
            .bind(id)
            .bind(input.course_id)
            .bind(input.teacher_id)
            .bind(input.program_id)
            .bind(&input.semester)
            .bind(&input.school_year)
            .bind(input.units)
            .bind(&input.offering_type)
            .fetch_optional(conn)
            .await
    }

    /// Permanently delete an offering by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_offerings WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
