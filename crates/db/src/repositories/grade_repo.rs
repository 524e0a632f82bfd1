//! Repository for the `grades` table.

use registrar_core::types::DbId;
use sqlx::PgConnection;

use crate::models::grade::Grade;

/// Column list for `grades` queries.
const COLUMNS: &str = "id, course_offering_id, student_id, prelim_score, midterm_score, \
    prefinal_score, final_score, created_at, updated_at";

/// Provides enrollment operations over grade rows.
pub struct GradeRepo;

impl GradeRepo {
    /// List the grade rows of an offering ordered by student.
    pub async fn list_for_offering(
        conn: &mut PgConnection,
        course_offering_id: DbId,
    ) -> Result<Vec<Grade>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM grades \
             WHERE course_offering_id = $1 \
             ORDER BY student_id"
        );
        sqlx::query_as::<_, Grade>(&query)
            .bind(course_offering_id)
            .fetch_all(conn)
            .await
    }

    /// Enroll a student by inserting a grade row with every score null.
    pub async fn create_blank(
        conn: &mut PgConnection,
        course_offering_id: DbId,
        student_id: DbId,
    ) -> Result<Grade, sqlx::Error> {
        let query = format!(
            "INSERT INTO grades (course_offering_id, student_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Grade>(&query)
            .bind(course_offering_id)
            .bind(student_id)
            .fetch_one(conn)
            .await
    }

    /// Drop a student from an offering. Returns `true` if a row was removed.
    pub async fn delete_for_student(
        conn: &mut PgConnection,
        course_offering_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM grades WHERE course_offering_id = $1 AND student_id = $2")
                .bind(course_offering_id)
                .bind(student_id)
                .execute(conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every grade row of an offering, returning the count removed.
    pub async fn delete_for_offering(
        conn: &mut PgConnection,
        course_offering_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM grades WHERE course_offering_id = $1")
            .bind(course_offering_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
