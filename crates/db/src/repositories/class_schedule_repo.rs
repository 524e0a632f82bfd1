//! Repository for the `class_schedules` table.

use registrar_core::types::DbId;
use sqlx::PgConnection;

use crate::models::class_schedule::{ClassSchedule, CreateClassSchedule, UpdateClassSchedule};

/// Column list for `class_schedules` queries.
const COLUMNS: &str =
    "id, course_offering_id, day, start_time, end_time, room, created_at, updated_at";

/// Provides CRUD operations for weekly schedule rows.
pub struct ClassScheduleRepo;

impl ClassScheduleRepo {
    /// List the schedule rows of an offering ordered by day.
    pub async fn list_for_offering(
        conn: &mut PgConnection,
        course_offering_id: DbId,
    ) -> Result<Vec<ClassSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM class_schedules \
             WHERE course_offering_id = $1 \
             ORDER BY day, id"
        );
        sqlx::query_as::<_, ClassSchedule>(&query)
            .bind(course_offering_id)
            .fetch_all(conn)
            .await
    }

    /// Insert a schedule row, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateClassSchedule,
    ) -> Result<ClassSchedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO class_schedules (course_offering_id, day, start_time, end_time, room) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSchedule>(&query)
            .bind(input.course_offering_id)
            .bind(input.day)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.room)
            .fetch_one(conn)
            .await
    }

    /// Rewrite the room and times of a schedule row in place.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateClassSchedule,
    ) -> Result<Option<ClassSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE class_schedules SET \
                start_time = $2, \
                end_time = $3, \
                room = $4, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSchedule>(&query)
            .bind(id)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.room)
            .fetch_optional(conn)
            .await
    }

    /// Delete a schedule row. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM class_schedules WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every schedule row of an offering, returning the count removed.
    pub async fn delete_for_offering(
        conn: &mut PgConnection,
        course_offering_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM class_schedules WHERE course_offering_id = $1")
            .bind(course_offering_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
