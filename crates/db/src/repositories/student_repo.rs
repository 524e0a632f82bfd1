//! Repository for the `students` table (read-only from the offering flows).

use registrar_core::types::DbId;
use sqlx::PgConnection;

use crate::models::student::Student;

/// Column list for `students` queries.
const COLUMNS: &str = "id, user_id, student_number, first_name, last_name, program_id, \
    year_level, section, created_at";

/// Provides lookups over students.
pub struct StudentRepo;

impl StudentRepo {
    /// Fetch the students with the given IDs. Unknown IDs are skipped.
    pub async fn find_by_ids(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<Student>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Student>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// IDs of every student in a block (program, year level, section).
    pub async fn list_ids_in_block(
        conn: &mut PgConnection,
        program_id: DbId,
        year_level: &str,
        section: &str,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM students \
             WHERE program_id = $1 AND year_level = $2 AND section = $3 \
             ORDER BY id",
        )
        .bind(program_id)
        .bind(year_level)
        .bind(section)
        .fetch_all(conn)
        .await
    }
}
