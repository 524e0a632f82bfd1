//! Repository for the `notifications` table.

use registrar_core::types::DbId;
use sqlx::PgConnection;

use crate::models::notification::CreateNotification;

/// Writes delivered notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Record a notification, returning the generated ID.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateNotification,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications \
                (kind, recipient_user_id, actor_user_id, source_entity_type, source_entity_id, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(&input.kind)
        .bind(input.recipient_user_id)
        .bind(input.actor_user_id)
        .bind(&input.source_entity_type)
        .bind(input.source_entity_id)
        .bind(&input.payload)
        .fetch_one(conn)
        .await
    }
}
