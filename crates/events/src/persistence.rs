//! Durable notification persistence service.
//!
//! [`NotificationPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`PlatformEvent`] to the
//! `notifications` table. It runs as a long-lived background task and shuts
//! down when the bus sender is dropped.

use registrar_core::types::DbId;
use registrar_db::models::notification::CreateNotification;
use registrar_db::repositories::NotificationRepo;
use registrar_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background service that persists notifications to the database.
pub struct NotificationPersistence;

impl NotificationPersistence {
    /// Run the persistence loop.
    ///
    /// Persists every event received on `receiver`. The loop exits when the
    /// channel is closed (i.e. the [`EventBus`](crate::bus::EventBus) is
    /// dropped). Persistence errors are logged and never stop the loop.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => match Self::persist(&pool, &event).await {
                    Ok(Some(id)) => {
                        tracing::debug!(notification_id = id, kind = %event.kind, "Notification stored");
                    }
                    Ok(None) => {
                        tracing::warn!(kind = %event.kind, "Notification has no recipient, dropped");
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            kind = %event.kind,
                            "Failed to persist notification"
                        );
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification persistence lagged, some notifications were not stored"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `notifications` table.
    ///
    /// Returns `Ok(None)` when the event has neither a target nor an actor.
    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<Option<DbId>, sqlx::Error> {
        let Some(input) = to_notification(event) else {
            return Ok(None);
        };
        let mut conn = pool.acquire().await?;
        NotificationRepo::create(&mut conn, &input).await.map(Some)
    }
}

/// Map an event onto a notification row addressed to its recipient.
fn to_notification(event: &PlatformEvent) -> Option<CreateNotification> {
    Some(CreateNotification {
        kind: event.kind.as_str().to_string(),
        recipient_user_id: event.recipient()?,
        actor_user_id: event.actor_user_id,
        source_entity_type: event.source_entity_type.clone(),
        source_entity_id: event.source_entity_id,
        payload: event.payload.clone(),
    })
}
