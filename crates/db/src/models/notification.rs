//! Notification DTO.

use registrar_core::types::DbId;
use serde::Deserialize;

/// DTO for recording a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub kind: String,
    pub recipient_user_id: DbId,
    pub actor_user_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub payload: serde_json::Value,
}
