//! Line-oriented offering commands.
//!
//! Each input line is one JSON [`OfferingCommand`] tagged by `op`; each is
//! answered by one JSON [`CommandReply`] line. Used by the
//! `registrar-offerings` binary.

use registrar_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::orchestrator::{AssignmentOrchestrator, CreateOfferingRequest, UpdateOfferingRequest};
use crate::store::StoreProvider;

/// One request to the offering flows.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OfferingCommand {
    Create(CreateOfferingRequest),
    Update(UpdateOfferingRequest),
    Delete { offering_id: DbId, actor_user_id: DbId },
    Get { offering_id: DbId },
}

/// Outcome of one command.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandReply {
    Ok { result: Value },
    Error { kind: &'static str, message: String },
}

impl CommandReply {
    fn error(kind: &'static str, message: impl ToString) -> Self {
        Self::Error {
            kind,
            message: message.to_string(),
        }
    }
}

/// Parse and run a single command line.
pub async fn handle_line<P: StoreProvider>(
    orchestrator: &AssignmentOrchestrator<P>,
    line: &str,
) -> CommandReply {
    let command: OfferingCommand = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => return CommandReply::error("parse", e),
    };

    let result = match command {
        OfferingCommand::Create(request) => orchestrator
            .create(request)
            .await
            .map(serde_json::to_value),
        OfferingCommand::Update(request) => orchestrator
            .update(request)
            .await
            .map(serde_json::to_value),
        OfferingCommand::Delete {
            offering_id,
            actor_user_id,
        } => orchestrator
            .delete(offering_id, actor_user_id)
            .await
            .map(|()| Ok(serde_json::json!({ "deleted": offering_id }))),
        OfferingCommand::Get { offering_id } => orchestrator
            .get(offering_id)
            .await
            .map(serde_json::to_value),
    };

    match result {
        Ok(Ok(result)) => CommandReply::Ok { result },
        Ok(Err(e)) => CommandReply::error("internal", e),
        Err(e) if e.is_not_found() => CommandReply::error("not_found", e),
        Err(e) if e.is_validation() => CommandReply::error("validation", e),
        Err(e) => CommandReply::error("failed", e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use registrar_events::EventBus;

    use super::*;
    use crate::config::OfferingConfig;
    use crate::store::MemoryStoreProvider;

    async fn orchestrator() -> (AssignmentOrchestrator<MemoryStoreProvider>, serde_json::Value) {
        let provider = MemoryStoreProvider::new();
        let program_id = provider.add_program("BSCS", "Computer Science").await;
        let course_id = provider.add_course("CS101", "Intro").await;
        let teacher_id = provider.add_teacher(900, "Ada", "Reyes").await;
        let form = serde_json::json!({
            "course_id": course_id,
            "teacher_id": teacher_id,
            "program_id": program_id,
            "semester": "1st",
            "school_year": "2025-2026",
            "units": 3,
            "offering_type": "lab",
            "code": null,
        });
        let orchestrator = AssignmentOrchestrator::new(
            provider,
            Arc::new(EventBus::default()),
            &OfferingConfig::default(),
        );
        (orchestrator, form)
    }

    #[tokio::test]
    async fn create_then_get() {
        let (orchestrator, form) = orchestrator().await;
        let line = serde_json::json!({ "op": "create", "actor_user_id": 1, "offering": form });

        let reply = handle_line(&orchestrator, &line.to_string()).await;
        let created = assert_matches!(reply, CommandReply::Ok { result } => result);
        let id = created["offering"]["id"].as_i64().unwrap();
        assert_eq!(created["offering"]["offering_type"], "lab");

        let line = format!(r#"{{"op":"get","offering_id":{id}}}"#);
        let reply = handle_line(&orchestrator, &line).await;
        let detail = assert_matches!(reply, CommandReply::Ok { result } => result);
        assert_eq!(detail["offering"]["code"], created["offering"]["code"]);
    }

    #[tokio::test]
    async fn failures_are_classified() {
        let (orchestrator, _) = orchestrator().await;

        let reply = handle_line(&orchestrator, "not json").await;
        assert_matches!(reply, CommandReply::Error { kind: "parse", .. });

        let line = r#"{"op":"delete","offering_id":7,"actor_user_id":1}"#;
        let reply = handle_line(&orchestrator, line).await;
        assert_matches!(reply, CommandReply::Error { kind: "not_found", .. });

        let line = r#"{"op":"create","actor_user_id":1,"offering":{"units":0,"offering_type":""}}"#;
        let reply = handle_line(&orchestrator, line).await;
        assert_matches!(reply, CommandReply::Error { kind: "validation", .. });
    }
}
