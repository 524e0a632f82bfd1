use std::sync::Arc;

use anyhow::Context;
use registrar_events::{EventBus, NotificationPersistence};
use registrar_offerings::command::{handle_line, CommandReply};
use registrar_offerings::store::PgStoreProvider;
use registrar_offerings::{AssignmentOrchestrator, OfferingConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Reads one JSON command per stdin line, runs it, and writes one JSON reply
/// per line to stdout. Every notification the flows emit is persisted before
/// the process exits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries replies.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "registrar_offerings=debug,registrar_events=debug,registrar_db=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let config = OfferingConfig::from_env();

    tracing::info!("Connecting to database");
    let pool = registrar_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    registrar_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    registrar_db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let bus = Arc::new(EventBus::default());
    let persistence = tokio::spawn(NotificationPersistence::run(pool.clone(), bus.subscribe()));
    let orchestrator =
        AssignmentOrchestrator::new(PgStoreProvider::new(pool), bus.clone(), &config);
    tracing::info!(?config, "Offering service ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = handle_line(&orchestrator, &line).await;
        if let CommandReply::Error { kind, message } = &reply {
            tracing::warn!(kind, %message, "Command failed");
        }
        let mut out = serde_json::to_vec(&reply).context("Failed to encode reply")?;
        out.push(b'\n');
        stdout.write_all(&out).await.context("Failed to write reply")?;
        stdout.flush().await.context("Failed to write reply")?;
    }
    tracing::info!("Input closed");

    // Dropping every sender closes the channel and ends the persistence loop
    // once it has drained.
    drop(orchestrator);
    drop(bus);
    persistence.await.context("Notification persistence task panicked")?;

    tracing::info!("Offering service stopped");
    Ok(())
}
