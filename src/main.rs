use std::path::Path;
use std::sync::Arc;

use ai_counsellor::config::Settings;
use ai_counsellor::store::LibSqlBackend;
use ai_counsellor::{api, build_state};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = Settings::from_env();
    info!(bind_addr = %settings.bind_addr, db_path = %settings.db_path, "Starting");
    if settings.llm.api_key.is_none() {
        info!("OPENROUTER_API_KEY not set; counsellor chat runs in degraded mode");
    }

    let db = Arc::new(LibSqlBackend::new_local(Path::new(&settings.db_path)).await?);
    let state = build_state(&settings, db)?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;
    Ok(())
}
