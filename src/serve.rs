use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::extract::GeminiExtractor;
use crate::settings::Settings;
use crate::store::SqliteStore;
use crate::telegram::TelegramClient;
use crate::webhook::{self, App};

pub(crate) async fn run(settings: Settings) -> Result<()> {
    let store = SqliteStore::open_file(&settings.db_file).await?;

    let timeout = Duration::from_secs(settings.gemini.timeout_secs);
    let http = reqwest::Client::builder().timeout(timeout).build()?;

    let telegram = Arc::new(TelegramClient::new(
        http.clone(),
        &settings.telegram.token,
        &settings.telegram.api_base,
    ));
    let extractor = Arc::new(GeminiExtractor::new(
        http,
        settings.gemini.api_key.clone(),
        &settings.gemini.model,
        &settings.gemini.api_base,
        timeout,
    ));

    if settings.gemini.api_key.is_none() {
        info!("no gemini.api_key configured, running in demo mode");
    }

    let app = Arc::new(App {
        store,
        extractor,
        messenger: telegram.clone(),
        files: telegram,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("webhook server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, webhook::router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
