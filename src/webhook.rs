use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::commands::{self, Command};
use crate::core::{Debt, Transaction};
use crate::extract::ReceiptExtractor;
use crate::normalize::normalize;
use crate::store::SqliteStore;
use crate::telegram::{FileFetcher, Messenger, PhotoSize, Update};

pub struct App {
    pub store: SqliteStore,
    pub extractor: Arc<dyn ReceiptExtractor>,
    pub messenger: Arc<dyn Messenger>,
    pub files: Arc<dyn FileFetcher>,
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/telegram/webhook", post(receive_update))
        .with_state(app)
}

async fn health() -> &'static str {
    "OK"
}

/// Webhook entry point. The body is parsed by hand so that malformed
/// payloads and handler failures alike are acknowledged with a success
/// status; anything else triggers a transport-level retry storm.
async fn receive_update(State(app): State<Arc<App>>, body: Bytes) -> Json<Value> {
    let ack = Json(json!({ "ok": true }));

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(err) => {
            warn!("discarding unparseable update: {err}");
            return ack;
        }
    };

    if let Err(err) = handle_update(&app, &update).await {
        error!("update handling failed: {err:#}");

        // Best-effort notification, only possible once a chat is known.
        if let Some(message) = &update.message {
            let _ = app
                .messenger
                .send_message(message.chat.id, "❌ Error procesando la transacción.")
                .await;
        }
    }

    ack
}

async fn handle_update(app: &App, update: &Update) -> Result<()> {
    let Some(message) = &update.message else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    match (&message.photo, &message.text) {
        (Some(photos), _) if !photos.is_empty() => handle_photo(app, chat_id, photos).await,
        (_, Some(text)) => handle_text(app, chat_id, text).await,
        _ => {
            app.messenger
                .send_message(chat_id, commands::PHOTO_PROMPT)
                .await
        }
    }
}

/// Photo path: fetch → extract → normalize → persist → notify. A
/// download failure stops the pipeline without a record; extraction
/// never fails, it degrades to a flagged placeholder record.
async fn handle_photo(app: &App, chat_id: i64, photos: &[PhotoSize]) -> Result<()> {
    app.messenger
        .send_message(chat_id, "📸 Imagen recibida. Descargando...")
        .await?;

    // Variants are ordered smallest to largest.
    let photo = &photos[photos.len() - 1];
    let image = match app.files.fetch_file(&photo.file_id).await {
        Ok(image) => image,
        Err(err) => {
            warn!("file download failed: {err:#}");
            app.messenger
                .send_message(chat_id, "❌ Error: No se pudo descargar la imagen.")
                .await?;
            return Ok(());
        }
    };

    app.messenger
        .send_message(
            chat_id,
            "🤖 Analizando con IA (esto puede tardar unos segundos)...",
        )
        .await?;

    let outcome = app.extractor.extract(&image).await;
    let origin = outcome.origin();
    let txn = normalize(outcome.into_record(), origin, Utc::now());
    app.store.txns().save(&txn).await?;
    info!("stored transaction {} ({})", txn.id, origin.to_string());

    let mut reply = format!(
        "✅ ¡Listo!\n\n💰 Monto: ${}\n👤 Destino: {}\n🏦 Banco: {}\n📅 Fecha: {}",
        txn.amount,
        txn.recipient,
        txn.bank,
        txn.date.format("%d/%m/%Y"),
    );
    if origin.needs_review() {
        reply.push_str(
            "\n\n⚠️ No se pudo leer el comprobante; se guardaron datos de ejemplo. \
             Revisa la transacción manualmente.",
        );
    }
    app.messenger.send_message(chat_id, &reply).await
}

async fn handle_text(app: &App, chat_id: i64, text: &str) -> Result<()> {
    let command = match commands::parse(text) {
        Ok(command) => command,
        // User input errors notify and mutate nothing.
        Err(err) => {
            return app.messenger.send_message(chat_id, &err.to_string()).await;
        }
    };

    match command {
        Command::Pago { amount, recipient } => {
            let txn = Transaction::manual_payment(&recipient, amount, Utc::now());
            app.store.txns().save(&txn).await?;
            info!("stored manual payment {}", txn.id);

            app.messenger
                .send_message(
                    chat_id,
                    &format!("✅ Pago registrado manualmente.\n\n👤: {recipient}\n💰: ${amount}"),
                )
                .await
        }
        Command::Deuda { amount, name } => {
            let debt = Debt::new(&name, amount, &name, Utc::now());
            app.store.debts().save(&debt).await?;
            info!("stored debt {}", debt.id);

            app.messenger
                .send_message(chat_id, &format!("✅ Deuda de {name} agregada por ${amount}."))
                .await
        }
        Command::Help => app.messenger.send_message(chat_id, commands::HELP_TEXT).await,
        Command::Unknown => {
            app.messenger
                .send_message(chat_id, commands::UNKNOWN_TEXT)
                .await
        }
    }
}
