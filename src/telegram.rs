use anyhow::{anyhow, Context, Result};
use axum::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Inbound bot-platform update. Only the fields the pipeline reads are
/// modeled; everything else in the payload is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub chat: Chat,
    /// Progressively larger variants of the same photo; the last entry
    /// is the largest.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a text message to the chat. No retries on failure.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Resolves an opaque file handle to a download path, then fetches
    /// the raw bytes.
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>>;
}

pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, token: &str, api_base: &str) -> Self {
        Self {
            http,
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.http
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .context("sendMessage request failed")?
            .error_for_status()
            .context("sendMessage rejected")?;

        Ok(())
    }
}

#[async_trait]
impl FileFetcher for TelegramClient {
    async fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let info: GetFileResponse = self
            .http
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .context("getFile request failed")?
            .error_for_status()?
            .json()
            .await?;

        if !info.ok {
            return Err(anyhow!("getFile returned ok=false for {file_id}"));
        }
        let path = info
            .result
            .and_then(|f| f.file_path)
            .ok_or_else(|| anyhow!("getFile returned no file path"))?;

        debug!("downloading {path}");
        let bytes = self
            .http
            .get(format!("{}/file/bot{}/{}", self.api_base, self.token, path))
            .send()
            .await
            .context("file download failed")?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct GetFileResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    result: Option<FileInfo>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(default)]
    file_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_photo_update() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 5,
                "chat": { "id": 42, "type": "private" },
                "photo": [
                    { "file_id": "small", "width": 90, "height": 90 },
                    { "file_id": "large", "width": 800, "height": 800 }
                ]
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        let photos = message.photo.unwrap();
        assert_eq!(photos.last().unwrap().file_id, "large");
        assert_eq!(message.text, None);
    }

    #[test]
    fn deserializes_text_update() {
        let update: Update = serde_json::from_value(json!({
            "message": {
                "chat": { "id": 7 },
                "text": "/pago 5000 Rodrigo"
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(message.text.as_deref(), Some("/pago 5000 Rodrigo"));
        assert!(message.photo.is_none());
    }

    #[test]
    fn update_without_message_is_accepted() {
        let update: Update = serde_json::from_value(json!({ "update_id": 11 })).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn builds_method_urls_with_token() {
        let client = TelegramClient::new(
            reqwest::Client::new(),
            "123:abc",
            "https://api.telegram.org/",
        );

        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
