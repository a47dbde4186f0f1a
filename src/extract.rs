use std::time::Duration;

use axum::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ulid::Ulid;

use crate::core::Origin;

/// Instruction sent with every receipt image. The model is told to
/// answer with raw JSON, but replies still show up fenced often enough
/// that the response is scrubbed before parsing.
const PROMPT: &str = "Extrae los detalles de la transferencia de esta imagen. \
    Devuelve estrictamente un JSON válido con las claves: recipient, bank, \
    accountType, accountNumber, date (ISO string), time, transactionCode, \
    amount (number). Si falta un campo, usa null. \
    NO incluyas formato markdown como ```json. Solo devuelve la cadena JSON cruda.";

/// Best-effort field set read off a receipt. Every key is present in
/// the model's reply, each value either well-typed or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    pub recipient: Option<String>,
    pub bank: Option<String>,
    #[serde(rename = "accountType")]
    pub account_type: Option<String>,
    #[serde(rename = "accountNumber")]
    pub account_number: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "transactionCode")]
    pub transaction_code: Option<String>,
    pub amount: Option<f64>,
}

/// Outcome of a receipt extraction. The non-success arms still carry a
/// canned record because the pipeline persists placeholder data rather
/// than failing; the tag lets callers flag those rows for review
/// instead of guessing from sentinel strings.
#[derive(Debug, Clone)]
pub enum Extraction {
    Extracted(RawExtraction),
    /// No model credential configured; demo mode, not an error.
    ConfigAbsent(RawExtraction),
    Fallback { reason: String, record: RawExtraction },
}

impl Extraction {
    pub fn origin(&self) -> Origin {
        match self {
            Extraction::Extracted(_) => Origin::Vision,
            Extraction::ConfigAbsent(_) => Origin::Demo,
            Extraction::Fallback { .. } => Origin::Fallback,
        }
    }

    pub fn into_record(self) -> RawExtraction {
        match self {
            Extraction::Extracted(r) => r,
            Extraction::ConfigAbsent(r) => r,
            Extraction::Fallback { record, .. } => record,
        }
    }
}

#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    /// Never fails: credential or upstream problems degrade to the
    /// demo or fallback record instead of raising to the caller.
    async fn extract(&self, image: &[u8]) -> Extraction;
}

pub struct GeminiExtractor {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl GeminiExtractor {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        model: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_key,
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn call(&self, key: &str, image: &[u8]) -> anyhow::Result<RawExtraction> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: PROMPT.to_string(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: "image/jpeg".to_string(),
                            data: BASE64.encode(image),
                        },
                    },
                ],
            }],
        };

        let response: GenerateContentResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow::anyhow!("model returned no candidates"))?;

        parse_model_response(&text)
    }
}

#[async_trait]
impl ReceiptExtractor for GeminiExtractor {
    async fn extract(&self, image: &[u8]) -> Extraction {
        let Some(key) = self.api_key.clone() else {
            info!("no model credential configured, returning demo record");
            return Extraction::ConfigAbsent(demo_record());
        };

        match tokio::time::timeout(self.timeout, self.call(&key, image)).await {
            Ok(Ok(record)) => Extraction::Extracted(record),
            Ok(Err(err)) => {
                warn!("extraction failed, returning fallback record: {err:#}");
                Extraction::Fallback {
                    reason: err.to_string(),
                    record: fallback_record(),
                }
            }
            Err(_) => {
                warn!("extraction timed out after {:?}", self.timeout);
                Extraction::Fallback {
                    reason: format!("model call timed out after {:?}", self.timeout),
                    record: fallback_record(),
                }
            }
        }
    }
}

/// Strips markdown code fences the model sometimes wraps around the
/// JSON despite the prompt.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_model_response(text: &str) -> anyhow::Result<RawExtraction> {
    Ok(serde_json::from_str(&strip_fences(text))?)
}

fn demo_record() -> RawExtraction {
    RawExtraction {
        recipient: Some("Juan Perez (Mock)".to_string()),
        bank: Some("Banco Mock".to_string()),
        account_type: Some("Cuenta Rut".to_string()),
        account_number: Some("123456789".to_string()),
        date: Some(Utc::now().to_rfc3339()),
        time: Some("12:00".to_string()),
        transaction_code: Some(format!("TRX-{}", Ulid::new())),
        amount: Some(5000.0),
    }
}

fn fallback_record() -> RawExtraction {
    RawExtraction {
        recipient: Some("Juan Perez (Fallback)".to_string()),
        bank: Some("Banco Fallback".to_string()),
        account_type: Some("Cuenta Rut".to_string()),
        account_number: Some("123456789".to_string()),
        date: Some(Utc::now().to_rfc3339()),
        time: Some("12:00".to_string()),
        transaction_code: Some(format!("TRX-FALLBACK-{}", Ulid::new())),
        amount: Some(9999.0),
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: Blob },
}

#[derive(Serialize)]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(api_key: Option<&str>) -> GeminiExtractor {
        GeminiExtractor::new(
            reqwest::Client::new(),
            api_key.map(str::to_string),
            "gemini-2.5-flash",
            // Nothing listens here; any real call fails immediately.
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_fences("  ```\n{}\n``` "), "{}");
    }

    #[test]
    fn parses_full_key_set() {
        let raw = parse_model_response(
            r#"{
                "recipient": "Rodrigo Soto",
                "bank": "Banco Estado",
                "accountType": "Cuenta Rut",
                "accountNumber": "987654321",
                "date": "2024-03-05",
                "time": "18:45",
                "transactionCode": "TRX-123",
                "amount": 30000
            }"#,
        )
        .unwrap();

        assert_eq!(raw.recipient.as_deref(), Some("Rodrigo Soto"));
        assert_eq!(raw.account_type.as_deref(), Some("Cuenta Rut"));
        assert_eq!(raw.amount, Some(30000.0));
    }

    #[test]
    fn missing_and_null_keys_deserialize_to_none() {
        let raw = parse_model_response(r#"{"recipient": null, "amount": 12.5}"#).unwrap();

        assert_eq!(raw.recipient, None);
        assert_eq!(raw.bank, None);
        assert_eq!(raw.transaction_code, None);
        assert_eq!(raw.amount, Some(12.5));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_model_response("not json at all").is_err());
    }

    #[tokio::test]
    async fn missing_credential_yields_demo_record() {
        let outcome = extractor(None).extract(b"jpeg bytes").await;

        assert!(matches!(outcome, Extraction::ConfigAbsent(_)));
        assert_eq!(outcome.origin(), Origin::Demo);
        let record = outcome.into_record();
        assert_eq!(record.recipient.as_deref(), Some("Juan Perez (Mock)"));
        assert_eq!(record.amount, Some(5000.0));
    }

    #[tokio::test]
    async fn upstream_failure_yields_fallback_record() {
        let outcome = extractor(Some("test-key")).extract(b"jpeg bytes").await;

        assert_eq!(outcome.origin(), Origin::Fallback);
        let record = outcome.into_record();
        assert_eq!(record.recipient.as_deref(), Some("Juan Perez (Fallback)"));
        assert_eq!(record.amount, Some(9999.0));
    }
}
