use chrono::naive::NaiveDate;
use chrono::{DateTime, Utc};
use ulid::Ulid;

/// Sentinel for receipt fields the extractor could not read.
pub const UNKNOWN: &str = "Unknown";

/// Marker stored in the bank and account fields of manually registered
/// payments.
pub const MANUAL: &str = "MANUAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Auto-extracted from a receipt, not yet verified.
    Pending,
    /// Manually entered, presumed settled.
    Paid,
}

impl ToString for Status {
    fn to_string(&self) -> String {
        match self {
            Status::Pending => "PENDING",
            Status::Paid => "PAID",
        }
        .to_string()
    }
}

impl From<String> for Status {
    fn from(value: String) -> Status {
        match value.as_str() {
            "PENDING" => Status::Pending,
            "PAID" => Status::Paid,
            _ => unreachable!("unexpected status value"),
        }
    }
}

/// Where a transaction's field values came from. Demo and fallback
/// records hold placeholder data and should be reviewed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Extracted from a receipt image by the vision model.
    Vision,
    /// Canned record emitted because no model credential is configured.
    Demo,
    /// Canned record emitted after an extraction failure or timeout.
    Fallback,
    /// Entered by hand through a bot command.
    Manual,
}

impl Origin {
    pub fn needs_review(&self) -> bool {
        matches!(self, Origin::Demo | Origin::Fallback)
    }
}

impl ToString for Origin {
    fn to_string(&self) -> String {
        match self {
            Origin::Vision => "VISION",
            Origin::Demo => "DEMO",
            Origin::Fallback => "FALLBACK",
            Origin::Manual => "MANUAL",
        }
        .to_string()
    }
}

impl From<String> for Origin {
    fn from(value: String) -> Origin {
        match value.as_str() {
            "VISION" => Origin::Vision,
            "DEMO" => Origin::Demo,
            "FALLBACK" => Origin::Fallback,
            "MANUAL" => Origin::Manual,
            _ => unreachable!("unexpected origin value"),
        }
    }
}

/// A single transfer record. Append-only: the ingestion flow never
/// updates or voids a stored transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Ulid,
    pub recipient: String,
    pub bank: String,
    pub account_type: String,
    pub account_number: String,
    pub date: NaiveDate,
    pub time: String,
    pub code: String,
    pub amount: f64,
    pub status: Status,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a settled transaction from a manual `/pago` command.
    pub fn manual_payment(recipient: &str, amount: f64, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Ulid::new(),
            recipient: recipient.to_string(),
            bank: MANUAL.to_string(),
            account_type: MANUAL.to_string(),
            account_number: MANUAL.to_string(),
            date: now.date_naive(),
            time: now.format("%H:%M").to_string(),
            code: format!("CMD-{}", Ulid::new()),
            amount,
            status: Status::Paid,
            origin: Origin::Manual,
            created_at: now,
        }
    }
}
