use chrono::naive::NaiveDate;
use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::core::{Origin, Status, Transaction, UNKNOWN};
use crate::extract::RawExtraction;

/// Turns a best-effort extraction into a storage-ready transaction.
/// Missing or empty fields take their sentinel defaults; status is
/// always pending because extracted records are unverified.
pub fn normalize(raw: RawExtraction, origin: Origin, now: DateTime<Utc>) -> Transaction {
    Transaction {
        id: Ulid::new(),
        recipient: or_unknown(raw.recipient),
        bank: or_unknown(raw.bank),
        account_type: or_unknown(raw.account_type),
        account_number: or_unknown(raw.account_number),
        date: parse_date(raw.date.as_deref()).unwrap_or_else(|| now.date_naive()),
        time: raw.time.filter(|t| !t.is_empty()).unwrap_or_else(|| "00:00".to_string()),
        code: raw
            .transaction_code
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("UNKNOWN-{}", Ulid::new())),
        amount: clamp_amount(raw.amount),
        status: Status::Pending,
        origin,
        created_at: now,
    }
}

fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

// The model performs no range validation, so negative and non-finite
// amounts are clamped here.
fn clamp_amount(amount: Option<f64>) -> f64 {
    match amount {
        Some(a) if a.is_finite() && a >= 0.0 => a,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_null_record_takes_every_default() {
        let now = Utc::now();
        let txn = normalize(RawExtraction::default(), Origin::Vision, now);

        assert_eq!(txn.recipient, UNKNOWN);
        assert_eq!(txn.bank, UNKNOWN);
        assert_eq!(txn.account_type, UNKNOWN);
        assert_eq!(txn.account_number, UNKNOWN);
        assert_eq!(txn.date, now.date_naive());
        assert_eq!(txn.time, "00:00");
        assert!(txn.code.starts_with("UNKNOWN-"));
        assert!(txn.code.len() > "UNKNOWN-".len());
        assert_eq!(txn.amount, 0.0);
        assert_eq!(txn.status, Status::Pending);
    }

    #[test]
    fn extracted_values_pass_through() {
        let raw = RawExtraction {
            recipient: Some("Rodrigo Soto".to_string()),
            bank: Some("Banco Estado".to_string()),
            account_type: Some("Cuenta Rut".to_string()),
            account_number: Some("987654321".to_string()),
            date: Some("2024-03-05".to_string()),
            time: Some("18:45".to_string()),
            transaction_code: Some("TRX-123".to_string()),
            amount: Some(30000.0),
        };

        let txn = normalize(raw, Origin::Vision, Utc::now());

        assert_eq!(txn.recipient, "Rodrigo Soto");
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(txn.time, "18:45");
        assert_eq!(txn.code, "TRX-123");
        assert_eq!(txn.amount, 30000.0);
    }

    #[test]
    fn iso_datetime_dates_are_accepted() {
        let raw = RawExtraction {
            date: Some("2024-03-05T18:45:00+00:00".to_string()),
            ..Default::default()
        };

        let txn = normalize(raw, Origin::Vision, Utc::now());
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn unparseable_dates_default_to_today() {
        let now = Utc::now();
        let raw = RawExtraction {
            date: Some("el cinco de marzo".to_string()),
            ..Default::default()
        };

        let txn = normalize(raw, Origin::Vision, now);
        assert_eq!(txn.date, now.date_naive());
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let raw = RawExtraction {
            recipient: Some(String::new()),
            time: Some(String::new()),
            transaction_code: Some(String::new()),
            ..Default::default()
        };

        let txn = normalize(raw, Origin::Vision, Utc::now());

        assert_eq!(txn.recipient, UNKNOWN);
        assert_eq!(txn.time, "00:00");
        assert!(txn.code.starts_with("UNKNOWN-"));
    }

    #[test]
    fn bad_amounts_clamp_to_zero() {
        for amount in [Some(-50.0), Some(f64::NAN), Some(f64::INFINITY), None] {
            let raw = RawExtraction {
                amount,
                ..Default::default()
            };

            assert_eq!(normalize(raw, Origin::Vision, Utc::now()).amount, 0.0);
        }
    }
}
