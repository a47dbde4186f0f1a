use chrono::{DateTime, Utc};
use ulid::Ulid;

/// A running debt owed to one person. Transactions are attributed to a
/// debt at read time by keyword match on the recipient, never by a
/// stored reference.
#[derive(Debug, Clone)]
pub struct Debt {
    pub id: Ulid,
    pub name: String,
    pub total_amount: f64,
    /// Comma-separated, case-insensitive match terms.
    pub keywords: String,
    pub created_at: DateTime<Utc>,
}

impl Debt {
    pub fn new(name: &str, total_amount: f64, keywords: &str, now: DateTime<Utc>) -> Debt {
        Debt {
            id: Ulid::new(),
            name: name.to_string(),
            total_amount,
            keywords: keywords.to_lowercase(),
            created_at: now,
        }
    }

    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// True when any keyword is a substring of the recipient,
    /// case-insensitively. Overlapping keyword sets across debts can
    /// match the same transaction more than once.
    pub fn matches(&self, recipient: &str) -> bool {
        let recipient = recipient.to_lowercase();
        self.keyword_list().iter().any(|k| recipient.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debt(keywords: &str) -> Debt {
        Debt::new("Rodrigo Illanes", 100.0, keywords, Utc::now())
    }

    #[test]
    fn matches_any_keyword_case_insensitively() {
        let d = debt("rodrigo,hermano");

        assert!(d.matches("Rodrigo Soto"));
        assert!(d.matches("transferencia al HERMANO"));
        assert!(!d.matches("Ana"));
    }

    #[test]
    fn keyword_list_trims_and_drops_empty_terms() {
        let d = debt(" rodrigo , ,hermano,");

        assert_eq!(d.keyword_list(), vec!["rodrigo", "hermano"]);
    }

    #[test]
    fn new_lowercases_keywords() {
        let d = Debt::new("Monica", 20000.0, "Monica", Utc::now());

        assert_eq!(d.keywords, "monica");
    }
}
