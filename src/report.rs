use std::io::Write;

use anyhow::Result;
use tabwriter::TabWriter;

use crate::core::{Debt, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct DebtStats {
    pub paid: f64,
    pub pending: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_debt: f64,
    pub paid: f64,
    pub pending: f64,
}

/// Sums every transaction attributed to the debt by keyword match.
/// This is a soft join recomputed on every read: transactions matching
/// several debts are counted once per debt, and unmatched transactions
/// count toward nothing.
pub fn debtor_stats(debt: &Debt, txns: &[Transaction]) -> DebtStats {
    let paid: f64 = txns
        .iter()
        .filter(|t| debt.matches(&t.recipient))
        .map(|t| t.amount)
        .sum();

    DebtStats {
        paid,
        pending: debt.total_amount - paid,
    }
}

pub fn summarize(debts: &[Debt], txns: &[Transaction]) -> (Vec<(Debt, DebtStats)>, Summary) {
    let mut summary = Summary::default();
    let per_debt = debts
        .iter()
        .map(|debt| {
            let stats = debtor_stats(debt, txns);
            summary.total_debt += debt.total_amount;
            summary.paid += stats.paid;
            summary.pending += stats.pending;
            (debt.clone(), stats)
        })
        .collect();

    (per_debt, summary)
}

pub fn print_debts<W: Write>(wr: W, debts: &[Debt], txns: &[Transaction]) -> Result<()> {
    let (per_debt, summary) = summarize(debts, txns);

    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tName\tKeywords\tTotal\tPaid\tPending")?;
    for (debt, stats) in &per_debt {
        writeln!(
            tw,
            "{}\t{}\t{}\t${:.2}\t${:.2}\t${:.2}",
            debt.id, debt.name, debt.keywords, debt.total_amount, stats.paid, stats.pending,
        )?;
    }
    writeln!(
        tw,
        "\tTOTAL\t\t${:.2}\t${:.2}\t${:.2}",
        summary.total_debt, summary.paid, summary.pending,
    )?;
    tw.flush()?;

    Ok(())
}

pub fn print_transactions<W: Write>(wr: W, txns: &[Transaction]) -> Result<()> {
    let mut tw = TabWriter::new(wr);
    writeln!(tw, "ID\tDate\tRecipient\tBank\tAmount\tStatus\tOrigin\tCode")?;
    for t in txns {
        writeln!(
            tw,
            "{}\t{} {}\t{}\t{}\t${:.2}\t{}\t{}\t{}",
            t.id,
            t.date.format("%d/%m/%Y"),
            t.time,
            t.recipient,
            t.bank,
            t.amount,
            t.status.to_string(),
            t.origin.to_string(),
            t.code,
        )?;
    }
    tw.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::core::Origin;
    use crate::extract::RawExtraction;
    use crate::normalize::normalize;

    fn txn(recipient: &str, amount: f64) -> Transaction {
        normalize(
            RawExtraction {
                recipient: Some(recipient.to_string()),
                amount: Some(amount),
                ..Default::default()
            },
            Origin::Vision,
            Utc::now(),
        )
    }

    #[test]
    fn attributes_matching_transactions_only() {
        let debt = Debt::new("Rodrigo", 100.0, "rodrigo,hermano", Utc::now());
        let txns = vec![txn("Rodrigo Soto", 30.0), txn("Ana", 10.0)];

        let stats = debtor_stats(&debt, &txns);

        assert_eq!(stats.paid, 30.0);
        assert_eq!(stats.pending, 70.0);
    }

    #[test]
    fn overpayment_goes_negative() {
        let debt = Debt::new("Rodrigo", 100.0, "rodrigo", Utc::now());
        let txns = vec![txn("Rodrigo", 80.0), txn("rodrigo soto", 50.0)];

        let stats = debtor_stats(&debt, &txns);

        assert_eq!(stats.paid, 130.0);
        assert_eq!(stats.pending, -30.0);
    }

    // Overlapping keyword sets double count by design; the join is
    // fuzzy, not exclusive.
    #[test]
    fn overlapping_keywords_count_the_same_transaction_twice() {
        let debts = vec![
            Debt::new("Rodrigo", 100.0, "rodrigo", Utc::now()),
            Debt::new("Hermano", 50.0, "rodrigo,hermano", Utc::now()),
        ];
        let txns = vec![txn("Rodrigo Soto", 30.0)];

        let (per_debt, summary) = summarize(&debts, &txns);

        assert_eq!(per_debt[0].1.paid, 30.0);
        assert_eq!(per_debt[1].1.paid, 30.0);
        assert_eq!(summary.paid, 60.0);
        assert_eq!(summary.total_debt, 150.0);
        assert_eq!(summary.pending, 90.0);
    }

    #[test]
    fn empty_ledger_summary_is_zero() {
        let (per_debt, summary) = summarize(&[], &[]);

        assert!(per_debt.is_empty());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn renders_debt_table() {
        let debts = vec![Debt::new("Rodrigo", 100.0, "rodrigo", Utc::now())];
        let txns = vec![txn("Rodrigo Soto", 30.0)];

        let mut out = vec![];
        print_debts(&mut out, &debts, &txns).unwrap();
        let table = String::from_utf8(out).unwrap();

        assert!(table.contains("Rodrigo"));
        assert!(table.contains("$30.00"));
        assert!(table.contains("$70.00"));
    }
}
