use anyhow::{ensure, Result};
use chrono::Utc;
use clap::ArgMatches;

use crate::core::Debt;
use crate::report;
use crate::settings::Settings;
use crate::store::SqliteStore;

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let store = SqliteStore::open_file(&settings.db_file).await?;

    match matches.subcommand() {
        Some(("add", add_matches)) => {
            let name = add_matches
                .get_one::<String>("name")
                .expect("name is required");
            let amount: f64 = add_matches
                .get_one::<String>("amount")
                .expect("amount is required")
                .parse()?;
            ensure!(
                amount.is_finite() && amount >= 0.0,
                "amount must be a non-negative number"
            );
            let keywords = add_matches
                .get_one::<String>("keywords")
                .cloned()
                .unwrap_or_else(|| name.to_lowercase());

            let debt = Debt::new(name, amount, &keywords, Utc::now());
            store.debts().save(&debt).await?;
            println!("Created debt {} for {}.", debt.id, debt.name);
        }
        Some(("delete", delete_matches)) => {
            let id = delete_matches.get_one::<String>("id").expect("id is required");
            store.debts().delete(id).await?;
            println!("Deleted debt {}.", id);
        }
        _ => {
            let debts = store.debts().list().await?;
            let txns = store.txns().list().await?;
            report::print_debts(std::io::stdout(), &debts, &txns)?;
        }
    }

    Ok(())
}
