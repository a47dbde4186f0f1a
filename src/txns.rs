use anyhow::Result;

use crate::report;
use crate::settings::Settings;
use crate::store::SqliteStore;

pub(crate) async fn run(settings: Settings) -> Result<()> {
    let store = SqliteStore::open_file(&settings.db_file).await?;
    let txns = store.txns().list().await?;

    report::print_transactions(std::io::stdout(), &txns)?;

    Ok(())
}
