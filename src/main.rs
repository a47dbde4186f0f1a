mod commands;
mod core;
mod debts;
mod extract;
mod init;
mod normalize;
mod report;
mod serve;
mod settings;
mod store;
mod telegram;
mod txns;
mod webhook;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::settings::Settings;

static CLIENT_NAME: &str = "fiado";

async fn run() -> Result<()> {
    let app = Command::new(CLIENT_NAME)
        .about("The fiado utility ingests bank-transfer receipts sent to a \
         Telegram bot and tracks running debt balances per recipient.")
        .version("0.1.0")
        .subcommand_required(true)
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("Sets a custom config file"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Sets the level of verbosity"))
        .subcommand(Command::new("init").about("Writes an initial configuration file."))
        .subcommand(Command::new("serve")
            .about("Runs the Telegram webhook server until interrupted."))
        .subcommand(Command::new("transactions")
            .about("Prints stored transactions, newest first."))
        .subcommand(Command::new("debts")
            .about("Prints every debt with its paid and pending balances.")
            .subcommand(Command::new("add")
                .about("Creates a new debt.")
                .arg(Arg::new("name").required(true).help("Who the debt is owed to."))
                .arg(Arg::new("amount").required(true).help("The original amount owed."))
                .arg(Arg::new("keywords")
                    .short('k')
                    .long("keywords")
                    .value_name("TERMS")
                    .help("Comma-separated recipient match terms, defaults to the lowercased name.")))
            .subcommand(Command::new("delete")
                .about("Deletes a debt.")
                .arg(Arg::new("id").required(true).help("The ID of the debt to delete."))));

    let matches = app.get_matches();

    let default_level = if matches.get_flag("verbose") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = matches.get_one::<String>("config").map(String::as_str);

    match matches.subcommand() {
        Some(("init", _)) => init::run(config).await,
        Some(("serve", _)) => serve::run(Settings::new(config)?).await,
        Some(("transactions", _)) => txns::run(Settings::new(config)?).await,
        Some(("debts", debt_matches)) => debts::run(debt_matches, Settings::new(config)?).await,
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{}", err);
        std::process::exit(1);
    }
}
