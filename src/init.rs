use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::settings;

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    stdout().flush()?;

    let mut buf = String::new();
    stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

pub(crate) async fn run(conf_path: Option<&str>) -> Result<()> {
    let path: PathBuf = match conf_path {
        Some(p) => p.into(),
        None => settings::default_config_path().into(),
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let token = prompt("Telegram bot token")?;
    if token.is_empty() {
        return Err(anyhow!("Telegram bot token must not be empty"));
    }
    let api_key = prompt("Gemini API key (leave empty for demo mode)")?;

    let key_line = if api_key.is_empty() {
        "# api_key = \"...\"\n".to_string()
    } else {
        format!("api_key = \"{api_key}\"\n")
    };
    let contents = format!(
        "[server]\n\
         host = \"127.0.0.1\"\n\
         port = 8080\n\
         \n\
         [telegram]\n\
         token = \"{token}\"\n\
         \n\
         [gemini]\n\
         {key_line}\
         model = \"gemini-2.5-flash\"\n"
    );

    std::fs::write(&path, contents)?;
    println!("Wrote configuration to {}", path.display());

    Ok(())
}
