use config::{Config, Environment, File};
use serde::Deserialize;

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub db_file: String,
    pub server: Server,
    pub telegram: Telegram,
    pub gemini: Gemini,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub api_base: String,
}

#[derive(Debug, Deserialize)]
pub struct Gemini {
    /// Absent key means demo mode: the extractor returns canned
    /// records instead of calling the model.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut s = Config::builder()
            .set_default("db_file", default_data_path())?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .set_default("telegram.api_base", TELEGRAM_API_BASE)?
            .set_default("gemini.model", "gemini-2.5-flash")?
            .set_default("gemini.api_base", GEMINI_API_BASE)?
            .set_default("gemini.timeout_secs", 30_i64)?
            .add_source(Environment::with_prefix("FIADO"));

        if let Some(path) = config_path {
            s = s.add_source(File::with_name(path));
        } else {
            s = s.add_source(File::with_name(&default_config_path()));
        }

        s.build()?.try_deserialize()
    }
}

fn default_data_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(format!("{}.db", CLIENT_NAME))
        .display()
        .to_string()
}

pub(crate) fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().expect("read current working dir"))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
