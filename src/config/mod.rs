use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Supported storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Mysql,
    Sqlite,
}

/// Configuration for the application, read from environment variables.
/// Every field has a default; an unsupported DB_TYPE fails the load.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Storage backend, `mysql` or `sqlite`.
    #[serde(default = "default_db_type")]
    pub db_type: DbKind,
    #[serde(default = "default_db_host")]
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    #[serde(default = "default_db_user")]
    pub db_user: String,
    #[serde(default)]
    pub db_password: String,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// SQLite database file path.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_db_type() -> DbKind {
    DbKind::Sqlite
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_user() -> String {
    "root".to_string()
}

fn default_db_name() -> String {
    "accounts".to_string()
}

fn default_db_path() -> String {
    "./accounts.db".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
