use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/minly";
const DEFAULT_MONGO_DATABASE: &str = "minly";
const DEFAULT_MONGO_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_UPLOAD_PATH: &str = "./uploads";
const DEFAULT_LOCAL_DB_PATH: &str = "./data/local-db.json";

/// Which record store the process should try to use at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Probe MongoDB and fall back to the local JSON file when unreachable
    #[default]
    Auto,
    /// MongoDB only, startup fails when unreachable
    MongoDb,
    /// Local JSON file only, MongoDB is never contacted
    Local,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "mongodb" | "mongo" => Ok(BackendPreference::MongoDb),
            "local" | "json" => Ok(BackendPreference::Local),
            other => Err(format!(
                "Invalid database backend '{}', expected one of: auto, mongodb, local",
                other
            )),
        }
    }
}

impl std::fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendPreference::Auto => write!(f, "auto"),
            BackendPreference::MongoDb => write!(f, "mongodb"),
            BackendPreference::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub mongo_connect_timeout_seconds: u64,
    pub database_backend: BackendPreference,
    pub upload_path: String,
    pub local_db_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server_address = match env::var("SERVER_ADDRESS") {
            Ok(address) if !address.trim().is_empty() => address,
            _ => {
                let port = match env::var("PORT") {
                    Ok(port) => port
                        .parse::<u16>()
                        .map_err(|_| anyhow!("PORT must be a valid port number, got '{}'", port))?,
                    Err(_) => DEFAULT_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let mongo_connect_timeout_seconds = match env::var("MONGO_CONNECT_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>().map_err(|_| {
                anyhow!("MONGO_CONNECT_TIMEOUT_SECS must be a whole number of seconds, got '{}'", value)
            })?,
            Err(_) => DEFAULT_MONGO_CONNECT_TIMEOUT_SECS,
        };

        let database_backend = match env::var("DATABASE_BACKEND") {
            Ok(value) => value.parse::<BackendPreference>().map_err(|e| anyhow!(e))?,
            Err(_) => BackendPreference::default(),
        };

        let config = Config {
            server_address,
            mongo_uri: env::var("MONGO_URI").unwrap_or_else(|_| DEFAULT_MONGO_URI.to_string()),
            mongo_database: env::var("MONGO_DATABASE")
                .unwrap_or_else(|_| DEFAULT_MONGO_DATABASE.to_string()),
            mongo_connect_timeout_seconds,
            database_backend,
            upload_path: env::var("UPLOAD_PATH").unwrap_or_else(|_| DEFAULT_UPLOAD_PATH.to_string()),
            local_db_path: env::var("LOCAL_DB_PATH")
                .unwrap_or_else(|_| DEFAULT_LOCAL_DB_PATH.to_string()),
        };

        info!(
            "Configuration loaded: address={}, backend={}, upload_path={}",
            config.server_address, config.database_backend, config.upload_path
        );
        Ok(config)
    }

    pub fn mongo_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.mongo_connect_timeout_seconds)
    }
}
