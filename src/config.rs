use std::env;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "data/clanstats.db";
const DEFAULT_API_BASE_URL: &str = "https://api.clashroyale.com/v1";
const DEFAULT_API_KEY_PATH: &str = "clan_api_key";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration loaded from environment variables (and `.env` via dotenv)
#[derive(Clone)]
pub struct Config {
    pub db_path: String,
    pub api_base_url: String,
    pub api_key: String,
    pub http_timeout: Duration,
    pub rust_log: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
    ApiKeyFile { path: String, source: std::io::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            ConfigError::ApiKeyFile { path, source } => {
                write!(f, "Cannot read API key file {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// Keeps the key out of debug logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &self.db_path)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "<set>" })
            .field("http_timeout", &self.http_timeout)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `CLANSTATS_DB_PATH` (default: data/clanstats.db)
    /// - `CLASH_API_BASE_URL` (default: https://api.clashroyale.com/v1)
    /// - `CLASH_API_KEY` - API token; takes precedence over the key file
    /// - `CLASH_API_KEY_PATH` (default: clan_api_key) - file holding the token
    /// - `HTTP_TIMEOUT_SECS` (default: 10)
    /// - `RUST_LOG` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("CLANSTATS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let api_base_url =
            lookup("CLASH_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "CLASH_API_BASE_URL must start with http:// or https://".to_string(),
            ));
        }

        let api_key = match lookup("CLASH_API_KEY").filter(|k| !k.trim().is_empty()) {
            Some(key) => key.trim().to_string(),
            None => {
                let path =
                    lookup("CLASH_API_KEY_PATH").unwrap_or_else(|| DEFAULT_API_KEY_PATH.to_string());
                load_api_key(&path)?
            }
        };

        let http_timeout = Duration::from_secs(
            lookup("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        Ok(Self {
            db_path,
            api_base_url,
            api_key,
            http_timeout,
            rust_log: lookup("RUST_LOG"),
        })
    }
}

impl Config {
    /// Logger for the TUI binary
    ///
    /// Without `RUST_LOG` only errors are printed: stderr shares the terminal
    /// with the UI, so info lines would be drawn over the tables.
    pub fn logger_builder(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        match self.rust_log.as_deref() {
            Some(filters) => builder.parse_filters(filters),
            None => builder.filter_level(log::LevelFilter::Error),
        };
        builder.target(env_logger::Target::Stderr);
        builder
    }
}

/// Read the API token from `path`
///
/// A missing file yields an empty key: the API then rejects requests and
/// refreshes report "no data" instead of the program refusing to start.
fn load_api_key(path: &str) -> Result<String, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("API key file {} not found, requests will be unauthenticated", path);
            Ok(String::new())
        }
        Err(source) => Err(ConfigError::ApiKeyFile {
            path: path.to_string(),
            source,
        }),
    }
}
