use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{Error, Result};

const DEFAULT_CONFIG_PATH: &str = "conf.toml";
const DEFAULT_PORT: u16 = 10000;
const DEFAULT_ASSETS_PATH: &str = "ativos.txt";
const DEFAULT_STATUS_PATH: &str = "status.txt";
const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
const DEFAULT_QUOTE_BASE_URL: &str = "https://api.twelvedata.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// All configuration, resolved once at startup.
///
/// Each setting comes from the local TOML file if it sets it, otherwise from
/// the environment, otherwise from its default. The three secrets have no
/// default; a missing secret is a fatal configuration error.
#[derive(Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub telegram_chat_id: i64,

    // Quote provider
    pub api_key: String,
    pub quote_base_url: String,
    pub http_timeout: Duration,

    // Liveness endpoint
    pub port: u16,

    // Control files
    pub assets_path: String,
    pub status_path: String,

    /// Reference timezone for candle alignment and message timestamps.
    pub timezone: Tz,
}

/// Shape of the optional local secrets file.
///
/// ```toml
/// telegram_token = "123:abc"
/// telegram_chat_id = -1001234567890
/// api_key = "twelvedata-key"
/// port = 10000
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<i64>,
    pub api_key: Option<String>,
    pub quote_base_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub port: Option<u16>,
    pub assets_path: Option<String>,
    pub status_path: Option<String>,
    pub timezone: Option<String>,
}

impl FileConfig {
    /// Read the file at `path`. A missing file yields an empty config.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No local config file, using environment only");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse '{}': {e}", path.display())))
    }
}

impl Config {
    /// Load `.env` (if present), then the local config file, then resolve
    /// against the process environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let path = optional_env("CROSSBOT_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
        let file = FileConfig::read(&path)?;
        let cfg = Self::resolve(file, optional_env)?;
        info!(config = ?cfg, "Configuration resolved");
        Ok(cfg)
    }

    /// Resolve every setting from `file`, falling back to `env`.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = required(file.telegram_token, &env, "TELEGRAM_TOKEN")?;
        let api_key = required(file.api_key, &env, "API_KEY")?;

        let telegram_chat_id = match file.telegram_chat_id {
            Some(id) => id,
            None => parse_env(&env, "TELEGRAM_CHAT_ID")?.ok_or_else(|| missing("TELEGRAM_CHAT_ID"))?,
        };

        let port = match file.port {
            Some(p) => p,
            None => parse_env(&env, "PORT")?.unwrap_or(DEFAULT_PORT),
        };

        let timeout_secs = match file.http_timeout_secs {
            Some(s) => s,
            None => parse_env(&env, "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(Error::Config("HTTP timeout must be at least one second".into()));
        }

        let tz_name = optional(file.timezone, &env, "BROKER_TIMEZONE", DEFAULT_TIMEZONE);
        let timezone = tz_name
            .parse::<Tz>()
            .map_err(|e| Error::Config(format!("invalid timezone '{tz_name}': {e}")))?;

        Ok(Config {
            telegram_token,
            telegram_chat_id,
            api_key,
            quote_base_url: optional(file.quote_base_url, &env, "QUOTE_BASE_URL", DEFAULT_QUOTE_BASE_URL),
            http_timeout: Duration::from_secs(timeout_secs),
            port,
            assets_path: optional(file.assets_path, &env, "ASSETS_PATH", DEFAULT_ASSETS_PATH),
            status_path: optional(file.status_path, &env, "STATUS_PATH", DEFAULT_STATUS_PATH),
            timezone,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("api_key", &"<redacted>")
            .field("quote_base_url", &self.quote_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("port", &self.port)
            .field("assets_path", &self.assets_path)
            .field("status_path", &self.status_path)
            .field("timezone", &self.timezone)
            .finish()
    }
}

fn required(
    from_file: Option<String>,
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String> {
    from_file
        .or_else(|| env(key))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| missing(key))
}

fn optional(
    from_file: Option<String>,
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    from_file
        .or_else(|| env(key))
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match env(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("'{key}' is not a valid value: '{raw}'"))),
    }
}

fn missing(key: &str) -> Error {
    Error::Config(format!(
        "required setting '{key}' is not set in the config file or the environment"
    ))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
