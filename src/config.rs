use std::net::IpAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Sanjeevani";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "sanjeevani_lib=info,sanjeevani=info,tower_http=warn"
}

/// Get the application data directory.
/// ~/Sanjeevani/ when a home directory exists, the working directory otherwise.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from("."),
    }
}

/// Default location of the analysis database.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("sanjeevani.db")
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Connection settings for the generative model API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_ip: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
    pub max_upload_bytes: usize,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
    pub rate_per_minute: u32,
    pub rate_per_hour: u32,
}

/// Everything the service needs, resolved once at startup and passed down.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Read configuration from the process environment (after loading `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenv::dotenv().is_ok() {
            tracing::debug!("Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let gemini = GeminiConfig {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: parse_or("GEMINI_TIMEOUT_SECS", get("GEMINI_TIMEOUT_SECS"), 60)?,
        };

        let max_upload_mb: usize =
            parse_or("SANJEEVANI_MAX_UPLOAD_MB", get("SANJEEVANI_MAX_UPLOAD_MB"), 10)?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| ConfigError::Invalid {
                key: "SANJEEVANI_MAX_UPLOAD_MB",
                value: max_upload_mb.to_string(),
            })?;

        let cors_origin = match get("CORS_ORIGIN") {
            Some(origin) if origin.trim() == "*" => None,
            Some(origin) => Some(origin.trim().to_string()),
            None => Some(DEFAULT_CORS_ORIGIN.to_string()),
        };

        let server = ServerConfig {
            bind_ip: parse_or("SANJEEVANI_BIND", get("SANJEEVANI_BIND"), IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or("PORT", get("PORT"), 5000)?,
            db_path: get("SANJEEVANI_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            max_upload_bytes,
            cors_origin,
            rate_per_minute: parse_or(
                "SANJEEVANI_RATE_PER_MINUTE",
                get("SANJEEVANI_RATE_PER_MINUTE"),
                20,
            )?,
            rate_per_hour: parse_or(
                "SANJEEVANI_RATE_PER_HOUR",
                get("SANJEEVANI_RATE_PER_HOUR"),
                200,
            )?,
        };

        Ok(Self { gemini, server })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
