use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Default Telegram Bot API root. Overridable via TELEGRAM_API_ROOT for
/// local Bot API servers and tests.
pub const DEFAULT_API_ROOT: &str = "https://api.telegram.org";

/// Timeout for outbound calls to the Telegram API.
pub const GATEWAY_TIMEOUT_SECS: u64 = 10;

/// Gateway request timeout duration.
pub fn gateway_timeout() -> Duration {
    Duration::from_secs(GATEWAY_TIMEOUT_SECS)
}

/// Immutable application configuration, read once from the environment at
/// process start and passed explicitly to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot credential token (BOT_TOKEN, required)
    pub bot_token: String,
    /// Public HTTPS callback URL to register as the webhook (HTTPS_URL)
    pub webhook_url: Option<String>,
    /// Locale used when an inbound event carries no usable language tag
    /// (DEFAULT_LOCALE, default "vi_VN")
    pub default_locale: String,
    /// Path to the SQLite database file (DB_PATH, default "bot.db")
    pub database_path: String,
    /// Port the web server binds to (PORT, default 5000)
    pub port: u16,
    /// Telegram Bot API root (TELEGRAM_API_ROOT)
    pub api_root: String,
    /// Log file path (LOG_FILE_PATH, default "matchpulse.log")
    pub log_file_path: String,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// # Errors
    /// Returns `AppError::Config` if BOT_TOKEN is missing or empty, or if
    /// PORT is not a valid port number.
    pub fn from_env() -> AppResult<Self> {
        let bot_token = env::var("BOT_TOKEN").unwrap_or_default();
        if bot_token.is_empty() {
            return Err(AppError::Config("BOT_TOKEN is not set".to_string()));
        }

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("invalid PORT value: {raw}")))?,
            Err(_) => 5000,
        };

        Ok(Config {
            bot_token,
            webhook_url: env::var("HTTPS_URL").ok().filter(|url| !url.is_empty()),
            default_locale: env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "vi_VN".to_string()),
            database_path: env::var("DB_PATH").unwrap_or_else(|_| "bot.db".to_string()),
            port,
            api_root: env::var("TELEGRAM_API_ROOT").unwrap_or_else(|_| DEFAULT_API_ROOT.to_string()),
            log_file_path: env::var("LOG_FILE_PATH").unwrap_or_else(|_| "matchpulse.log".to_string()),
        })
    }
}
