//! Configuration management
//!
//! Layered as: optional TOML file, `BETIQ__SECTION__KEY` environment
//! overrides, then the two well-known variables `TELEGRAM_BOT_TOKEN` and
//! `THE_ODDS_API_KEY` (also read from `.env`).

use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const ODDS_API_KEY_VAR: &str = "THE_ODDS_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub odds_api: OddsApiConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub users: UsersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Long-polling timeout passed to getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_telegram_api_url(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OddsApiConfig {
    /// Missing key means demo mode
    pub api_key: Option<String>,
    pub base_url: String,
    pub regions: String,
    pub markets: String,
    pub odds_format: String,
    pub timeout_secs: u64,
    /// Restrict to these sport keys (empty = every active sport)
    pub sports: Vec<String>,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            regions: "eu,us".to_string(),
            markets: "h2h".to_string(),
            odds_format: "decimal".to_string(),
            timeout_secs: 30,
            sports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Lowest odds considered for a value bet
    pub min_odds: Decimal,
    /// Highest odds considered for a value bet
    pub max_odds: Decimal,
    /// Minimum confidence (percent) for the classic combinations
    pub min_confidence: u8,
    pub combo_size: usize,
    /// Matches are searched from J+0 to J+days_ahead
    pub days_ahead: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_odds: dec!(1.5),
            max_odds: dec!(5.0),
            min_confidence: 50,
            combo_size: 3,
            days_ahead: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_timeout")]
    pub timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_cache_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    #[serde(default = "default_users_file")]
    pub file: String,
}

impl Default for UsersConfig {
    fn default() -> Self {
        Self {
            file: default_users_file(),
        }
    }
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_cache_timeout() -> u64 {
    300
}

fn default_users_file() -> String {
    "known_users.json".to_string()
}

impl Config {
    /// Load configuration from an optional file plus the environment
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config: Config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("BETIQ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.apply_overrides(
            std::env::var(TELEGRAM_TOKEN_VAR).ok(),
            std::env::var(ODDS_API_KEY_VAR).ok(),
        );

        Ok(config)
    }

    /// Apply the well-known credential variables on top of the file values
    pub fn apply_overrides(&mut self, bot_token: Option<String>, odds_api_key: Option<String>) {
        if let Some(token) = bot_token.filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(key) = odds_api_key.filter(|k| !k.trim().is_empty()) {
            self.odds_api.api_key = Some(key);
        }
        if self
            .odds_api
            .api_key
            .as_ref()
            .is_some_and(|k| k.trim().is_empty())
        {
            self.odds_api.api_key = None;
        }
    }

    /// Bot token, required only when the Telegram bot actually runs
    pub fn require_bot_token(&self) -> Result<&str> {
        let token = self.telegram.bot_token.trim();
        if token.is_empty() {
            return Err(BotError::Config(format!(
                "{} manquant dans le fichier .env",
                TELEGRAM_TOKEN_VAR
            )));
        }
        Ok(token)
    }

    /// Demo mode is used when asked for, or when no odds API key is set
    pub fn demo_mode(&self, requested: bool) -> bool {
        requested || self.odds_api.api_key.is_none()
    }

    pub fn users_file(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.users.file).into_owned())
    }
}
