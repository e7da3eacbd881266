use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

use crate::store::STORE_NAME;

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Runtime mode, mirrors the build mode of the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Development,
    Production,
    Test,
}

impl AppMode {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub app_title: String,
    pub app_version: String,
    pub api_base_url: String,
    pub api_timeout_ms: u64,
    pub dev_tools: bool,
    pub mock_api: bool,
    pub analytics_id: Option<String>,
    pub sentry_dsn: Option<String>,
    pub enable_pwa: bool,
    pub enable_offline: bool,
    pub mode: AppMode,
    pub store_path: PathBuf,
    pub locales_dir: PathBuf,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            app_title: "starter-kit".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout_ms: DEFAULT_TIMEOUT_MS,
            dev_tools: true,
            mock_api: false,
            analytics_id: None,
            sentry_dsn: None,
            enable_pwa: false,
            enable_offline: false,
            mode: AppMode::Development,
            store_path: default_store_dir(),
            locales_dir: PathBuf::from("locales"),
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = EnvConfig {
            app_title: non_empty_var("APP_TITLE").unwrap_or(defaults.app_title),
            app_version: non_empty_var("APP_VERSION").unwrap_or(defaults.app_version),
            api_base_url: non_empty_var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_timeout_ms: env::var("API_TIMEOUT_MS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_MS.to_string())
                .parse()
                .context("API_TIMEOUT_MS must be a valid number")?,
            dev_tools: parse_bool(env::var("DEV_TOOLS").ok().as_deref(), true),
            mock_api: parse_bool(env::var("MOCK_API").ok().as_deref(), false),
            analytics_id: non_empty_var("ANALYTICS_ID"),
            sentry_dsn: non_empty_var("SENTRY_DSN"),
            enable_pwa: parse_bool(env::var("ENABLE_PWA").ok().as_deref(), false),
            enable_offline: parse_bool(env::var("ENABLE_OFFLINE").ok().as_deref(), false),
            mode: env::var("APP_ENV")
                .map(|v| AppMode::parse(&v))
                .unwrap_or_default(),
            store_path: non_empty_var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            locales_dir: non_empty_var("LOCALES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.locales_dir),
        };

        // Only development builds check the configuration, and only warn
        if config.is_dev() {
            if let Err(e) = config.validate() {
                warn!("Environment validation failed: {}", e);
            }
        }

        Ok(config)
    }

    /// Check that required variables carry a value
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("APP_TITLE", self.app_title.as_str()),
            ("API_BASE_URL", self.api_base_url.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            bail!("Missing required environment variables: {}", missing.join(", "));
        }

        Ok(())
    }

    pub fn is_dev(&self) -> bool {
        self.mode == AppMode::Development
    }

    pub fn is_prod(&self) -> bool {
        self.mode == AppMode::Production
    }

    /// File backing the persisted store blob
    pub fn store_file(&self) -> PathBuf {
        self.store_path.join(format!("{STORE_NAME}.json"))
    }
}

/// Parse a boolean flag: unset or empty falls back to `default`, otherwise
/// only a case-insensitive `"true"` is true
pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None | Some("") => default,
        Some(v) => v.to_lowercase() == "true",
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn default_store_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("starter-kit"))
        .unwrap_or_else(|| PathBuf::from(".starter-kit"))
}
