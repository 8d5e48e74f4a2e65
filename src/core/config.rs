//! Process configuration
//!
//! Values come from an optional TOML file and are then overridden by
//! environment variables. Secrets are wrapped in `SecretString` so that
//! `Debug` output never shows them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::core::error::{DispatchError, Result};

pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8787";

/// Runtime configuration shared read-only by every request
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret expected in the `X-API-Key` header
    ///
    /// When unset every `/command` request is rejected.
    pub api_key: Option<SecretString>,

    /// Service account identity, used as the assertion issuer
    pub service_account_email: String,

    /// PKCS8 PEM private key of the service account
    pub private_key: SecretString,

    /// Calendar the commands read from and write to
    pub calendar_id: String,

    /// OAuth scope requested for every token
    pub scope: String,

    /// Token endpoint, also used as the assertion audience
    pub token_uri: String,

    /// Base URL of the Calendar v3 REST API
    pub api_base: String,

    /// Address the HTTP server binds to
    pub listen_addr: String,

    /// Per-call timeout for outbound HTTP
    pub http_timeout: Duration,

    /// Reuse bearer tokens until shortly before they expire
    ///
    /// Off by default: each request signs and exchanges a fresh assertion.
    pub cache_tokens: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            service_account_email: String::new(),
            private_key: SecretString::from(String::new()),
            calendar_id: String::new(),
            scope: DEFAULT_SCOPE.into(),
            token_uri: DEFAULT_TOKEN_URI.into(),
            api_base: DEFAULT_API_BASE.into(),
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            http_timeout: Duration::from_secs(10),
            cache_tokens: false,
        }
    }
}

/// On-disk shape of the TOML config file; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_key: Option<String>,
    service_account_email: Option<String>,
    private_key: Option<String>,
    private_key_path: Option<PathBuf>,
    calendar_id: Option<String>,
    scope: Option<String>,
    token_uri: Option<String>,
    api_base: Option<String>,
    listen_addr: Option<String>,
    http_timeout_secs: Option<u64>,
    cache_tokens: Option<bool>,
}

impl Config {
    /// Load from an optional TOML file, apply environment overrides, validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    ///
    /// Required: GCAL_SA_EMAIL, GCAL_SA_PRIVATE_KEY, GCAL_CALENDAR_ID
    /// Optional: API_KEY, GCAL_SCOPE, GCAL_TOKEN_URI, GCAL_API_BASE, LISTEN_ADDR
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut file: FileConfig =
            toml::from_str(&content).map_err(|e| DispatchError::Config(e.to_string()))?;

        if let Some(key_path) = file.private_key_path.take() {
            let key_path = if key_path.is_relative() {
                path.parent().unwrap_or(Path::new(".")).join(key_path)
            } else {
                key_path
            };
            file.private_key = Some(std::fs::read_to_string(&key_path)?);
        }

        Ok(Self::from_file_config(file))
    }

    /// Parse TOML text; `private_key_path` is only honoured by [`Config::load`]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FileConfig =
            toml::from_str(content).map_err(|e| DispatchError::Config(e.to_string()))?;
        Ok(Self::from_file_config(file))
    }

    fn from_file_config(file: FileConfig) -> Self {
        let defaults = Self::default();

        Self {
            api_key: file.api_key.map(SecretString::from),
            service_account_email: file.service_account_email.unwrap_or_default(),
            private_key: file
                .private_key
                .map(SecretString::from)
                .unwrap_or(defaults.private_key),
            calendar_id: file.calendar_id.unwrap_or_default(),
            scope: file.scope.unwrap_or(defaults.scope),
            token_uri: file.token_uri.unwrap_or(defaults.token_uri),
            api_base: file.api_base.unwrap_or(defaults.api_base),
            listen_addr: file.listen_addr.unwrap_or(defaults.listen_addr),
            http_timeout: file
                .http_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            cache_tokens: file.cache_tokens.unwrap_or(defaults.cache_tokens),
        }
    }

    /// Override fields from a variable lookup (the process environment in
    /// production, a map in tests)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("API_KEY") {
            self.api_key = Some(SecretString::from(v));
        }
        if let Some(v) = lookup("GCAL_SA_EMAIL") {
            self.service_account_email = v;
        }
        if let Some(v) = lookup("GCAL_SA_PRIVATE_KEY") {
            self.private_key = SecretString::from(v);
        }
        if let Some(v) = lookup("GCAL_CALENDAR_ID") {
            self.calendar_id = v;
        }
        if let Some(v) = lookup("GCAL_SCOPE") {
            self.scope = v;
        }
        if let Some(v) = lookup("GCAL_TOKEN_URI") {
            self.token_uri = v;
        }
        if let Some(v) = lookup("GCAL_API_BASE") {
            self.api_base = v;
        }
        if let Some(v) = lookup("LISTEN_ADDR") {
            self.listen_addr = v;
        }
    }

    /// Validate that everything a request needs is present
    pub fn validate(&self) -> Result<()> {
        if self.service_account_email.trim().is_empty() {
            return Err(DispatchError::Config(
                "service account email (GCAL_SA_EMAIL) is not set".into(),
            ));
        }
        if self.private_key.expose_secret().trim().is_empty() {
            return Err(DispatchError::Config(
                "service account private key (GCAL_SA_PRIVATE_KEY) is not set".into(),
            ));
        }
        if self.calendar_id.trim().is_empty() {
            return Err(DispatchError::Config(
                "calendar id (GCAL_CALENDAR_ID) is not set".into(),
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(DispatchError::Config("http timeout must be positive".into()));
        }
        Ok(())
    }
}
