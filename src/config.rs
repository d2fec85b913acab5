use std::path::PathBuf;

use config::{Config, Environment, File};
pub use config::ConfigError;
use serde::Deserialize;

use crate::consts::{BASE_URL, DEFAULT_USER_AGENT};
use crate::executor::Credentials;

const ENV_PREFIX: &str = "BPTF";

/// Main configuration struct
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Token, optional API key and the steam id listings are owned by
    pub credentials: CredentialConfig,
    /// HTTP client configuration
    #[serde(default)]
    pub client: ClientConfig,
    /// Item schema source
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Deserialize)]
pub struct CredentialConfig {
    /// backpack.tf user token
    #[serde(default)]
    pub token: String,
    /// Elevated API key, only needed for user info lookups
    #[serde(default)]
    pub api_key: Option<String>,
    /// SteamID64 of the account the token belongs to
    pub steam_id: String,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("token", &"<redacted>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("steam_id", &self.steam_id)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    /// Application part of the User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            base_url: default_base_url(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

#[derive(Debug, Deserialize, Default)]
pub struct SchemaConfig {
    /// JSON file mapping defindex to item base name
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `BPTF_` prefix, `__` between nested keys: `BPTF_CREDENTIALS__STEAM_ID`
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    /// Load settings from a configuration file
    pub fn new(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(config_path))
            // Environment overrides the file, e.g. BPTF_CREDENTIALS__TOKEN=...
            .add_source(environment())
            .build()?;

        s.try_deserialize()
    }

    /// Load settings from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(environment())
    }

    fn from_environment(source: Environment) -> Result<Self, ConfigError> {
        Config::builder().add_source(source).build()?.try_deserialize()
    }

    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(self.credentials.token.clone());
        match &self.credentials.api_key {
            Some(key) => credentials.with_api_key(key.clone()),
            None => credentials,
        }
    }
}
