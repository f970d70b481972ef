use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::locale;
use crate::mock_data::DatasetCounts;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "NOVA_CONFIG";

/// Top-level configuration loaded from `~/.nova-platform/config.toml`.
///
/// **Security**: this struct never stores passwords or API keys. It holds
/// the *names* of the env vars that carry them; see [`CredentialProvider`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mock_data: MockDataConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
}

impl Config {
    /// Load config from `$NOVA_CONFIG` or `~/.nova-platform/config.toml`,
    /// falling back to defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(path)
        } else {
            let cfg = Config::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Semantic validation for settings that are not expressible via types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.validate()?;
        self.mock_data.validate()?;
        self.locale.validate()?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nova-platform")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl GeneralConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.log_format.to_ascii_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "general.log_format must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

fn default_project_name() -> String {
    "nova-platform".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Extra CORS origins on top of localhost.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    9090
}

/// Upper bound for the simulated backend delay.
pub const MAX_LATENCY_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockDataConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_count")]
    pub customers: usize,
    #[serde(default = "default_count")]
    pub invoices: usize,
    #[serde(default = "default_count")]
    pub metrics: usize,
    /// Delay added to every `/api` response; 0 disables it.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// JSON dataset to serve instead of generating one.
    #[serde(default)]
    pub fixture_path: Option<String>,
}

impl Default for MockDataConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            customers: default_count(),
            invoices: default_count(),
            metrics: default_count(),
            latency_ms: default_latency_ms(),
            fixture_path: None,
        }
    }
}

impl MockDataConfig {
    pub fn counts(&self) -> DatasetCounts {
        DatasetCounts {
            customers: self.customers,
            invoices: self.invoices,
            metrics: self.metrics,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("customers", self.customers),
            ("invoices", self.invoices),
            ("metrics", self.metrics),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "mock_data.{name} must be greater than zero"
                )));
            }
        }
        if self.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::Validation(format!(
                "mock_data.latency_ms must be at most {MAX_LATENCY_MS}, got {}",
                self.latency_ms
            )));
        }
        Ok(())
    }
}

fn default_seed() -> u64 {
    42
}
fn default_count() -> usize {
    100
}
fn default_latency_ms() -> u64 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_username")]
    pub username: String,
    /// Env var holding the demo login password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
    /// Env var holding the API key; unset means open development mode.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password_env: default_password_env(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_username() -> String {
    "admin".into()
}
fn default_password_env() -> String {
    "NOVA_ADMIN_PASSWORD".into()
}
fn default_api_key_env() -> String {
    "NOVA_API_KEY".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Overrides the default country's primary language when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            default_language: None,
        }
    }
}

impl LocaleConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if locale::find_country(&self.default_country).is_none() {
            return Err(ConfigError::Validation(format!(
                "locale.default_country '{}' is not a supported country",
                self.default_country
            )));
        }
        if let Some(language) = self.default_language.as_deref() {
            if !locale::is_supported_language(language) {
                return Err(ConfigError::Validation(format!(
                    "locale.default_language '{language}' is not a supported language"
                )));
            }
        }
        Ok(())
    }
}

fn default_country() -> String {
    "GB".into()
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Password accepted for the demo login when no password env var is set.
pub const DEMO_PASSWORD: &str = "admin_ai@plat";

/// Reads credentials from environment variables at runtime.
///
/// Config stores env var *names*; this provider resolves them on demand.
pub struct CredentialProvider;

impl CredentialProvider {
    /// Read a credential from a named env var. Empty values count as unset.
    pub fn from_env(var_name: &str) -> Option<String> {
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    }

    /// API key required on `/api` requests. `None` means dev mode.
    pub fn api_key(auth: &AuthConfig) -> Option<String> {
        Self::from_env(&auth.api_key_env)
    }

    /// Demo login password, falling back to [`DEMO_PASSWORD`].
    pub fn login_password(auth: &AuthConfig) -> String {
        Self::from_env(&auth.password_env).unwrap_or_else(|| DEMO_PASSWORD.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
