//! Client session state and its on-disk store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigError, LocaleConfig};
use crate::locale;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "John Doe".into(),
            email: "john.doe@example.com".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleSettings {
    pub country: String,
    pub language: String,
    pub currency: String,
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self::for_country("GB")
    }
}

impl LocaleSettings {
    /// Settings derived from `country`: its currency and primary language.
    pub fn for_country(country: &str) -> Self {
        let language = locale::find_country(country)
            .map(|c| c.primary_language())
            .unwrap_or(locale::DEFAULT_LANGUAGE);
        Self {
            country: country.to_string(),
            language: language.to_string(),
            currency: locale::currency_for_country(country).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub settings: LocaleSettings,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatePatch {
    pub logged_in: Option<bool>,
    pub user_profile: Option<UserProfilePatch>,
    pub settings: Option<LocaleSettingsPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleSettingsPatch {
    pub country: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
}

fn validation(msg: String) -> ConfigError {
    ConfigError::Validation(msg)
}

impl ClientState {
    /// Fresh state for a deployment whose default country is `country`.
    pub fn with_country(country: &str) -> Self {
        Self {
            settings: LocaleSettings::for_country(country),
            ..Self::default()
        }
    }

    /// Fresh state for a deployment's configured locale. An explicit
    /// `default_language` wins over the country's primary language.
    pub fn for_locale(config: &LocaleConfig) -> Self {
        let mut state = Self::with_country(&config.default_country);
        if let Some(language) = config.default_language.as_deref() {
            state.settings.language = language.to_string();
        }
        state
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.settings;
        if locale::find_country(&s.country).is_none() {
            return Err(validation(format!("unknown country '{}'", s.country)));
        }
        if !locale::is_supported_language(&s.language) {
            return Err(validation(format!("unsupported language '{}'", s.language)));
        }
        if s.currency.len() != 3 || !s.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(validation(format!(
                "currency must be a 3-letter ISO code, got '{}'",
                s.currency
            )));
        }
        Ok(())
    }

    /// Change one locale setting.
    ///
    /// Setting `country` also resets `currency` and `language` to the
    /// country's defaults. On error the state is unchanged.
    pub fn update_setting(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let mut next = self.settings.clone();
        match key {
            "country" => {
                let country = locale::find_country(value)
                    .ok_or_else(|| validation(format!("unknown country '{value}'")))?;
                next = LocaleSettings::for_country(country.code);
            }
            "language" => {
                if !locale::is_supported_language(value) {
                    return Err(validation(format!("unsupported language '{value}'")));
                }
                next.language = value.to_string();
            }
            "currency" => next.currency = value.to_ascii_uppercase(),
            other => return Err(validation(format!("unknown setting '{other}'"))),
        }
        let candidate = Self {
            settings: next,
            ..self.clone()
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Apply a partial update. Country is applied first so an explicit
    /// language or currency in the same patch overrides the derived one.
    pub fn apply_patch(&mut self, patch: ClientStatePatch) -> Result<(), ConfigError> {
        let mut next = self.clone();
        if let Some(logged_in) = patch.logged_in {
            next.logged_in = logged_in;
        }
        if let Some(profile) = patch.user_profile {
            if let Some(name) = profile.name {
                next.user_profile.name = name;
            }
            if let Some(email) = profile.email {
                next.user_profile.email = email;
            }
        }
        if let Some(settings) = patch.settings {
            if let Some(country) = settings.country {
                next.update_setting("country", &country)?;
            }
            if let Some(language) = settings.language {
                next.update_setting("language", &language)?;
            }
            if let Some(currency) = settings.currency {
                next.update_setting("currency", &currency)?;
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn login(&mut self) {
        self.logged_in = true;
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Loads and saves [`ClientState`] as TOML on disk.
pub struct ClientStateStore {
    path: PathBuf,
}

impl ClientStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.config/nova-platform/client-state.toml`.
    pub fn default_path() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("nova-platform")
            .join("client-state.toml");
        Self { path }
    }

    pub fn load(&self) -> Result<ClientState, ConfigError> {
        let text =
            std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let state: ClientState =
            toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    /// Save, creating parent directories if they don't exist.
    pub fn save(&self, state: &ClientState) -> Result<(), ConfigError> {
        state.validate()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let text = toml::to_string_pretty(state).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(&self.path, text).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, falling back to `ClientState::default()` when the
    /// file is missing or unparseable.
    pub fn load_or_default(&self) -> ClientState {
        self.load().unwrap_or_default()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
