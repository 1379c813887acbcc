//! Engine configuration
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PageNodeError, Result};

pub const ENV_STALENESS_TIMEOUT: &str = "PAGENODE_STALENESS_TIMEOUT";
pub const ENV_DEFAULT_TITLE: &str = "PAGENODE_DEFAULT_TITLE";
pub const ENV_DEFAULT_LOCALE: &str = "PAGENODE_DEFAULT_LOCALE";

pub const DEFAULT_STALENESS_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_TITLE: &str = "New page";
pub const DEFAULT_LOCALE: &str = "en";

const MAX_TIMEOUT_SECS: u64 = (i64::MAX / 1000) as u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// A version not updated for this many seconds is stale and gets
    /// checkpointed before the next edit
    pub staleness_timeout_secs: u64,
    /// Title given to pages created without one
    pub default_title: String,
    pub default_locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            staleness_timeout_secs: DEFAULT_STALENESS_TIMEOUT_SECS,
            default_title: DEFAULT_TITLE.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; absent keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML, unknown keys or invalid
    /// values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PageNodeError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PageNodeError::InvalidConfig {
                reason: format!("cannot read {}: {}", path.display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// Apply `PAGENODE_*` overrides from the process environment
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if an override holds an invalid value.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if an override holds an invalid value.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_STALENESS_TIMEOUT) {
            self.staleness_timeout_secs =
                raw.trim().parse().map_err(|_| PageNodeError::InvalidConfig {
                    reason: format!(
                        "{} must be a number of seconds, got {:?}",
                        ENV_STALENESS_TIMEOUT, raw
                    ),
                })?;
        }
        if let Some(title) = lookup(ENV_DEFAULT_TITLE) {
            self.default_title = title;
        }
        if let Some(locale) = lookup(ENV_DEFAULT_LOCALE) {
            self.default_locale = locale;
        }
        self.validate()
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero timeout, a blank default title or
    /// a blank default locale.
    pub fn validate(&self) -> Result<()> {
        if self.staleness_timeout_secs == 0 {
            return Err(PageNodeError::InvalidConfig {
                reason: "staleness_timeout_secs must be positive".to_string(),
            });
        }
        if self.default_title.trim().is_empty() {
            return Err(PageNodeError::InvalidConfig {
                reason: "default_title must not be blank".to_string(),
            });
        }
        if self.default_locale.trim().is_empty() {
            return Err(PageNodeError::InvalidConfig {
                reason: "default_locale must not be blank".to_string(),
            });
        }
        Ok(())
    }

    pub fn staleness_timeout(&self) -> chrono::Duration {
        // chrono caps durations at i64::MAX milliseconds
        let secs = self.staleness_timeout_secs.min(MAX_TIMEOUT_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}
