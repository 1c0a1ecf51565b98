//! Settings document

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::remote::{Credentials, RetryPolicy};
use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.threatstack.com/v2";

/// When staged edits reach the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Edits wait for an explicit `--push`.
    #[default]
    Stage,
    /// Every editing command pushes right away.
    Immediate,
}

/// `[retry]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_rate_limit_attempts: u32,
    pub max_unavailable_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_rate_limit_attempts: 5,
            max_unavailable_attempts: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 60_000,
            multiplier: 2.0,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_rate_limit_attempts: self.max_rate_limit_attempts,
            max_unavailable_attempts: self.max_unavailable_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub api_url: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub apply_mode: ApplyMode,
    /// Defaults to `~/.rulectl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            user_id: None,
            api_url: DEFAULT_API_URL.to_string(),
            log_level: "warn".to_string(),
            apply_mode: ApplyMode::Stage,
            state_dir: None,
            request_timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Apply `RULECTL_API_KEY`, `RULECTL_USER_ID`, `RULECTL_API_URL` and
    /// `RULECTL_STATE_DIR` as looked up by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("RULECTL_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(user) = get("RULECTL_USER_ID") {
            self.user_id = Some(user);
        }
        if let Some(url) = get("RULECTL_API_URL") {
            self.api_url = url;
        }
        if let Some(dir) = get("RULECTL_STATE_DIR") {
            self.state_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::Config {
                message: message.to_string(),
            })
        };
        if self.retry.max_rate_limit_attempts == 0 || self.retry.max_unavailable_attempts == 0 {
            return invalid("retry attempt limits must be at least 1");
        }
        if self.retry.multiplier < 1.0 {
            return invalid("retry multiplier must be at least 1.0");
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return invalid("initial_backoff_ms must not exceed max_backoff_ms");
        }
        if self.api_url.trim().is_empty() {
            return invalid("api_url must not be empty");
        }
        Ok(())
    }

    /// Credentials for remote commands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing value.
    pub fn credentials(&self) -> Result<Credentials> {
        let require = |value: &Option<String>, field: &str, env: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config {
                    message: format!("'{field}' is not set; add it to the config file or set {env}"),
                })
        };
        Ok(Credentials {
            api_key: require(&self.api_key, "api_key", "RULECTL_API_KEY")?,
            user_id: require(&self.user_id, "user_id", "RULECTL_USER_ID")?,
        })
    }

    /// The state root: configured, else `~/.rulectl`.
    pub fn state_dir(&self) -> Result<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".rulectl")))
            .ok_or_else(|| Error::Config {
                message: "cannot determine the home directory; set state_dir".to_string(),
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
