//! User settings
//!
//! Settings live in a TOML file (`config.toml`), are created with defaults
//! on first use, and can be overridden per invocation through `RULECTL_*`
//! environment variables.

mod settings;

pub use settings::{ApplyMode, RetrySettings, Settings};

use std::path::{Path, PathBuf};

use rulectl_fs::{ConfigStore, NormalizedPath};

use crate::{Error, Result};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "RULECTL_CONFIG";

/// Where the config file is read from: `explicit`, else `$RULECTL_CONFIG`,
/// else `<config dir>/rulectl/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("rulectl").join("config.toml"))
        .ok_or_else(|| Error::Config {
            message: "cannot determine the user config directory; pass --config".to_string(),
        })
}

/// Load settings from `path`, writing a default file if none exists, then
/// apply environment overrides.
pub fn load(path: &Path) -> Result<Settings> {
    let path = NormalizedPath::new(path);
    let store = ConfigStore::new();

    let mut settings = if path.exists() {
        store.load::<Settings>(&path)?
    } else {
        let defaults = Settings::default();
        store.save(&path, &defaults)?;
        tracing::info!(%path, "Wrote default configuration");
        defaults
    };

    settings.apply_overrides(|key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}
