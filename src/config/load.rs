use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `CLIPDECK__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CLIPDECK")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cache.extensions")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.player.window_check_ms == 0 {
            return Err("player.window_check_ms must be >= 1".to_string());
        }
        if self.cache.poll_ms == 0 {
            return Err("cache.poll_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err("player.initial_volume must be within 0.0..=1.0".to_string());
        }
        if self.cache.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err("cache.extensions must name at least one extension".to_string());
        }
        if self.cache.name.trim().is_empty() || self.cache.name.contains(['/', '\\']) {
            return Err("cache.name must be a plain directory name".to_string());
        }
        Ok(())
    }

    /// Cache root, falling back to the XDG default.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache
            .dir
            .clone()
            .or_else(|| default_cache_home().map(|h| h.join("caches")))
    }

    /// Log file, falling back to the XDG default.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .clone()
            .or_else(|| default_cache_home().map(|h| h.join("clipdeck.log")))
    }
}

/// Resolve the config path from `CLIPDECK_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CLIPDECK_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/clipdeck/config.toml`
/// or `~/.config/clipdeck/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("clipdeck").join("config.toml"))
}

/// `$XDG_CACHE_HOME/clipdeck` or `~/.cache/clipdeck`.
pub fn default_cache_home() -> Option<PathBuf> {
    let cache_home = if let Some(xdg) = env::var_os("XDG_CACHE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache"))
    };

    cache_home.map(|d| d.join("clipdeck"))
}
