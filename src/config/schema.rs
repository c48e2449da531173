use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/clipdeck/config.toml` or `~/.config/clipdeck/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CLIPDECK__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub cache: CacheSettings,
    pub assets: AssetSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Volume applied at startup, `0.0..=1.0`.
    pub initial_volume: f32,
    /// How often the playhead is compared against the window end (milliseconds).
    pub window_check_ms: u64,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            initial_volume: 0.8,
            window_check_ms: 100,
            scrub_seconds: 5,
            volume_step: 0.05,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache root; each subdirectory is one named cache.
    /// Defaults to `$XDG_CACHE_HOME/clipdeck/caches`.
    pub dir: Option<PathBuf>,
    /// Poll period of the availability tracker (milliseconds).
    pub poll_ms: u64,
    /// Identifiers containing `.<ext>` for one of these count as audio assets.
    pub extensions: Vec<String>,
    /// Copy missing assets from the asset root into the cache in the background.
    pub prefetch: bool,
    /// Named cache the warmer writes into.
    pub name: String,
    /// How many assets make the cache complete. Defaults to the catalog size.
    pub expected_total: Option<usize>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: None,
            poll_ms: 500,
            extensions: vec!["mp3".into()],
            prefetch: true,
            name: "audio-v1".to_string(),
            expected_total: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory that asset references (`/name.mp3`) are resolved against.
    pub root: PathBuf,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Whether the cursor starts in "follow playback" mode.
    pub follow_playback: bool,

    /// Which time fields to show for the now-playing line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,

    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ clips, offline ~ ".to_string(),
            follow_playback: true,
            time_fields: vec![TimeField::Elapsed, TimeField::Total, TimeField::Remaining],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter, e.g. `info` or `clipdeck=debug`. `RUST_LOG` wins.
    pub level: String,
    /// Log file. Defaults to `$XDG_CACHE_HOME/clipdeck/clipdeck.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
