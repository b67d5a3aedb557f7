use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub preload: PreloadConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (entries.json, images/, preferences.json)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Autoplay and scroll-detection timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Delay between autoplay steps in milliseconds
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// How long a programmatic scroll ignores its own scroll events
    #[serde(default = "default_suppression")]
    pub suppression_ms: u64,
    /// Quiet period after the last manual scroll before it counts as settled
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            suppression_ms: default_suppression(),
            settle_ms: default_settle(),
        }
    }
}

impl PlaybackConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn suppression(&self) -> Duration {
        Duration::from_millis(self.suppression_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadConfig {
    /// Preload images around the active entry
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of decoded images kept in memory
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Maximum simultaneous loads for the high-priority batch
    #[serde(default = "default_fan_out")]
    pub fan_out: usize,
    /// Entries loaded on each side of the active entry before the rest
    #[serde(default = "default_surrounding")]
    pub surrounding: usize,
    /// Pause between background loads in milliseconds
    #[serde(default = "default_sequential_pause")]
    pub sequential_pause_ms: u64,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            cache_capacity: default_cache_capacity(),
            fan_out: default_fan_out(),
            surrounding: default_surrounding(),
            sequential_pause_ms: default_sequential_pause(),
        }
    }
}

impl PreloadConfig {
    pub fn sequential_pause(&self) -> Duration {
        Duration::from_millis(self.sequential_pause_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Terminal rows per calendar week
    #[serde(default = "default_row_height")]
    pub row_height: u16,
    /// Show the entry date above its text
    #[serde(default = "default_true")]
    pub show_dates: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            row_height: default_row_height(),
            show_dates: default_true(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("daybook")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    2000
}

fn default_suppression() -> u64 {
    100
}

fn default_settle() -> u64 {
    150
}

fn default_cache_capacity() -> usize {
    10
}

fn default_fan_out() -> usize {
    3
}

fn default_surrounding() -> usize {
    5
}

fn default_sequential_pause() -> u64 {
    100
}

fn default_tick_rate() -> u64 {
    50
}

fn default_row_height() -> u16 {
    1
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/daybook/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("daybook")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Diary manifest (JSON array of entries)
    pub fn manifest_path(&self) -> PathBuf {
        self.data_dir().join("entries.json")
    }

    /// Directory that relative image references resolve against
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir().join("images")
    }

    /// Key-value file backing the persisted preferences
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir().join("preferences.json")
    }

    /// Log file used while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("daybook.log")
    }
}
