//! Configuration for the caviar CLI and reader.
//!
//! Read from `~/.config/caviar/config.toml`. A commented default file is
//! written on first run; missing keys fall back to their defaults.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::reader::SwipeConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub feeds: FeedsConfig,
    pub notifications: NotificationsConfig,
    pub swipe: SwipeConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub fetch_timeout_secs: u64,
    pub workers: usize,
    pub max_entries: usize,
    pub description_limit: usize,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 8,
            workers: 10,
            max_entries: 5,
            description_limit: 200,
        }
    }
}

impl FeedsConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// `"30s"`, `"5m"`, `"1h"` or plain seconds.
    pub poll_interval: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval: "30s".to_string(),
        }
    }
}

impl Config {
    /// Load from the default path, creating a commented default file when absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("caviar").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let io_error = |path: &Path, source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        fs::write(path, DEFAULT_CONFIG).map_err(|e| io_error(path, e))
    }
}

const DEFAULT_CONFIG: &str = r##"# caviar configuration
#
# Colors: named (Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
# DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
# LightCyan, White, Reset) or hex ("#RRGGBB", "#RGB").
#
# Keys: single characters ("f", "G"), named keys (Enter, Tab, Esc, Space,
# Home, End, PageUp, PageDown, Up, Down, Left, Right, F1-F12) and
# modifiers ("Ctrl+c", "Shift+Tab", "Alt+Enter").

[api]
base_url = "http://localhost:3000"
timeout_secs = 30

[feeds]
# Per-feed timeout when testing sources
fetch_timeout_secs = 8
# Concurrent feed tests
workers = 10
# Entries kept per feed and description length in characters
max_entries = 5
description_limit = 200

[notifications]
poll_interval = "30s"

[swipe]
# Mouse drag distances, in terminal cells
threshold = 10.0
max_vertical_drift = 4.0

[colors]
border = "DarkGray"
accent = "#D4AF37"
title = "White"
subtitle = "Gray"
pull_quote = "#D4AF37"
link = "Blue"
credits = "DarkGray"
selection_bg = "#D4AF37"
selection_fg = "Black"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
next_page = ["Right", "Space", "l", "PageDown"]
prev_page = ["Left", "h", "PageUp"]
first_page = ["Home", "g"]
last_page = ["End", "G"]
toggle_fullscreen = ["f"]
exit_fullscreen = ["Esc"]
toggle_contents = ["t"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
select = ["Enter"]
open_link = ["o"]
"##;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
