use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the screening service (without /api/v1)
    pub api_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Delay between analysis polls after a 202 response
    pub poll_interval_secs: u64,

    /// Give up on an analysis after this many 202 responses
    pub poll_max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Tighter table padding, more rows visible
    pub compact_mode: bool,

    /// Show keybinding hints in the status line
    pub show_help_hints: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Fetch the watchlist on startup when a session exists
    pub auto_load_watchlist: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            display: DisplayConfig::default(),
            behavior: BehaviorConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            poll_interval_secs: 5,
            poll_max_attempts: 120,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            compact_mode: false,
            show_help_hints: true,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            auto_load_watchlist: true,
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    /// when the file does not exist yet. `SCREENER_API_URL` overrides the
    /// configured server.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("SCREENER_API_URL") {
            if !url.trim().is_empty() {
                config.server.api_url = url;
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("screener-cli").join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.server.poll_interval_secs)
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# screener-cli Configuration File
# Location: ~/.config/screener-cli/config.toml (Linux/macOS)
#           %APPDATA%\screener-cli\config.toml (Windows)

[server]
# Base URL of the stock-screening service (without the /api/v1 suffix).
# Can also be set per-run with the SCREENER_API_URL environment variable.
api_url = "http://localhost:8000"

# Per-request timeout in seconds
timeout_secs = 30

# How long to wait between polls while an AI analysis is being generated
poll_interval_secs = 5

# Stop polling an analysis after this many "still processing" responses
poll_max_attempts = 120

[behavior]
# Fetch the watchlist automatically on startup when already logged in
auto_load_watchlist = true

[display]
# Tighter table padding (more rows on screen)
compact_mode = false

# Show keybinding hints in the status line
show_help_hints = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.api_url, "http://localhost:8000");
        assert_eq!(config.server.poll_interval_secs, 5);
        assert_eq!(config.server.poll_max_attempts, 120);
        assert!(config.behavior.auto_load_watchlist);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.api_url, config.server.api_url);
        assert_eq!(parsed.server.poll_interval_secs, config.server.poll_interval_secs);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[server]\napi_url = \"http://stocks.example\"\n").unwrap();
        assert_eq!(parsed.server.api_url, "http://stocks.example");
        assert_eq!(parsed.server.poll_interval_secs, 5);
        assert!(parsed.display.show_help_hints);
    }

    #[test]
    fn test_commented_default_parses() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed.server.poll_max_attempts, 120);
    }
}
