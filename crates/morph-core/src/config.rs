use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub animation: AnimationOptions,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
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

/// Tuning for a single size animation
///
/// Also used as the `[animation]` table of the config file, so every
/// handler created by the binaries starts from the user's preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationOptions {
    /// Tick period in milliseconds (16 ≈ 60Hz)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Convergence rate divisor; larger is slower
    #[serde(default = "default_speed_divisor")]
    pub speed_divisor: f64,
    /// Leave the width untouched and exclude it from completion/progress
    #[serde(default)]
    pub ignore_width: bool,
    /// Leave the height untouched and exclude it from completion/progress
    #[serde(default)]
    pub ignore_height: bool,
    /// Complete within a small pixel tolerance instead of exact equality
    #[serde(default)]
    pub lazy: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            speed_divisor: default_speed_divisor(),
            ignore_width: false,
            ignore_height: false,
            lazy: false,
        }
    }
}

impl AnimationOptions {
    /// Tick period as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.interval_ms == 0 {
            return Err(crate::Error::InvalidOption(
                "interval_ms must be greater than 0".to_string(),
            ));
        }
        if !self.speed_divisor.is_finite() || self.speed_divisor <= 0.0 {
            return Err(crate::Error::InvalidOption(format!(
                "speed_divisor must be a positive number, got {}",
                self.speed_divisor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// URL probed to decide whether the machine is online
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    /// Seconds between probes
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            probe_url: default_probe_url(),
            check_interval_secs: default_check_interval(),
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Collapsed panel width in cells
    #[serde(default = "default_collapsed_width")]
    pub collapsed_width: i32,
    /// Collapsed panel height in cells
    #[serde(default = "default_collapsed_height")]
    pub collapsed_height: i32,
    /// Expanded panel width in cells
    #[serde(default = "default_expanded_width")]
    pub expanded_width: i32,
    /// Expanded panel height in cells
    #[serde(default = "default_expanded_height")]
    pub expanded_height: i32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            collapsed_width: default_collapsed_width(),
            collapsed_height: default_collapsed_height(),
            expanded_width: default_expanded_width(),
            expanded_height: default_expanded_height(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("morph")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval_ms() -> u64 {
    16
}

fn default_speed_divisor() -> f64 {
    6.0
}

fn default_probe_url() -> String {
    "http://clients3.google.com/generate_204".to_string()
}

fn default_check_interval() -> u64 {
    5
}

fn default_timeout() -> u64 {
    10
}

fn default_tick_rate() -> u64 {
    50
}

fn default_collapsed_width() -> i32 {
    24
}

fn default_collapsed_height() -> i32 {
    5
}

fn default_expanded_width() -> i32 {
    70
}

fn default_expanded_height() -> i32 {
    18
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
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
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Check values that serde cannot reject on its own
    pub fn validate(&self) -> crate::Result<()> {
        self.animation
            .validate()
            .map_err(|e| crate::Error::Config(format!("[animation] {}", e)))?;

        url::Url::parse(&self.connection.probe_url)?;

        if self.connection.check_interval_secs == 0 {
            return Err(crate::Error::Config(
                "[connection] check_interval_secs must be greater than 0".to_string(),
            ));
        }

        let ui = &self.ui;
        if ui.collapsed_width < 0
            || ui.collapsed_height < 0
            || ui.expanded_width < 0
            || ui.expanded_height < 0
        {
            return Err(crate::Error::Config(
                "[ui] panel sizes must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/morph/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("morph")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file path used by the terminal demo
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("morph.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_animation_options() {
        let options = AnimationOptions::default();
        assert_eq!(options.interval_ms, 16);
        assert!((options.speed_divisor - 6.0).abs() < f64::EPSILON);
        assert!(!options.ignore_width);
        assert!(!options.ignore_height);
        assert!(!options.lazy);
        assert_eq!(options.interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let zero_interval = AnimationOptions {
            interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_interval.validate(),
            Err(crate::Error::InvalidOption(_))
        ));

        for divisor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let options = AnimationOptions {
                speed_divisor: divisor,
                ..Default::default()
            };
            assert!(options.validate().is_err(), "divisor {} accepted", divisor);
        }

        assert!(AnimationOptions::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [animation]
            speed_divisor = 3.5
            lazy = true

            [connection]
            check_interval_secs = 30
            "#,
        )
        .unwrap();

        assert!((config.animation.speed_divisor - 3.5).abs() < f64::EPSILON);
        assert!(config.animation.lazy);
        assert_eq!(config.animation.interval_ms, 16);
        assert_eq!(config.connection.check_interval_secs, 30);
        assert_eq!(
            config.connection.probe_url,
            "http://clients3.google.com/generate_204"
        );
        assert_eq!(config.general.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_probe_url() {
        let mut config = AppConfig::default();
        config.connection.probe_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(crate::Error::UrlParse(_))));
    }

    #[test]
    fn test_load_from_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("morph-config-does-not-exist.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ui.tick_rate_ms, 50);
    }

    #[test]
    fn test_load_from_rejects_invalid_animation() {
        let path = std::env::temp_dir().join(format!(
            "morph-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "[animation]\ninterval_ms = 0\n").unwrap();

        let result = AppConfig::load_from(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_toml_roundtrip_keeps_animation() {
        let mut config = AppConfig::default();
        config.animation.ignore_height = true;
        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.animation, config.animation);
    }
}
