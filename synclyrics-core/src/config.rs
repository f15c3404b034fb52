use crate::error::{CoreError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncLyricsConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Transport-specific sections, keyed by transport name.
    /// Each transport crate parses its own table.
    #[serde(default)]
    pub transport: TransportsConfig,
}

/// Timing compensation applied by the position estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed latency compensation added to every estimate
    #[serde(default = "default_auto_offset_ms")]
    pub auto_offset_ms: i64,
    /// Step used by the offset buttons
    #[serde(default = "default_offset_step_ms")]
    pub offset_step_ms: u64,
}

const fn default_auto_offset_ms() -> i64 {
    500
}

const fn default_offset_step_ms() -> u64 {
    500
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_offset_ms: default_auto_offset_ms(),
            offset_step_ms: default_offset_step_ms(),
        }
    }
}

impl SyncConfig {
    /// Auto offset in seconds, as consumed by the estimator.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn auto_offset_secs(&self) -> f64 {
        self.auto_offset_ms as f64 / 1000.0
    }

    /// Offset button step in seconds.
    #[must_use]
    pub fn offset_step_secs(&self) -> f64 {
        Duration::from_millis(self.offset_step_ms).as_secs_f64()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Frames per second for the highlight driver
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

const fn default_frame_rate() -> u32 {
    60
}

/// Highest accepted `frame_rate`; the frame interval must stay non-zero
pub const MAX_FRAME_RATE: u32 = 1000;

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
        }
    }
}

impl AnimationConfig {
    /// Interval between two driver frames.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `~/.cache/synclyrics/synclyrics.log`
    #[serde(default)]
    pub enabled: bool,
}

/// Raw transport tables, e.g. `[transport.websocket]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportsConfig(toml::Table);

impl TransportsConfig {
    /// Deserialize the table for transport `name`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the table exists but does not match `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.0
            .get(name)
            .cloned()
            .map(|value| {
                value.try_into().map_err(|e: toml::de::Error| CoreError::ConfigInvalid {
                    message: format!("transport.{name}: {e}"),
                })
            })
            .transpose()
    }
}

impl SyncLyricsConfig {
    /// Get the configuration directory path (~/.config/synclyrics/)
    #[must_use]
    pub fn config_dir() -> PathBuf {
        crate::paths::config_dir()
    }

    /// Get the config file path (~/.config/synclyrics/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Load config from file or create template on first run.
    ///
    /// `transport_templates` are appended to the base template so each
    /// transport crate documents its own section.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigNotFound`] after writing the template on
    /// first run, or an error if the file cannot be read, parsed or validated.
    pub fn load_or_create(transport_templates: Option<&[&str]>) -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::write(&config_path, build_config_template(transport_templates))?;

            return Err(CoreError::ConfigNotFound { path: config_path });
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors or invalid values.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigInvalid`] for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        let frame_rate = self.ui.animation.frame_rate;
        if frame_rate == 0 || frame_rate > MAX_FRAME_RATE {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "ui.animation.frame_rate must be in 1..={MAX_FRAME_RATE}, got {frame_rate}"
                ),
            });
        }
        if self.sync.offset_step_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "sync.offset_step_ms must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// Build the full config template from the base plus transport sections.
#[must_use]
pub fn build_config_template(transport_templates: Option<&[&str]>) -> String {
    let mut template = BASE_CONFIG_TEMPLATE.to_string();
    for section in transport_templates.unwrap_or_default() {
        template.push('\n');
        template.push_str(section);
    }
    template
}

const BASE_CONFIG_TEMPLATE: &str = r#"# SyncLyrics Configuration
# ~/.config/synclyrics/config.toml

[sync]
# Fixed latency compensation added to the estimated position (milliseconds)
auto_offset_ms = 500
# How far each offset button nudges the lyrics (milliseconds)
offset_step_ms = 500

[ui.animation]
# Highlight driver frames per second
frame_rate = 60

[logging]
# Also write logs to ~/.cache/synclyrics/synclyrics.log
enabled = false
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct FakeTransport {
        url: String,
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SyncLyricsConfig::from_toml("").unwrap();
        assert_eq!(config.sync.auto_offset_ms, 500);
        assert_eq!(config.sync.offset_step_ms, 500);
        assert_eq!(config.ui.animation.frame_rate, 60);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_base_template_parses() {
        let config = SyncLyricsConfig::from_toml(&build_config_template(None)).unwrap();
        assert_eq!(config.ui.animation.frame_rate, 60);
    }

    #[test]
    fn test_template_includes_transport_sections() {
        let template = build_config_template(Some(&["[transport.fake]\nurl = \"ws://x\"\n"]));
        let config = SyncLyricsConfig::from_toml(&template).unwrap();
        let fake: Option<FakeTransport> = config.transport.get("fake").unwrap();
        assert_eq!(
            fake,
            Some(FakeTransport {
                url: "ws://x".into()
            })
        );
    }

    #[test]
    fn test_missing_transport_is_none() {
        let config = SyncLyricsConfig::default();
        let fake: Option<FakeTransport> = config.transport.get("fake").unwrap();
        assert!(fake.is_none());
    }

    #[test]
    fn test_mismatched_transport_is_invalid() {
        let config = SyncLyricsConfig::from_toml("[transport.fake]\nurl = 3\n").unwrap();
        let result: Result<Option<FakeTransport>> = config.transport.get("fake");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_zero_frame_rate_rejected() {
        let result = SyncLyricsConfig::from_toml("[ui.animation]\nframe_rate = 0\n");
        assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let result = SyncLyricsConfig::from_toml("[sync\n");
        assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
    }

    #[test]
    fn test_offset_conversions() {
        let sync = SyncConfig {
            auto_offset_ms: -250,
            offset_step_ms: 100,
        };
        assert!((sync.auto_offset_secs() + 0.25).abs() < f64::EPSILON);
        assert!((sync.offset_step_secs() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_frame_interval() {
        let animation = AnimationConfig { frame_rate: 50 };
        assert_eq!(animation.frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_frame_rate_bounds() {
        let with_rate = |frame_rate: u32| {
            SyncLyricsConfig::from_toml(&format!("[ui.animation]\nframe_rate = {frame_rate}\n"))
        };

        let at_limit = with_rate(MAX_FRAME_RATE).unwrap();
        assert!(at_limit.ui.animation.frame_interval() > Duration::ZERO);

        for frame_rate in [0, MAX_FRAME_RATE + 1, 2_000_000_000] {
            let result = with_rate(frame_rate);
            assert!(
                matches!(result, Err(CoreError::ConfigInvalid { .. })),
                "frame_rate = {frame_rate}"
            );
        }
    }
}
