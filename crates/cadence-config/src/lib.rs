//! Cadence configuration system
//!
//! Loads settings from `cadence.toml`, with environment variables taking
//! precedence over file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "cadence.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CadenceConfig {
    /// Animator behaviour
    pub animator: AnimatorConfig,
    /// Reference engine settings
    pub engine: EngineConfig,
    /// Log output settings
    pub logging: LoggingConfig,
    /// Demo binary settings
    pub demo: DemoConfig,
}

/// How completion of a property is detected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSetting {
    /// Timer set to the computed duration
    #[default]
    Timer,
    /// Engine settle notification
    Settle,
}

impl std::str::FromStr for CompletionSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timer" => Ok(Self::Timer),
            "settle" => Ok(Self::Settle),
            other => Err(format!("unknown completion mode '{other}' (expected timer or settle)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Run a cycle for the initial trigger when the animator is created
    pub animate_on_mount: bool,
    pub completion: CompletionSetting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame length in milliseconds
    pub frame_ms: f64,
    /// Step the engine on a dedicated render thread
    pub threaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `cadence_motion=debug`
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Preset played when none is given on the command line
    pub preset: String,
    /// Extra presets to register (TOML `[presets.<name>.<property>]` tables)
    pub presets_file: Option<PathBuf>,
    /// Upper bound on frames rendered per trigger change
    pub max_frames: u32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            animate_on_mount: false,
            completion: CompletionSetting::Timer,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_ms: 16.0,
            threaded: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            preset: "fadeIn".to_string(),
            presets_file: None,
            max_frames: 600,
        }
    }
}

fn truthy(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl CadenceConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(CadenceConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file {}: {}", path.as_ref().display(), e))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load `cadence.toml` from the current directory, or defaults if it
    /// doesn't exist or can't be parsed
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable numbers are
    /// ignored.
    pub fn merge_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Animator settings
        if let Some(val) = lookup("CADENCE_ANIMATE_ON_MOUNT") {
            self.animator.animate_on_mount = truthy(&val);
        }
        if let Some(val) = lookup("CADENCE_COMPLETION") {
            if let Ok(mode) = val.parse() {
                self.animator.completion = mode;
            }
        }

        // Engine settings
        if let Some(val) = lookup("CADENCE_FRAME_MS") {
            if let Ok(frame_ms) = val.parse::<f64>() {
                if frame_ms > 0.0 {
                    self.engine.frame_ms = frame_ms;
                }
            }
        }
        if let Some(val) = lookup("CADENCE_THREADED") {
            self.engine.threaded = truthy(&val);
        }

        // Logging
        if let Some(filter) = lookup("CADENCE_LOG") {
            self.logging.filter = filter;
        }

        // Demo settings
        if let Some(preset) = lookup("CADENCE_PRESET") {
            self.demo.preset = preset;
        }
        if let Some(path) = lookup("CADENCE_PRESETS_FILE") {
            self.demo.presets_file = Some(PathBuf::from(path));
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from cadence.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CadenceConfig::default();
        assert!(!config.animator.animate_on_mount);
        assert_eq!(config.animator.completion, CompletionSetting::Timer);
        assert_eq!(config.engine.frame_ms, 16.0);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.demo.preset, "fadeIn");
    }

    #[test]
    fn test_toml_serialization() {
        let config = CadenceConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CadenceConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file() {
        let config = CadenceConfig::from_toml_str(
            r#"
            [animator]
            completion = "settle"

            [demo]
            preset = "bounceIn"
            presets_file = "demos/presets.toml"
            "#,
        )
        .unwrap();
        assert_eq!(config.animator.completion, CompletionSetting::Settle);
        assert_eq!(config.demo.preset, "bounceIn");
        assert_eq!(config.demo.presets_file, Some(PathBuf::from("demos/presets.toml")));
        assert_eq!(config.demo.max_frames, 600);
        assert!(!config.engine.threaded);
    }

    #[test]
    fn test_parse_error() {
        let err = CadenceConfig::from_toml_str("[engine]\nframe_ms = \"fast\"").unwrap_err();
        assert!(err.starts_with("Failed to parse config file"));
        assert!(CadenceConfig::load_from_file("does/not/exist.toml").is_err());
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if cadence.toml doesn't exist
        let config = CadenceConfig::load_or_default();
        assert!(config.engine.frame_ms > 0.0);
    }

    #[test]
    fn test_merge_with_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CADENCE_PRESET", "shake"),
            ("CADENCE_ANIMATE_ON_MOUNT", "TRUE"),
            ("CADENCE_COMPLETION", "Settle"),
            ("CADENCE_FRAME_MS", "8.5"),
            ("CADENCE_THREADED", "1"),
            ("CADENCE_LOG", "cadence_motion=debug"),
        ]);
        let mut config = CadenceConfig::default();
        config.merge_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.demo.preset, "shake");
        assert!(config.animator.animate_on_mount);
        assert_eq!(config.animator.completion, CompletionSetting::Settle);
        assert_eq!(config.engine.frame_ms, 8.5);
        assert!(config.engine.threaded);
        assert_eq!(config.logging.filter, "cadence_motion=debug");
    }

    #[test]
    fn test_merge_ignores_bad_values() {
        let mut config = CadenceConfig::default();
        config.merge_with(|key| match key {
            "CADENCE_FRAME_MS" => Some("-4".to_string()),
            "CADENCE_COMPLETION" => Some("eventually".to_string()),
            _ => None,
        });
        assert_eq!(config.engine.frame_ms, 16.0);
        assert_eq!(config.animator.completion, CompletionSetting::Timer);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("CADENCE_PRESETS_FILE", "extra.toml");
        }

        let mut config = CadenceConfig::default();
        config.merge_with_env();
        assert_eq!(config.demo.presets_file, Some(PathBuf::from("extra.toml")));

        unsafe {
            std::env::remove_var("CADENCE_PRESETS_FILE");
        }
    }
}
