use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Settings;

/// Configuration manager for the perception engine's runtime settings.
/// Separates schema (valid ranges, descriptions) from the persisted
/// values themselves. Settings are stored in `config.json` in the
/// current working directory by default.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Available configuration options with validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub display: DisplayConfigSchema,
    pub engine: EngineConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfigSchema {
    pub columns: ConfigOption<u16>,
    pub lines: ConfigOption<u16>,
    pub fps: ConfigOption<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfigSchema {
    pub sample_rate: ConfigOption<u32>,
    pub period_response_hz: ConfigOption<f64>,
    pub octave_bandwidth: ConfigOption<f64>,
    pub octaves: ConfigOption<f64>,
    pub bandwidth_factor: ConfigOption<f64>,
    pub scale_factor: ConfigOption<f64>,
    pub starting_note: ConfigOption<i32>,
    pub a4_hz: ConfigOption<f64>,
}

/// Configuration option with validation and available choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
    pub requires_restart: bool,
}

/// Persisted configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager. If no path is provided,
    /// defaults to `config.json` in the current working directory.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("config.json"));

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    /// Load settings from the configuration file. Returns default
    /// settings (and writes them out) if the file doesn't exist.
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "config file version {} doesn't match application version {}, using defaults for new settings",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to the configuration file.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            modified_at: chrono::Utc::now().to_rfc3339(),
        };

        let content =
            serde_json::to_string_pretty(&config_file).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Update settings and persist them.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Configuration schema with valid ranges and descriptions.
    pub fn schema() -> ConfigSchema {
        ConfigSchema {
            display: DisplayConfigSchema {
                columns: ConfigOption {
                    default: 80,
                    valid_range: Some((20, 512)),
                    valid_choices: None,
                    description: "terminal width, in columns".to_string(),
                    requires_restart: true,
                },
                lines: ConfigOption {
                    default: 24,
                    valid_range: Some((4, 256)),
                    valid_choices: None,
                    description: "terminal height, in rows".to_string(),
                    requires_restart: true,
                },
                fps: ConfigOption {
                    default: 60,
                    valid_range: Some((1, 240)),
                    valid_choices: None,
                    description: "display refresh rate in frames per second".to_string(),
                    requires_restart: false,
                },
            },
            engine: EngineConfigSchema {
                sample_rate: ConfigOption {
                    default: 44100,
                    valid_range: None,
                    valid_choices: Some(vec![8000, 16000, 22050, 44100, 48000, 96000]),
                    description: "input sample rate in Hz".to_string(),
                    requires_restart: true,
                },
                period_response_hz: ConfigOption {
                    default: 60.0,
                    valid_range: Some((0.1, 1000.0)),
                    valid_choices: None,
                    description: "responsiveness, in Hz, of the period-lifecycle smoother".to_string(),
                    requires_restart: true,
                },
                octave_bandwidth: ConfigOption {
                    default: 12.0,
                    valid_range: Some((1.0, 96.0)),
                    valid_choices: None,
                    description: "sensors per octave in the period array".to_string(),
                    requires_restart: true,
                },
                octaves: ConfigOption {
                    default: 4.0,
                    valid_range: Some((0.1, 10.0)),
                    valid_choices: None,
                    description: "octaves below the base period the array spans".to_string(),
                    requires_restart: true,
                },
                bandwidth_factor: ConfigOption {
                    default: 1.0,
                    valid_range: Some((0.01, 100.0)),
                    valid_choices: None,
                    description: "per-sensor bandwidth scale relative to the array's base bandwidth".to_string(),
                    requires_restart: true,
                },
                scale_factor: ConfigOption {
                    default: 2.0,
                    valid_range: Some((1.01, 16.0)),
                    valid_choices: None,
                    description: "ratio between a scale-space sensor's three internal bandwidths".to_string(),
                    requires_restart: true,
                },
                starting_note: ConfigOption {
                    default: -21,
                    valid_range: Some((-108, 39)),
                    valid_choices: None,
                    description: "base period of the array, as semitones from A4".to_string(),
                    requires_restart: true,
                },
                a4_hz: ConfigOption {
                    default: 440.0,
                    valid_range: Some((220.0, 880.0)),
                    valid_choices: None,
                    description: "reference pitch for note names, in Hz".to_string(),
                    requires_restart: false,
                },
            },
        }
    }

    /// Validate settings against the schema.
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        if let Some((min, max)) = schema.display.columns.valid_range {
            if settings.columns < min || settings.columns > max {
                errors.push(format!("columns must be between {} and {}", min, max));
            }
        }
        if let Some((min, max)) = schema.display.lines.valid_range {
            if settings.lines < min || settings.lines > max {
                errors.push(format!("lines must be between {} and {}", min, max));
            }
        }
        if let Some((min, max)) = schema.display.fps.valid_range {
            if settings.fps < min || settings.fps > max {
                errors.push(format!("fps must be between {} and {}", min, max));
            }
        }
        if let Some(choices) = &schema.engine.sample_rate.valid_choices {
            if !choices.contains(&settings.sample_rate) {
                errors.push(format!("sample_rate must be one of: {:?}", choices));
            }
        }
        if let Some((min, max)) = schema.engine.octave_bandwidth.valid_range {
            if settings.octave_bandwidth < min || settings.octave_bandwidth > max {
                errors.push(format!("octave_bandwidth must be between {} and {}", min, max));
            }
        }
        if let Some((min, max)) = schema.engine.scale_factor.valid_range {
            if settings.scale_factor < min || settings.scale_factor > max {
                errors.push(format!("scale_factor must be between {} and {}", min, max));
            }
        }
        if let Some((min, max)) = schema.engine.starting_note.valid_range {
            if settings.starting_note < min || settings.starting_note > max {
                errors.push(format!("starting_note must be between {} and {}", min, max));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset settings to defaults and persist them.
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }
}

/// Configuration error types.
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => write!(f, "config validation errors: {}", errors.join(", ")),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn new_manager_defaults_to_default_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let manager = ConfigManager::new(Some(config_path.clone()));
        assert_eq!(manager.config_path(), config_path);
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn save_and_load_round_trips_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));

        let mut settings = Settings::default();
        settings.columns = 120;
        settings.sample_rate = 48000;

        manager.update_settings(settings.clone()).unwrap();

        let mut manager2 = ConfigManager::new(Some(config_path));
        let loaded = manager2.load().unwrap();

        assert_eq!(loaded.columns, 120);
        assert_eq!(loaded.sample_rate, 48000);
    }

    #[test]
    fn validation_catches_out_of_range_settings() {
        let mut settings = Settings::default();
        assert!(ConfigManager::validate_settings(&settings).is_ok());

        settings.columns = 1000;
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.columns = 80;
        settings.sample_rate = 12345;
        assert!(ConfigManager::validate_settings(&settings).is_err());
    }

    #[test]
    fn schema_describes_every_tunable() {
        let schema = ConfigManager::schema();
        assert!(schema.display.fps.default > 0);
        assert!(!schema.engine.a4_hz.description.is_empty());
        assert!(schema.engine.octave_bandwidth.valid_range.is_some());
    }
}
