//! Configuration management

use crate::error::{ErrorContext, LeafletError, LeafletResult};
use crate::logging::LoggingConfig;
use crate::types::{AiConfig, DocumentationConfig, DEFAULT_PORT, DEFAULT_SAMPLE_BUDGET};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration file (`leaflet.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafletConfig {
    pub ai: AiSettings,
    pub documentation: DocumentationConfig,
    pub inventory: InventoryConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// AI settings as stored on disk; the key itself normally comes from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        let defaults = AiConfig::default();
        Self {
            api_key: None,
            model: defaults.model,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }
}

impl AiSettings {
    pub fn to_ai_config(&self) -> AiConfig {
        AiConfig {
            api_key: self.api_key.clone().unwrap_or_default(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Patterns added on top of the built-in ignore list
    pub extra_ignore_patterns: Vec<String>,
    /// Byte budget for the source sample
    pub sample_budget: usize,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            extra_ignore_patterns: vec![],
            sample_budget: DEFAULT_SAMPLE_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where finished analyses are stored, one directory per analysis
    pub output_dir: PathBuf,
    /// Where imported repositories are cloned or copied
    pub temp_dir: PathBuf,
    /// Where hosted documentation is published
    pub hosted_dir: PathBuf,
    /// Age after which imported repositories are removed
    pub temp_max_age_hours: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = data_dir();
        Self {
            output_dir: base.join("output"),
            temp_dir: base.join("temp"),
            hosted_dir: base.join("hosted_docs"),
            temp_max_age_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Base directory for Leaflet data (`~/.local/share/leaflet` on Linux)
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("leaflet")
}

/// Default config file location (`~/.config/leaflet/leaflet.toml` on Linux)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leaflet")
        .join("leaflet.toml")
}

impl LeafletConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LeafletResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LeafletError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        toml::from_str(&content).map_err(|e| LeafletError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Load from `path` if given, else from the default location if it exists, else defaults
    pub fn load(path: Option<&Path>) -> LeafletResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LeafletResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| LeafletError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| LeafletError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Environment variables win over file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.ai.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                self.ai.model = model;
            }
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("LEAFLET_OUTPUT_DIR") {
            self.storage.output_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> LeafletResult<()> {
        if self.ai.model.trim().is_empty() {
            return Err(invalid("ai.model must not be empty", "Set ai.model, e.g. gemini-1.5-flash"));
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(invalid(
                "ai.temperature must be between 0.0 and 2.0",
                "Set ai.temperature to a value such as 0.3",
            ));
        }

        if self.ai.max_tokens == 0 {
            return Err(invalid(
                "ai.max_tokens must be greater than 0",
                "Set ai.max_tokens to a positive value",
            ));
        }

        for pattern in &self.inventory.extra_ignore_patterns {
            if let Err(e) = glob_syntax_check(pattern) {
                return Err(invalid(
                    &format!("inventory.extra_ignore_patterns contains '{}': {}", pattern, e),
                    "Use glob syntax such as 'target/**' or '*.tmp'",
                ));
            }
        }

        if self.logging.log_to_file && self.logging.log_file_path.is_none() {
            return Err(invalid(
                "logging.log_file_path is required when logging.log_to_file is true",
                "Set logging.log_file_path or turn off logging.log_to_file",
            ));
        }

        if self.server.port == 0 {
            return Err(invalid(
                "server.port must be greater than 0",
                "Set server.port to a free TCP port",
            ));
        }

        Ok(())
    }
}

fn invalid(message: &str, suggestion: &str) -> LeafletError {
    LeafletError::Config {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}

/// Cheap structural check; full compilation happens in the inventory matcher
fn glob_syntax_check(pattern: &str) -> Result<(), &'static str> {
    if pattern.trim().is_empty() {
        return Err("pattern is empty");
    }
    let opens = pattern.matches('[').count();
    let closes = pattern.matches(']').count();
    if opens != closes {
        return Err("unbalanced character class");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = LeafletConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.inventory.sample_budget, 50_000);
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("leaflet.toml");

        let mut config = LeafletConfig::default();
        config.ai.model = "gemini-1.5-pro".to_string();
        config.inventory.extra_ignore_patterns = vec!["target/**".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = LeafletConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ai.model, "gemini-1.5-pro");
        assert_eq!(loaded.inventory.extra_ignore_patterns, vec!["target/**"]);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaflet.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let loaded = LeafletConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.ai.max_tokens, 4000);
    }

    #[test]
    fn logging_section_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaflet.toml");
        std::fs::write(&path, "[logging]\nformat = \"json\"\nlog_to_file = true\n").unwrap();

        let loaded = LeafletConfig::from_file(&path).unwrap();
        assert_eq!(loaded.logging.format, crate::LogFormat::Json);
        assert!(loaded.validate().is_err());

        let mut fixed = loaded;
        fixed.logging.log_file_path = Some("leaflet.log".to_string());
        assert!(fixed.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = LeafletConfig::default();
        config.ai.temperature = 5.0;
        assert!(matches!(config.validate(), Err(LeafletError::Config { .. })));

        let mut config = LeafletConfig::default();
        config.inventory.extra_ignore_patterns = vec!["[abc".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaflet.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(
            LeafletConfig::from_file(&path),
            Err(LeafletError::Config { .. })
        ));
    }
}
