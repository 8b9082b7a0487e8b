// Linkshelf Settings Engine
// Loads and saves the connection, display mode and per-view flags.
// Settings are stored as a JSON file at the platform-specific config path.

use std::fs;
use std::path::Path;

use log::debug;

use crate::platform;
use crate::services::linkding_client::clean_base_url;
use crate::types::errors::{ConfigError, SettingsError};
use crate::types::settings::ExtensionSettings;

/// Validated connection details ready to build a client from.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub api_token: String,
}

impl ExtensionSettings {
    /// The stored connection, cleaned and checked for completeness.
    pub fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        let base_url = clean_base_url(&self.connection.linkding_url);
        if base_url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let api_token = self.connection.api_token.trim().to_string();
        if api_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(ConnectionConfig { base_url, api_token })
    }
}

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ExtensionSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ExtensionSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn set_connection(&mut self, url: &str, token: &str) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ExtensionSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ExtensionSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults; a malformed one is a serialization error.
    fn load(&mut self) -> Result<ExtensionSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            debug!("no settings at {}, using defaults", self.config_path);
            self.settings = ExtensionSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    /// Updates one setting by dot-notation key path and saves.
    ///
    /// - `"display_mode"` → `"popup"` or `"sidebar"`
    /// - `"popup.show_tags"` → `true`
    /// - `"side_panel.show_actions"` → `false`
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| SettingsError::InvalidKey(key.to_string()))?;

        let mut current = &mut json_value;
        for part in parents {
            current = current
                .get_mut(*part)
                .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        }
        match current {
            serde_json::Value::Object(map) if map.contains_key(*last) => {
                map.insert(last.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )))
            }
        }

        // Round-trip through the typed struct to reject values of the wrong shape
        self.settings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.save()
    }

    /// Stores a cleaned base url and token, then saves.
    fn set_connection(&mut self, url: &str, token: &str) -> Result<(), SettingsError> {
        self.settings.connection.linkding_url = clean_base_url(url);
        self.settings.connection.api_token = token.trim().to_string();
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ExtensionSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
