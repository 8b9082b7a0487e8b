//! Unit tests for the settings engine: defaults, persistence and dot-key updates.

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkshelf::types::errors::{ConfigError, SettingsError};
use linkshelf::types::settings::{DisplayMode, ExtensionSettings};

fn engine_in(dir: &TempDir) -> SettingsEngine {
    let path = dir.path().join("settings.json").to_string_lossy().to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings, ExtensionSettings::default());
    assert_eq!(settings.display_mode, DisplayMode::Popup);
    assert!(settings.popup.show_tags && settings.popup.show_actions);
    assert!(settings.side_panel.show_tags && settings.side_panel.show_actions);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{"display_mode":"sidebar","popup":{"show_tags":false,"show_actions":true}}"#,
    )
    .unwrap();
    let mut engine = engine_in(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.display_mode, DisplayMode::Sidebar);
    assert!(!settings.view_settings(DisplayMode::Popup).show_tags);
    assert!(settings.view_settings(DisplayMode::Sidebar).show_tags);
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
    let mut engine = engine_in(&dir);
    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[rstest]
#[case("popup.show_tags", json!(false))]
#[case("popup.show_actions", json!(false))]
#[case("side_panel.show_tags", json!(false))]
#[case("side_panel.show_actions", json!(false))]
#[case("display_mode", json!("sidebar"))]
fn test_set_value_persists(#[case] key: &str, #[case] value: serde_json::Value) {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value(key, value.clone()).unwrap();

    let mut reloaded = engine_in(&dir);
    let settings = reloaded.load().unwrap();
    let stored = serde_json::to_value(&settings).unwrap();
    let found = key
        .split('.')
        .fold(&stored, |node, part| &node[part]);
    assert_eq!(found, &value);
}

#[rstest]
#[case("")]
#[case("popup.colour")]
#[case("theme.accent")]
fn test_unknown_keys_rejected(#[case] key: &str) {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    assert!(matches!(
        engine.set_value(key, json!(true)),
        Err(SettingsError::InvalidKey(_))
    ));
}

#[test]
fn test_wrong_value_type_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    assert!(matches!(
        engine.set_value("display_mode", json!("fullscreen")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert!(matches!(
        engine.set_value("popup.show_tags", json!("yes")),
        Err(SettingsError::InvalidValue(_))
    ));
    assert_eq!(engine.get_settings().display_mode, DisplayMode::Popup);
}

#[test]
fn test_set_connection_cleans_url() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine
        .set_connection("  https://links.example/ ", " secret ")
        .unwrap();

    let mut reloaded = engine_in(&dir);
    let config = reloaded.load().unwrap().connection_config().unwrap();
    assert_eq!(config.base_url, "https://links.example");
    assert_eq!(config.api_token, "secret");
}

#[test]
fn test_connection_config_reports_missing_parts() {
    let mut settings = ExtensionSettings::default();
    assert_eq!(settings.connection_config(), Err(ConfigError::MissingUrl));
    settings.connection.linkding_url = "https://links.example".to_string();
    settings.connection.api_token = "   ".to_string();
    assert_eq!(settings.connection_config(), Err(ConfigError::MissingToken));
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_value("display_mode", json!("sidebar")).unwrap();
    engine.reset().unwrap();
    assert_eq!(engine.get_settings(), &ExtensionSettings::default());
}
