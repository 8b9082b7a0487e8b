use serde::{Deserialize, Serialize};

/// Top-level settings container, persisted as `settings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtensionSettings {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub popup: ViewSettings,
    #[serde(default)]
    pub side_panel: ViewSettings,
}

impl ExtensionSettings {
    /// Per-view flags for the given surface.
    pub fn view_settings(&self, mode: DisplayMode) -> &ViewSettings {
        match mode {
            DisplayMode::Popup => &self.popup,
            DisplayMode::Sidebar => &self.side_panel,
        }
    }
}

/// Where the linkding instance lives and how to authenticate against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConnectionSettings {
    pub linkding_url: String,
    pub api_token: String,
}

/// How the toolbar action opens the bookmark list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Popup,
    Sidebar,
}

/// What each bookmark row shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewSettings {
    pub show_tags: bool,
    pub show_actions: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_tags: true,
            show_actions: true,
        }
    }
}
