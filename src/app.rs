//! App Core for Linkshelf.
//!
//! Holds the cache database and the settings engine, and builds the
//! linkding client and bookmark view-model from the stored connection.

use std::sync::Arc;

use log::info;

use crate::database::connection::Database;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::services::bookmark_cache::BookmarkCache;
use crate::services::linkding_client::{clean_base_url, BookmarkApi, LinkdingClient};
use crate::services::settings_engine::{ConnectionConfig, SettingsEngine, SettingsEngineTrait};
use crate::types::errors::ConfigError;

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
}

impl App {
    /// Opens the cache database and loads settings.
    ///
    /// `settings_path` overrides the platform `settings.json` location.
    pub fn new(db_path: &str, settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(
            Database::open(db_path).map_err(|e| format!("Cache database init failed: {}", e))?,
        );
        let mut settings_engine = SettingsEngine::new(settings_path);
        settings_engine.load()?;
        Ok(Self { db, settings_engine })
    }

    /// The stored connection, with `url` / `token` taking precedence when given.
    pub fn connection_config(
        &self,
        url: Option<&str>,
        token: Option<&str>,
    ) -> Result<ConnectionConfig, ConfigError> {
        let mut settings = self.settings_engine.get_settings().clone();
        if let Some(url) = url {
            settings.connection.linkding_url = url.to_string();
        }
        if let Some(token) = token {
            settings.connection.api_token = token.to_string();
        }
        settings.connection_config()
    }

    /// Builds a view-model talking to `config`, cached in this app's database.
    pub fn bookmark_manager(&self, config: &ConnectionConfig) -> BookmarkManager<LinkdingClient> {
        let client = LinkdingClient::new(&config.base_url, &config.api_token);
        let cache = BookmarkCache::new(self.db.clone(), &config.base_url);
        BookmarkManager::new(client, Some(cache))
    }

    /// Probes `url` with `token` and stores them only if the server answers.
    pub async fn configure(&mut self, url: &str, token: &str) -> Result<ConnectionConfig, Box<dyn std::error::Error>> {
        let client = LinkdingClient::new(url, token);
        self.configure_with(&client, url, token).await
    }

    /// Same as [`App::configure`], probing through `api`.
    pub async fn configure_with<A: BookmarkApi + ?Sized>(
        &mut self,
        api: &A,
        url: &str,
        token: &str,
    ) -> Result<ConnectionConfig, Box<dyn std::error::Error>> {
        let base_url = clean_base_url(url);
        if base_url.is_empty() {
            return Err(ConfigError::MissingUrl.into());
        }
        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken.into());
        }
        if !api.probe().await {
            return Err(ConfigError::ConnectionFailed(base_url).into());
        }
        self.settings_engine.set_connection(&base_url, token)?;
        info!("connected to {}", base_url);
        Ok(self.settings_engine.get_settings().connection_config()?)
    }
}
