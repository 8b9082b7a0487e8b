// Linkshelf platform paths
//
// Linux:   $XDG_CONFIG_HOME/linkshelf, $XDG_CACHE_HOME/linkshelf
// macOS:   ~/Library/Application Support/Linkshelf, ~/Library/Caches/Linkshelf
// Windows: %APPDATA%/Linkshelf, %LOCALAPPDATA%/Linkshelf/cache

use std::env;
use std::path::PathBuf;

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("linkshelf"),
            _ => home_dir().join(".config").join("linkshelf"),
        }
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Linkshelf")
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join("Linkshelf")
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".linkshelf")
    }
}

/// Directory holding the bookmark cache database.
pub fn get_cache_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        match env::var("XDG_CACHE_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("linkshelf"),
            _ => home_dir().join(".cache").join("linkshelf"),
        }
    }
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library").join("Caches").join("Linkshelf")
    }
    #[cfg(target_os = "windows")]
    {
        let local_appdata = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Local"));
        PathBuf::from(local_appdata).join("Linkshelf").join("cache")
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".linkshelf").join("cache")
    }
}

/// Default location of the cache database.
pub fn default_cache_db_path() -> PathBuf {
    get_cache_dir().join("cache.db")
}
