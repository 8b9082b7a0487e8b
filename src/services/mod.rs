// Linkshelf services
// Services talk to the outside world: the linkding API, the local cache, settings and the native bookmark tree.

pub mod bookmark_cache;
pub mod bookmarks_bar_sync;
pub mod linkding_client;
pub mod settings_engine;
