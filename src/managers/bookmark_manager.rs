//! Bookmark Manager for Linkshelf.
//!
//! The view-model behind the popup, side panel and full-tab manager: it owns
//! the flat bookmark list (through [`TagIndex`]), the selected folder and the
//! load state, and routes every mutation through the remote API first. Local
//! state only changes after the server accepted the write.

use std::sync::Arc;

use futures::future::join_all;
use log::{info, warn};
use serde::Serialize;

use crate::managers::tag_index::{
    self, parse_tag_input, sibling_tag, sort_for_display, validate_folder_name, TagIndex,
};
use crate::services::bookmark_cache::{BookmarkCache, BookmarkCacheTrait, CACHE_TTL};
use crate::services::linkding_client::BookmarkApi;
use crate::types::bookmark::{Bookmark, BookmarkEdit, NewBookmark};
use crate::types::errors::{ApiError, BookmarkError, ValidationError};
use crate::types::interaction::{ContextMenuHost, ContextMenuItem, DragSource, FolderAction};
use crate::types::tag::{BookmarksByTag, UNTAGGED};

/// Which screen the surrounding UI should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Loaded,
    /// Loaded data is older than the cache TTL; a refresh is due.
    Stale,
    Error(String),
}

/// View-model over a remote bookmark collection.
pub struct BookmarkManager<A: BookmarkApi> {
    api: A,
    cache: Option<BookmarkCache>,
    index: TagIndex,
    current_tag: Option<String>,
    state: ViewState,
    loaded_at: Option<i64>,
}

impl<A: BookmarkApi> BookmarkManager<A> {
    pub fn new(api: A, cache: Option<BookmarkCache>) -> Self {
        Self {
            api,
            cache,
            index: TagIndex::default(),
            current_tag: None,
            state: ViewState::Loading,
            loaded_at: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn current_tag(&self) -> Option<&str> {
        self.current_tag.as_deref()
    }

    // ─── Loading ───

    /// Loads bookmarks, from the cache when fresh unless `force` is set.
    ///
    /// On failure the previous list is kept and the state becomes `Error`.
    pub async fn load(&mut self, force: bool) -> Result<(), BookmarkError> {
        self.state = ViewState::Loading;
        match self.fetch(force).await {
            Ok((bookmarks, loaded_at)) => {
                info!("loaded {} bookmarks", bookmarks.len());
                self.index.replace_all(bookmarks);
                self.loaded_at = Some(loaded_at);
                self.state = ViewState::Loaded;
                self.ensure_current_tag();
                Ok(())
            }
            Err(e) => {
                warn!("failed to load bookmarks: {}", e);
                self.state = ViewState::Error(format!("Failed to load bookmarks. Error: {}", e));
                Err(e)
            }
        }
    }

    async fn fetch(&self, force: bool) -> Result<(Vec<Bookmark>, i64), BookmarkError> {
        if !force {
            if let Some(cache) = &self.cache {
                match cache.load_fresh() {
                    Ok(Some(bookmarks)) => {
                        let at = cache
                            .cached_at()
                            .ok()
                            .flatten()
                            .unwrap_or_else(BookmarkCache::now_ms);
                        return Ok((bookmarks, at));
                    }
                    Ok(None) => {}
                    Err(e) => warn!("ignoring unreadable cache: {}", e),
                }
            }
        }

        let bookmarks = self.api.fetch_all().await?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&bookmarks) {
                warn!("could not cache bookmarks: {}", e);
            }
        }
        Ok((bookmarks, BookmarkCache::now_ms()))
    }

    /// Moves `Loaded` to `Stale` once the data is older than the cache TTL.
    pub fn mark_stale_if_expired(&mut self, now_ms: i64) -> bool {
        let ttl = self
            .cache
            .as_ref()
            .map(BookmarkCache::ttl)
            .unwrap_or(CACHE_TTL)
            .as_millis() as i64;
        match (self.state == ViewState::Loaded, self.loaded_at) {
            (true, Some(at)) if now_ms - at >= ttl => {
                self.state = ViewState::Stale;
                true
            }
            _ => false,
        }
    }

    fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate() {
                warn!("could not invalidate cache: {}", e);
            }
        }
    }

    // ─── Selection & queries ───

    /// Keeps the selected folder valid, falling back to the first bucket.
    fn ensure_current_tag(&mut self) {
        let valid = self
            .current_tag
            .as_deref()
            .is_some_and(|t| self.index.is_selectable(t));
        if !valid {
            self.current_tag = self.index.by_tag().keys().next().cloned();
        }
    }

    /// Opens a folder. Scaffolding nodes and unknown tags are not selectable.
    pub fn select_tag(&mut self, tag: &str) -> bool {
        if self.index.is_selectable(tag) {
            self.current_tag = Some(tag.to_string());
            true
        } else {
            false
        }
    }

    /// Bookmarks of the selected folder, sorted by display title.
    pub fn current_bookmarks(&self) -> Vec<Arc<Bookmark>> {
        let mut bookmarks = self
            .current_tag
            .as_deref()
            .map(|t| self.index.bookmarks_for(t).to_vec())
            .unwrap_or_default();
        sort_for_display(&mut bookmarks);
        bookmarks
    }

    /// Search across every bookmark, sorted by display title.
    pub fn search(&self, term: &str) -> Vec<Arc<Bookmark>> {
        let mut hits = tag_index::search(self.index.bookmarks(), term);
        sort_for_display(&mut hits);
        hits
    }

    /// Search results kept in their folders.
    pub fn search_grouped(&self, term: &str) -> BookmarksByTag {
        tag_index::filter_by_tag(self.index.by_tag(), term)
    }

    pub fn suggest_tags(&self, input: &str) -> Vec<String> {
        tag_index::suggest_tags(self.index.tags(), input)
    }

    // ─── Single-bookmark mutations ───

    fn existing(&self, id: i64) -> Result<Arc<Bookmark>, BookmarkError> {
        self.index.get(id).cloned().ok_or(BookmarkError::NotFound(id))
    }

    /// Sends `updated` to the server and files the returned record locally.
    async fn push_update(&mut self, updated: Bookmark) -> Result<Arc<Bookmark>, BookmarkError> {
        let saved = self.api.update(&updated).await?;
        let id = saved.id;
        self.index.upsert(saved);
        self.invalidate_cache();
        self.ensure_current_tag();
        self.existing(id)
    }

    /// Creates a bookmark; a blank title falls back to the url.
    pub async fn add_bookmark(
        &mut self,
        url: &str,
        title: Option<&str>,
    ) -> Result<Arc<Bookmark>, BookmarkError> {
        let created = self.api.create(&NewBookmark::new(url, title)).await?;
        let id = created.id;
        self.index.upsert(created);
        self.invalidate_cache();
        self.ensure_current_tag();
        self.existing(id)
    }

    /// Applies form edits and saves the full record.
    pub async fn edit_bookmark(
        &mut self,
        id: i64,
        edit: BookmarkEdit,
    ) -> Result<Arc<Bookmark>, BookmarkError> {
        let mut updated = Bookmark::clone(&*self.existing(id)?);
        if let Some(url) = edit.url {
            updated.url = url;
        }
        if let Some(title) = edit.title {
            updated.title = title;
        }
        if let Some(description) = edit.description {
            updated.description = description;
        }
        if let Some(tags) = edit.tags {
            updated.tag_names = parse_tag_input(&tags);
        }
        self.push_update(updated).await
    }

    pub async fn delete_bookmark(&mut self, id: i64) -> Result<(), BookmarkError> {
        self.existing(id)?;
        self.api.delete(id).await?;
        self.index.remove_bookmark(id);
        self.invalidate_cache();
        self.ensure_current_tag();
        Ok(())
    }

    /// Drops a single tag from one bookmark.
    pub async fn remove_tag(&mut self, id: i64, tag: &str) -> Result<Arc<Bookmark>, BookmarkError> {
        let bookmark = self.existing(id)?;
        let tags = bookmark
            .tag_names
            .iter()
            .filter(|t| t.as_str() != tag)
            .cloned()
            .collect();
        self.push_update(bookmark.with_tags(tags)).await
    }

    /// Retags a bookmark dragged from folder `from` onto folder `to`.
    ///
    /// Returns `false` without a remote call when `from == to`.
    pub async fn move_bookmark(&mut self, id: i64, from: &str, to: &str) -> Result<bool, BookmarkError> {
        if from == to {
            return Ok(false);
        }
        let updated = self
            .index
            .plan_move(id, from, to)
            .ok_or(BookmarkError::NotFound(id))?;
        self.push_update(updated).await?;
        Ok(true)
    }

    /// Completes a drop of whatever `source` carries onto folder `target`.
    pub async fn handle_drop(
        &mut self,
        source: &dyn DragSource,
        target: &str,
    ) -> Result<bool, BookmarkError> {
        match source.payload() {
            Some(payload) => self.move_bookmark(payload.id, &payload.source_tag, target).await,
            None => Ok(false),
        }
    }

    // ─── Folder operations ───

    /// Creates an empty (virtual) folder. Nothing is sent to the server until
    /// a bookmark is moved into it.
    pub fn create_folder(&mut self, parent: &str, name: &str) -> Result<String, BookmarkError> {
        Ok(self.index.add_virtual_folder(parent, name)?)
    }

    /// Renames the last segment of `tag`, carrying every sub-folder along.
    pub async fn rename_folder(&mut self, tag: &str, new_name: &str) -> Result<String, BookmarkError> {
        if tag == UNTAGGED {
            return Err(ValidationError::UntaggedFolder.into());
        }
        let name = validate_folder_name(new_name)?;
        let new_tag = sibling_tag(tag, &name);
        if new_tag == tag {
            return Ok(new_tag);
        }
        if self.index.has_folder(&new_tag) {
            return Err(ValidationError::DuplicateFolder(new_tag).into());
        }

        let updates = self.index.plan_rename(tag, &new_tag);
        if !updates.is_empty() {
            let saved = self.run_batch(updates).await?;
            self.index.upsert_all(saved);
        }
        self.index.rename_virtual(tag, &new_tag);

        if let Some(renamed) = self
            .current_tag
            .as_deref()
            .and_then(|current| tag_index::replace_prefix(current, tag, &new_tag))
        {
            self.current_tag = Some(renamed);
        }
        self.ensure_current_tag();
        Ok(new_tag)
    }

    /// Removes `tag` and every sub-folder from all bookmarks. Returns how many
    /// bookmarks were updated.
    pub async fn remove_folder(&mut self, tag: &str) -> Result<usize, BookmarkError> {
        if tag == UNTAGGED {
            return Err(ValidationError::UntaggedFolder.into());
        }
        let updates = self.index.plan_remove(tag);
        let count = updates.len();
        if !updates.is_empty() {
            let saved = self.run_batch(updates).await?;
            self.index.upsert_all(saved);
        }
        self.index.remove_virtual(tag);
        self.ensure_current_tag();
        Ok(count)
    }

    /// Sends all updates concurrently. If any fails, nothing is patched
    /// locally; the list is reloaded from the server instead.
    async fn run_batch(&mut self, updates: Vec<Bookmark>) -> Result<Vec<Bookmark>, BookmarkError> {
        let total = updates.len();
        let results: Vec<Result<Bookmark, ApiError>> =
            join_all(updates.iter().map(|b| self.api.update(b))).await;
        self.invalidate_cache();

        let (saved, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
        if failed.is_empty() {
            info!("updated {} bookmarks", total);
            return Ok(saved.into_iter().filter_map(Result::ok).collect());
        }

        let first = failed
            .into_iter()
            .filter_map(Result::err)
            .collect::<Vec<_>>();
        warn!("{} of {} bookmark updates failed, resynchronising", first.len(), total);
        if let Err(e) = self.load(true).await {
            warn!("resynchronisation failed: {}", e);
        }
        Err(BookmarkError::BatchFailed {
            failed: first.len(),
            total,
            first: first.first().map(ToString::to_string).unwrap_or_default(),
        })
    }

    // ─── Context menu ───

    /// Shows the folder menu on `host`. Rename and remove are disabled for
    /// the untagged bucket.
    pub fn folder_menu(&self, host: &mut dyn ContextMenuHost, tag: &str) -> Vec<ContextMenuItem> {
        let editable = tag != UNTAGGED;
        let items: Vec<ContextMenuItem> = [
            (FolderAction::AddSubfolder, true),
            (FolderAction::Rename, editable),
            (FolderAction::Remove, editable),
        ]
        .into_iter()
        .map(|(action, enabled)| ContextMenuItem {
            action,
            label: action.label().to_string(),
            enabled,
        })
        .collect();
        host.show(tag, &items);
        items
    }

    /// Runs a menu choice. `name` is the user's answer to the add/rename prompt.
    ///
    /// Returns the resulting folder tag for add and rename.
    pub async fn apply_folder_action(
        &mut self,
        tag: &str,
        action: FolderAction,
        name: Option<&str>,
    ) -> Result<Option<String>, BookmarkError> {
        match action {
            FolderAction::AddSubfolder => {
                let name = name.ok_or(ValidationError::EmptyName)?;
                self.create_folder(tag, name).map(Some)
            }
            FolderAction::Rename => {
                let name = name.ok_or(ValidationError::EmptyName)?;
                self.rename_folder(tag, name).await.map(Some)
            }
            FolderAction::Remove => self.remove_folder(tag).await.map(|_| None),
        }
    }
}
