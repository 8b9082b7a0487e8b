//! Tag index: groups a flat bookmark list by tag and derives the folder tree.
//!
//! The free functions are pure transforms over tag sets; [`TagIndex`] owns
//! the flat list plus the views derived from it and recomputes them on every
//! change.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::managers::tag_tree::{build_tree, TagTreeNode};
use crate::types::bookmark::Bookmark;
use crate::types::errors::ValidationError;
use crate::types::tag::{BookmarksByTag, TAG_SEPARATOR, UNTAGGED};

/// Files every bookmark under each of its tags, or under [`UNTAGGED`] if it has none.
pub fn group_by_tag(bookmarks: &[Arc<Bookmark>]) -> BookmarksByTag {
    let mut by_tag = BookmarksByTag::new();
    for bookmark in bookmarks {
        if bookmark.tag_names.is_empty() {
            by_tag
                .entry(UNTAGGED.to_string())
                .or_default()
                .push(Arc::clone(bookmark));
            continue;
        }
        for tag in &bookmark.tag_names {
            by_tag
                .entry(tag.clone())
                .or_default()
                .push(Arc::clone(bookmark));
        }
    }
    by_tag
}

/// `true` if `tag` is `prefix` itself or lies beneath it in the hierarchy.
///
/// `work` matches `work` and `work.sub` but never `workshop`.
pub fn matches_prefix(tag: &str, prefix: &str) -> bool {
    match tag.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(TAG_SEPARATOR),
        None => false,
    }
}

fn dedup_preserving_order(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// `tag` with its `old_prefix` part swapped for `new_prefix`, or `None` when
/// `tag` is not at or beneath `old_prefix`.
pub fn replace_prefix(tag: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    matches_prefix(tag, old_prefix).then(|| format!("{}{}", new_prefix, &tag[old_prefix.len()..]))
}

/// Replaces the `old_prefix` part of every matching tag with `new_prefix`.
pub fn rename_tags(tags: &[String], old_prefix: &str, new_prefix: &str) -> Vec<String> {
    dedup_preserving_order(
        tags.iter()
            .map(|tag| replace_prefix(tag, old_prefix, new_prefix).unwrap_or_else(|| tag.clone())),
    )
}

/// Drops every tag equal to or beneath `prefix`.
pub fn remove_tags(tags: &[String], prefix: &str) -> Vec<String> {
    tags.iter()
        .filter(|tag| !matches_prefix(tag, prefix))
        .cloned()
        .collect()
}

/// Swaps `from` for `to`. Dropping onto [`UNTAGGED`] only removes `from`.
pub fn move_tags(tags: &[String], from: &str, to: &str) -> Vec<String> {
    if from == to {
        return tags.to_vec();
    }
    let mut next: Vec<String> = tags
        .iter()
        .filter(|t| t.as_str() != from && t.as_str() != UNTAGGED)
        .cloned()
        .collect();
    if to != UNTAGGED {
        next.push(to.to_string());
    }
    dedup_preserving_order(next)
}

/// Every distinct tag in use, sorted.
pub fn all_tags(bookmarks: &[Arc<Bookmark>]) -> Vec<String> {
    bookmarks
        .iter()
        .flat_map(|b| b.tag_names.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Splits comma-separated tag input, trimming and dropping empty or repeated entries.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    dedup_preserving_order(
        input
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    )
}

/// Autocomplete for the last term of a comma-separated tag input.
pub fn suggest_tags(known: &[String], input: &str) -> Vec<String> {
    let terms: Vec<&str> = input.split(',').map(str::trim).collect();
    let current = terms.last().map(|t| t.to_lowercase()).unwrap_or_default();
    if current.is_empty() {
        return Vec::new();
    }
    known
        .iter()
        .filter(|tag| tag.to_lowercase().starts_with(&current) && !terms.contains(&tag.as_str()))
        .cloned()
        .collect()
}

fn matches_term(bookmark: &Bookmark, term: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(term);
    hit(&bookmark.title)
        || bookmark.website_title.as_deref().is_some_and(hit)
        || hit(&bookmark.description)
        || hit(&bookmark.url)
        || bookmark.tag_names.iter().any(|t| hit(t))
}

/// Case-insensitive substring search over title, website title, description, url and tags.
///
/// A blank term matches everything.
pub fn search(bookmarks: &[Arc<Bookmark>], term: &str) -> Vec<Arc<Bookmark>> {
    let term = term.trim().to_lowercase();
    bookmarks
        .iter()
        .filter(|b| term.is_empty() || matches_term(b, &term))
        .cloned()
        .collect()
}

/// Applies [`search`] per bucket, dropping buckets left empty.
pub fn filter_by_tag(by_tag: &BookmarksByTag, term: &str) -> BookmarksByTag {
    by_tag
        .iter()
        .filter_map(|(tag, bookmarks)| {
            let hits = search(bookmarks, term);
            (!hits.is_empty()).then(|| (tag.clone(), hits))
        })
        .collect()
}

/// Sorts bookmarks case-insensitively by [`Bookmark::display_title`].
pub fn sort_for_display(bookmarks: &mut [Arc<Bookmark>]) {
    bookmarks.sort_by_cached_key(|b| b.display_title().to_lowercase());
}

/// Checks a single folder segment entered by the user and returns it trimmed.
pub fn validate_folder_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.contains(TAG_SEPARATOR) {
        return Err(ValidationError::ContainsSeparator(name.to_string()));
    }
    if name == UNTAGGED {
        return Err(ValidationError::ReservedName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Full tag for a new child `name` of `parent`; children of [`UNTAGGED`] go to the top level.
pub fn child_tag(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == UNTAGGED {
        name.to_string()
    } else {
        format!("{}{}{}", parent, TAG_SEPARATOR, name)
    }
}

/// Full tag after renaming the last segment of `tag` to `new_name`.
pub fn sibling_tag(tag: &str, new_name: &str) -> String {
    match tag.rfind(TAG_SEPARATOR) {
        Some(i) => format!("{}{}", &tag[..=i], new_name),
        None => new_name.to_string(),
    }
}

/// A flat bookmark list together with its tag buckets and folder tree.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    bookmarks: Vec<Arc<Bookmark>>,
    by_tag: BookmarksByTag,
    tree: TagTreeNode,
    tags: Vec<String>,
    /// Folders created locally that no bookmark carries yet.
    virtual_folders: BTreeSet<String>,
}

impl TagIndex {
    pub fn new(bookmarks: Vec<Bookmark>) -> Self {
        let mut index = Self::default();
        index.replace_all(bookmarks);
        index
    }

    /// Swaps in a freshly fetched list and recomputes every derived view.
    pub fn replace_all(&mut self, bookmarks: Vec<Bookmark>) {
        self.bookmarks = bookmarks.into_iter().map(Arc::new).collect();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.by_tag = group_by_tag(&self.bookmarks);
        self.tags = all_tags(&self.bookmarks);
        let by_tag = &self.by_tag;
        self.virtual_folders.retain(|tag| !by_tag.contains_key(tag));
        self.tree = build_tree(self.by_tag.keys().chain(self.virtual_folders.iter()));
    }

    pub fn bookmarks(&self) -> &[Arc<Bookmark>] {
        &self.bookmarks
    }

    pub fn by_tag(&self) -> &BookmarksByTag {
        &self.by_tag
    }

    pub fn tree(&self) -> &TagTreeNode {
        &self.tree
    }

    /// Sorted distinct tags carried by bookmarks (virtual folders excluded).
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn virtual_folders(&self) -> &BTreeSet<String> {
        &self.virtual_folders
    }

    pub fn get(&self, id: i64) -> Option<&Arc<Bookmark>> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    /// Bookmarks filed under `tag`; empty for virtual or unknown folders.
    pub fn bookmarks_for(&self, tag: &str) -> &[Arc<Bookmark>] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` if `tag` names any node of the tree, scaffolding included.
    pub fn has_folder(&self, tag: &str) -> bool {
        self.tree.find(tag).is_some()
    }

    /// `true` if `tag` is a bucket or a virtual folder, i.e. something a view can open.
    pub fn is_selectable(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag) || self.virtual_folders.contains(tag)
    }

    /// Bookmarks carrying `prefix` or any tag beneath it.
    pub fn affected_by(&self, prefix: &str) -> Vec<Arc<Bookmark>> {
        self.bookmarks
            .iter()
            .filter(|b| b.tag_names.iter().any(|t| matches_prefix(t, prefix)))
            .cloned()
            .collect()
    }

    /// Replaces the bookmark with the same id, or appends it if new.
    pub fn upsert(&mut self, bookmark: Bookmark) {
        self.upsert_all(vec![bookmark]);
    }

    /// Replaces several bookmarks at once, rebuilding the derived views a single time.
    pub fn upsert_all(&mut self, bookmarks: Vec<Bookmark>) {
        for bookmark in bookmarks {
            let bookmark = Arc::new(bookmark);
            match self.bookmarks.iter().position(|b| b.id == bookmark.id) {
                Some(i) => self.bookmarks[i] = bookmark,
                None => self.bookmarks.push(bookmark),
            }
        }
        self.rebuild();
    }

    pub fn remove_bookmark(&mut self, id: i64) -> Option<Arc<Bookmark>> {
        let i = self.bookmarks.iter().position(|b| b.id == id)?;
        let removed = self.bookmarks.remove(i);
        self.rebuild();
        Some(removed)
    }

    /// Registers an empty folder `name` under `parent`. Returns the new full tag.
    pub fn add_virtual_folder(&mut self, parent: &str, name: &str) -> Result<String, ValidationError> {
        let name = validate_folder_name(name)?;
        let tag = child_tag(parent, &name);
        if self.has_folder(&tag) {
            return Err(ValidationError::DuplicateFolder(tag));
        }
        self.virtual_folders.insert(tag.clone());
        self.rebuild();
        Ok(tag)
    }

    /// Applies a prefix rename to virtual folders only (no bookmark is touched).
    pub fn rename_virtual(&mut self, old_prefix: &str, new_prefix: &str) {
        let renamed: Vec<String> = self
            .virtual_folders
            .iter()
            .map(|tag| replace_prefix(tag, old_prefix, new_prefix).unwrap_or_else(|| tag.clone()))
            .collect();
        self.virtual_folders = renamed.into_iter().collect();
        self.rebuild();
    }

    /// Drops `prefix` and every virtual folder beneath it.
    pub fn remove_virtual(&mut self, prefix: &str) {
        self.virtual_folders.retain(|tag| !matches_prefix(tag, prefix));
        self.rebuild();
    }

    /// Tag sets every affected bookmark would carry after renaming `old_prefix`.
    pub fn plan_rename(&self, old_prefix: &str, new_prefix: &str) -> Vec<Bookmark> {
        self.affected_by(old_prefix)
            .iter()
            .map(|b| b.with_tags(rename_tags(&b.tag_names, old_prefix, new_prefix)))
            .collect()
    }

    /// Tag sets every affected bookmark would carry after removing `prefix`.
    pub fn plan_remove(&self, prefix: &str) -> Vec<Bookmark> {
        self.affected_by(prefix)
            .iter()
            .map(|b| b.with_tags(remove_tags(&b.tag_names, prefix)))
            .collect()
    }

    /// The record to send when bookmark `id` is dragged from `from` onto `to`.
    ///
    /// `None` when the bookmark is unknown or `from == to`.
    pub fn plan_move(&self, id: i64, from: &str, to: &str) -> Option<Bookmark> {
        if from == to {
            return None;
        }
        let bookmark = self.get(id)?;
        Some(bookmark.with_tags(move_tags(&bookmark.tag_names, from, to)))
    }

    /// Applies a prefix rename locally to every bookmark and virtual folder.
    pub fn rename(&mut self, old_prefix: &str, new_prefix: &str) {
        for bookmark in self.bookmarks.iter_mut() {
            if bookmark.tag_names.iter().any(|t| matches_prefix(t, old_prefix)) {
                *bookmark = Arc::new(
                    bookmark.with_tags(rename_tags(&bookmark.tag_names, old_prefix, new_prefix)),
                );
            }
        }
        self.rename_virtual(old_prefix, new_prefix);
    }

    /// Applies a prefix removal locally to every bookmark and virtual folder.
    pub fn remove(&mut self, prefix: &str) {
        for bookmark in self.bookmarks.iter_mut() {
            if bookmark.tag_names.iter().any(|t| matches_prefix(t, prefix)) {
                *bookmark = Arc::new(bookmark.with_tags(remove_tags(&bookmark.tag_names, prefix)));
            }
        }
        self.remove_virtual(prefix);
    }

    /// Applies a drag-move locally. Returns `false` if nothing changed.
    pub fn move_bookmark(&mut self, id: i64, from: &str, to: &str) -> bool {
        match self.plan_move(id, from, to) {
            Some(updated) => {
                self.upsert(updated);
                true
            }
            None => false,
        }
    }
}
