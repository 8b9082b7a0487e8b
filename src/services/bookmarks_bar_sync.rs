//! One-way replay of the tag tree into a browser-style bookmark tree.
//!
//! Each run deletes the previous `Linkding Bookmarks` folder and rebuilds it
//! from scratch: one folder per tag segment, bookmarks inside the folder of
//! each exact tag they carry.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::managers::tag_index::group_by_tag;
use crate::managers::tag_tree::{build_tree, walk, FolderVisit, TagTreeVisitor};
use crate::services::linkding_client::BookmarkApi;
use crate::types::bookmark::Bookmark;
use crate::types::errors::SyncError;
use crate::types::tag::BookmarksByTag;

/// Title of the top-level folder owned by the sync.
pub const SYNC_FOLDER_TITLE: &str = "Linkding Bookmarks";
/// Node id of the browser's bookmarks bar.
pub const BOOKMARKS_BAR_ID: &str = "1";
/// Node id of the browser's "Other bookmarks" folder.
pub const OTHER_BOOKMARKS_ID: &str = "2";

/// A node of the native tree as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    /// `None` for folders.
    pub url: Option<String>,
}

/// The browser's bookmark tree, reduced to what the sync needs.
pub trait NativeBookmarkTree {
    fn search_title(&self, title: &str) -> Vec<NativeNode>;
    fn remove_tree(&mut self, id: &str) -> Result<(), SyncError>;
    fn create_folder(&mut self, parent_id: &str, title: &str) -> Result<String, SyncError>;
    fn create_bookmark(&mut self, parent_id: &str, title: &str, url: &str)
        -> Result<String, SyncError>;
}

/// Counts of what a sync run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub folders: usize,
    pub bookmarks: usize,
}

struct NativeReplay<'a, T: NativeBookmarkTree + ?Sized> {
    host: &'a mut T,
    by_tag: &'a BookmarksByTag,
    report: SyncReport,
}

impl<T: NativeBookmarkTree + ?Sized> TagTreeVisitor for NativeReplay<'_, T> {
    type Scope = String;
    type Error = SyncError;

    fn enter(&mut self, parent_id: &String, folder: FolderVisit<'_>) -> Result<String, SyncError> {
        let folder_id = self.host.create_folder(parent_id, folder.segment)?;
        self.report.folders += 1;

        if let Some(full_name) = folder.node.full_name.as_deref().filter(|_| folder.node.is_tag) {
            for bookmark in self.by_tag.get(full_name).map(Vec::as_slice).unwrap_or(&[]) {
                self.host
                    .create_bookmark(&folder_id, bookmark.display_title(), &bookmark.url)?;
                self.report.bookmarks += 1;
            }
        }
        Ok(folder_id)
    }
}

/// Deletes every sync folder sitting directly on the bar or in "Other bookmarks".
pub fn remove_sync_folders<T: NativeBookmarkTree + ?Sized>(host: &mut T) -> Result<usize, SyncError> {
    let stale: Vec<NativeNode> = host
        .search_title(SYNC_FOLDER_TITLE)
        .into_iter()
        .filter(|node| {
            node.url.is_none()
                && matches!(
                    node.parent_id.as_deref(),
                    Some(BOOKMARKS_BAR_ID) | Some(OTHER_BOOKMARKS_ID)
                )
        })
        .collect();
    for node in &stale {
        host.remove_tree(&node.id)?;
    }
    Ok(stale.len())
}

/// Rebuilds the sync folder on the bookmarks bar from `bookmarks`.
pub fn sync_bookmarks<T: NativeBookmarkTree + ?Sized>(
    host: &mut T,
    bookmarks: &[Bookmark],
) -> Result<SyncReport, SyncError> {
    info!("sync 2/4: processing {} bookmarks", bookmarks.len());
    let shared: Vec<Arc<Bookmark>> = bookmarks.iter().cloned().map(Arc::new).collect();
    let by_tag = group_by_tag(&shared);
    let tree = build_tree(by_tag.keys());

    info!("sync 3/4: removing previous folder");
    remove_sync_folders(host)?;

    info!("sync 4/4: creating folder tree");
    let root_id = host.create_folder(BOOKMARKS_BAR_ID, SYNC_FOLDER_TITLE)?;
    let mut replay = NativeReplay {
        host,
        by_tag: &by_tag,
        report: SyncReport::default(),
    };
    walk(&tree, &root_id, &mut replay)?;
    info!(
        "sync complete: {} folders, {} bookmarks",
        replay.report.folders, replay.report.bookmarks
    );
    Ok(replay.report)
}

/// Fetches every bookmark from `api` and replays it into `host`.
pub async fn sync_from_remote<A, T>(api: &A, host: &mut T) -> Result<SyncReport, SyncError>
where
    A: BookmarkApi + ?Sized,
    T: NativeBookmarkTree + ?Sized,
{
    info!("sync 1/4: fetching bookmarks");
    let bookmarks = api.fetch_all().await?;
    sync_bookmarks(host, &bookmarks)
}

/// A bookmark tree held in memory, with the bar and "Other bookmarks" roots.
///
/// Serves as the host in tests and as the source of the exported
/// Netscape bookmark file.
#[derive(Debug, Clone)]
pub struct InMemoryBookmarkTree {
    nodes: HashMap<String, NativeNode>,
    /// Children per parent id, in creation order.
    children: HashMap<String, Vec<String>>,
}

impl Default for InMemoryBookmarkTree {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBookmarkTree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            children: HashMap::new(),
        };
        for (id, title) in [(BOOKMARKS_BAR_ID, "Bookmarks bar"), (OTHER_BOOKMARKS_ID, "Other bookmarks")] {
            tree.nodes.insert(
                id.to_string(),
                NativeNode {
                    id: id.to_string(),
                    parent_id: None,
                    title: title.to_string(),
                    url: None,
                },
            );
        }
        tree
    }

    pub fn get(&self, id: &str) -> Option<&NativeNode> {
        self.nodes.get(id)
    }

    pub fn children_of(&self, id: &str) -> Vec<&NativeNode> {
        self.children
            .get(id)
            .map(|ids| ids.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, parent_id: &str, title: &str, url: Option<&str>) -> Result<String, SyncError> {
        match self.nodes.get(parent_id) {
            Some(parent) if parent.url.is_none() => {}
            Some(_) => return Err(SyncError::Host(format!("{} is not a folder", parent_id))),
            None => return Err(SyncError::Host(format!("no such folder: {}", parent_id))),
        }
        let id = Uuid::new_v4().to_string();
        self.nodes.insert(
            id.clone(),
            NativeNode {
                id: id.clone(),
                parent_id: Some(parent_id.to_string()),
                title: title.to_string(),
                url: url.map(str::to_string),
            },
        );
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(id.clone());
        Ok(id)
    }

    /// Renders the bar as a Netscape bookmark file that browsers can import.
    pub fn to_netscape_html(&self) -> String {
        let mut out = String::from(
            "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
             <META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
             <TITLE>Bookmarks</TITLE>\n<H1>Bookmarks</H1>\n<DL><p>\n",
        );
        self.write_children(BOOKMARKS_BAR_ID, 1, &mut out);
        out.push_str("</DL><p>\n");
        out
    }

    fn write_children(&self, parent_id: &str, depth: usize, out: &mut String) {
        let indent = "    ".repeat(depth);
        for node in self.children_of(parent_id) {
            match &node.url {
                Some(url) => out.push_str(&format!(
                    "{}<DT><A HREF=\"{}\">{}</A>\n",
                    indent,
                    escape_html(url),
                    escape_html(&node.title)
                )),
                None => {
                    out.push_str(&format!("{}<DT><H3>{}</H3>\n", indent, escape_html(&node.title)));
                    out.push_str(&format!("{}<DL><p>\n", indent));
                    self.write_children(&node.id, depth + 1, out);
                    out.push_str(&format!("{}</DL><p>\n", indent));
                }
            }
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl NativeBookmarkTree for InMemoryBookmarkTree {
    fn search_title(&self, title: &str) -> Vec<NativeNode> {
        self.nodes
            .values()
            .filter(|n| n.title == title)
            .cloned()
            .collect()
    }

    fn remove_tree(&mut self, id: &str) -> Result<(), SyncError> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| SyncError::Host(format!("no such node: {}", id)))?;
        if let Some(parent) = node.parent_id.as_deref() {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|c| c != id);
            }
        }
        let mut pending = self.children.remove(id).unwrap_or_default();
        while let Some(child) = pending.pop() {
            self.nodes.remove(&child);
            pending.extend(self.children.remove(&child).unwrap_or_default());
        }
        Ok(())
    }

    fn create_folder(&mut self, parent_id: &str, title: &str) -> Result<String, SyncError> {
        self.insert(parent_id, title, None)
    }

    fn create_bookmark(&mut self, parent_id: &str, title: &str, url: &str) -> Result<String, SyncError> {
        self.insert(parent_id, title, Some(url))
    }
}
