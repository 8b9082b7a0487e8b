//! Unit tests for replaying the tag tree into a native bookmark tree.

#[path = "../common/mod.rs"]
mod common;

use common::{bookmark, MockApi};
use linkshelf::services::bookmarks_bar_sync::{
    remove_sync_folders, sync_bookmarks, sync_from_remote, InMemoryBookmarkTree, NativeBookmarkTree,
    NativeNode, SyncReport, BOOKMARKS_BAR_ID, OTHER_BOOKMARKS_ID, SYNC_FOLDER_TITLE,
};
use linkshelf::types::errors::{ApiError, SyncError};

fn titles(nodes: &[&NativeNode]) -> Vec<String> {
    nodes.iter().map(|n| n.title.clone()).collect()
}

fn sync_root(tree: &InMemoryBookmarkTree) -> String {
    let roots = tree.children_of(BOOKMARKS_BAR_ID);
    let root = roots
        .iter()
        .find(|n| n.title == SYNC_FOLDER_TITLE)
        .expect("sync folder on the bar");
    root.id.clone()
}

fn child<'a>(tree: &'a InMemoryBookmarkTree, parent: &str, title: &str) -> &'a NativeNode {
    tree.children_of(parent)
        .into_iter()
        .find(|n| n.title == title)
        .unwrap_or_else(|| panic!("no child {title} under {parent}"))
}

#[test]
fn test_sync_builds_folder_per_segment() {
    let mut tree = InMemoryBookmarkTree::new();
    let report = sync_bookmarks(
        &mut tree,
        &[
            bookmark(1, "Design doc", &["work.eng"]),
            bookmark(2, "Runbook", &["work.ops", "reading"]),
            bookmark(3, "", &[]),
        ],
    )
    .unwrap();

    // [Untagged], reading, work, eng, ops
    assert_eq!(report, SyncReport { folders: 5, bookmarks: 4 });

    let root = sync_root(&tree);
    assert_eq!(
        titles(&tree.children_of(&root)),
        vec!["[Untagged]", "reading", "work"]
    );

    let work = child(&tree, &root, "work");
    assert_eq!(titles(&tree.children_of(&work.id)), vec!["eng", "ops"]);

    let eng = child(&tree, &work.id, "eng");
    let links = tree.children_of(&eng.id);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url.as_deref(), Some("https://example.com/1"));

    // blank titles fall back to the url
    let untagged = child(&tree, &root, "[Untagged]");
    assert_eq!(tree.children_of(&untagged.id)[0].title, "https://example.com/3");
}

#[test]
fn test_scaffolding_folder_holds_no_bookmarks() {
    let mut tree = InMemoryBookmarkTree::new();
    sync_bookmarks(&mut tree, &[bookmark(1, "x", &["a.b"])]).unwrap();
    let root = sync_root(&tree);
    let a = child(&tree, &root, "a");
    let contents = tree.children_of(&a.id);
    assert_eq!(contents.len(), 1);
    assert!(contents[0].url.is_none());
}

#[test]
fn test_resync_replaces_previous_folder() {
    let mut tree = InMemoryBookmarkTree::new();
    sync_bookmarks(&mut tree, &[bookmark(1, "x", &["a"])]).unwrap();
    let first = sync_root(&tree);
    sync_bookmarks(&mut tree, &[bookmark(2, "y", &["b"])]).unwrap();
    let second = sync_root(&tree);

    assert_ne!(first, second);
    assert!(tree.get(&first).is_none());
    assert_eq!(tree.children_of(BOOKMARKS_BAR_ID).len(), 1);
    assert_eq!(titles(&tree.children_of(&second)), vec!["b"]);
}

#[test]
fn test_only_top_level_sync_folders_are_removed() {
    let mut tree = InMemoryBookmarkTree::new();
    tree.create_folder(OTHER_BOOKMARKS_ID, SYNC_FOLDER_TITLE).unwrap();
    let mine = tree.create_folder(BOOKMARKS_BAR_ID, "Mine").unwrap();
    let nested = tree.create_folder(&mine, SYNC_FOLDER_TITLE).unwrap();
    tree.create_bookmark(BOOKMARKS_BAR_ID, SYNC_FOLDER_TITLE, "https://x.example")
        .unwrap();

    assert_eq!(remove_sync_folders(&mut tree).unwrap(), 1);
    assert!(tree.children_of(OTHER_BOOKMARKS_ID).is_empty());
    assert!(tree.get(&nested).is_some());
    assert_eq!(tree.children_of(BOOKMARKS_BAR_ID).len(), 2);
}

#[test]
fn test_empty_collection_creates_empty_root() {
    let mut tree = InMemoryBookmarkTree::new();
    let report = sync_bookmarks(&mut tree, &[]).unwrap();
    assert_eq!(report, SyncReport::default());
    let root = sync_root(&tree);
    assert!(tree.children_of(&root).is_empty());
}

/// Accepts folders but refuses every bookmark.
struct ReadOnlyLinks(InMemoryBookmarkTree);

impl NativeBookmarkTree for ReadOnlyLinks {
    fn search_title(&self, title: &str) -> Vec<NativeNode> {
        self.0.search_title(title)
    }
    fn remove_tree(&mut self, id: &str) -> Result<(), SyncError> {
        self.0.remove_tree(id)
    }
    fn create_folder(&mut self, parent_id: &str, title: &str) -> Result<String, SyncError> {
        self.0.create_folder(parent_id, title)
    }
    fn create_bookmark(&mut self, _: &str, _: &str, _: &str) -> Result<String, SyncError> {
        Err(SyncError::Host("read only".to_string()))
    }
}

#[test]
fn test_host_errors_abort_sync() {
    let mut host = ReadOnlyLinks(InMemoryBookmarkTree::new());
    let err = sync_bookmarks(&mut host, &[bookmark(1, "x", &["a"])]).unwrap_err();
    assert_eq!(err, SyncError::Host("read only".to_string()));
}

#[tokio::test]
async fn test_sync_from_remote_fetches_everything() {
    let api = MockApi::new(vec![bookmark(1, "x", &["a"]), bookmark(2, "y", &["a.b"])]);
    let mut tree = InMemoryBookmarkTree::new();
    let report = sync_from_remote(&api, &mut tree).await.unwrap();
    assert_eq!(report, SyncReport { folders: 2, bookmarks: 2 });
}

#[tokio::test]
async fn test_sync_from_remote_leaves_tree_alone_on_fetch_error() {
    let api = MockApi::new(vec![]);
    api.set_fail_fetch(true);
    let mut tree = InMemoryBookmarkTree::new();
    sync_bookmarks(&mut tree, &[bookmark(1, "x", &["keep"])]).unwrap();

    let err = sync_from_remote(&api, &mut tree).await.unwrap_err();
    assert_eq!(
        err,
        SyncError::Api(ApiError::Network("connection refused".to_string()))
    );
    let root = sync_root(&tree);
    assert_eq!(titles(&tree.children_of(&root)), vec!["keep"]);
}

#[test]
fn test_netscape_export_nests_folders() {
    let mut tree = InMemoryBookmarkTree::new();
    sync_bookmarks(&mut tree, &[bookmark(1, "Design doc", &["work.eng"])]).unwrap();
    let html = tree.to_netscape_html();

    assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>"));
    let sync = html.find("<H3>Linkding Bookmarks</H3>").unwrap();
    let work = html.find("<H3>work</H3>").unwrap();
    let eng = html.find("<H3>eng</H3>").unwrap();
    let link = html
        .find("<A HREF=\"https://example.com/1\">Design doc</A>")
        .unwrap();
    assert!(sync < work && work < eng && eng < link);
}
