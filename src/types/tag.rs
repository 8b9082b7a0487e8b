use std::collections::BTreeMap;
use std::sync::Arc;

use super::bookmark::Bookmark;

/// Synthetic bucket for bookmarks that carry no tags.
pub const UNTAGGED: &str = "[Untagged]";

/// Separator between hierarchy levels of a tag name (`work.projects.backend`).
pub const TAG_SEPARATOR: char = '.';

/// Tag name (or [`UNTAGGED`]) to the bookmarks carrying it, in input order.
///
/// A bookmark with N tags is shared by N buckets through the same `Arc`.
pub type BookmarksByTag = BTreeMap<String, Vec<Arc<Bookmark>>>;
