//! RPC method handler for the Linkshelf JSON line protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches method calls to the bookmark
//! view-model, which a browser front-end drives over stdin/stdout.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::tag_tree::{render_outline, TagTreeNode};
use crate::services::linkding_client::BookmarkApi;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{Bookmark, BookmarkEdit};
use crate::types::interaction::{ContextMenuHost, ContextMenuItem, DragPayload, FolderAction};
use crate::types::settings::DisplayMode;

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn id_param(params: &Value) -> Result<i64, String> {
    params
        .get("id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| "missing id".to_string())
}

fn bookmarks_json(bookmarks: &[Arc<Bookmark>]) -> Value {
    Value::Array(
        bookmarks
            .iter()
            .map(|b| {
                json!({
                    "id": b.id,
                    "url": b.url,
                    "title": b.display_title(),
                    "description": b.description,
                    "tag_names": b.tag_names,
                })
            })
            .collect(),
    )
}

/// Nested folder tree, children in display order.
pub fn tree_json(node: &TagTreeNode) -> Value {
    Value::Array(
        node.sorted_children()
            .into_iter()
            .map(|(segment, child)| {
                json!({
                    "name": segment,
                    "tag": child.full_name,
                    "is_tag": child.is_tag,
                    "children": tree_json(child),
                })
            })
            .collect(),
    )
}

/// Records the menu instead of drawing it; the front-end renders the reply.
#[derive(Default)]
struct MenuReply {
    items: Vec<ContextMenuItem>,
}

impl ContextMenuHost for MenuReply {
    fn show(&mut self, _tag: &str, items: &[ContextMenuItem]) {
        self.items = items.to_vec();
    }
}

/// Dispatch a method call to the view-model or the settings engine.
///
/// Returns `Ok(Value)` on success or `Err(String)` with a user-facing message.
pub async fn handle_method<A: BookmarkApi>(
    manager: &mut BookmarkManager<A>,
    settings: &mut dyn SettingsEngineTrait,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Loading & views ───
        "bookmarks.load" => {
            let force = params.get("force").and_then(|v| v.as_bool()).unwrap_or(false);
            manager.load(force).await.map_err(|e| e.to_string())?;
            Ok(json!({"count": manager.index().bookmarks().len(), "current_tag": manager.current_tag()}))
        }
        "state" => {
            manager.mark_stale_if_expired(crate::services::bookmark_cache::BookmarkCache::now_ms());
            Ok(json!({"view": manager.state(), "current_tag": manager.current_tag()}))
        }
        "tree" => Ok(json!({
            "tree": tree_json(manager.index().tree()),
            "outline": render_outline(manager.index().tree()),
            "current_tag": manager.current_tag(),
        })),
        "bookmarks.list" => {
            if let Some(tag) = params.get("tag").and_then(|v| v.as_str()) {
                if !manager.select_tag(tag) {
                    return Err(format!("unknown folder: {}", tag));
                }
            }
            Ok(json!({
                "tag": manager.current_tag(),
                "items": bookmarks_json(&manager.current_bookmarks()),
            }))
        }
        "bookmarks.search" => {
            let query = str_param(params, "query")?;
            let grouped = manager.search_grouped(query);
            let groups: serde_json::Map<String, Value> = grouped
                .iter()
                .map(|(tag, items)| (tag.clone(), bookmarks_json(items)))
                .collect();
            Ok(json!({
                "items": bookmarks_json(&manager.search(query)),
                "by_tag": groups,
            }))
        }
        "tags.suggest" => {
            let input = str_param(params, "input")?;
            Ok(json!(manager.suggest_tags(input)))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let url = str_param(params, "url")?;
            let title = params.get("title").and_then(|v| v.as_str());
            let bm = manager.add_bookmark(url, title).await.map_err(|e| e.to_string())?;
            Ok(json!({"id": bm.id, "url": bm.url, "title": bm.display_title()}))
        }
        "bookmark.edit" => {
            let id = id_param(params)?;
            let edit: BookmarkEdit = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid edit: {}", e))?;
            let bm = manager.edit_bookmark(id, edit).await.map_err(|e| e.to_string())?;
            Ok(json!({"id": bm.id, "tag_names": bm.tag_names}))
        }
        "bookmark.delete" => {
            let id = id_param(params)?;
            manager.delete_bookmark(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.untag" => {
            let id = id_param(params)?;
            let tag = str_param(params, "tag")?;
            let bm = manager.remove_tag(id, tag).await.map_err(|e| e.to_string())?;
            Ok(json!({"id": bm.id, "tag_names": bm.tag_names}))
        }
        "bookmark.drop" => {
            let payload: DragPayload = serde_json::from_value(
                params.get("payload").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| format!("invalid drag payload: {}", e))?;
            let target = str_param(params, "target")?;
            let moved = manager
                .handle_drop(&payload, target)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"moved": moved}))
        }

        // ─── Folders ───
        "folder.create" => {
            let parent = str_param(params, "parent")?;
            let name = str_param(params, "name")?;
            let tag = manager.create_folder(parent, name).map_err(|e| e.to_string())?;
            Ok(json!({"tag": tag}))
        }
        "folder.rename" => {
            let tag = str_param(params, "tag")?;
            let name = str_param(params, "name")?;
            let new_tag = manager.rename_folder(tag, name).await.map_err(|e| e.to_string())?;
            Ok(json!({"tag": new_tag}))
        }
        "folder.remove" => {
            let tag = str_param(params, "tag")?;
            let updated = manager.remove_folder(tag).await.map_err(|e| e.to_string())?;
            Ok(json!({"updated": updated}))
        }
        "folder.menu" => {
            let tag = str_param(params, "tag")?;
            let mut reply = MenuReply::default();
            manager.folder_menu(&mut reply, tag);
            Ok(json!(reply.items))
        }
        "folder.action" => {
            let tag = str_param(params, "tag")?;
            let action: FolderAction = serde_json::from_value(
                params.get("action").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| format!("invalid action: {}", e))?;
            let name = params.get("name").and_then(|v| v.as_str());
            let result = manager
                .apply_folder_action(tag, action, name)
                .await
                .map_err(|e| e.to_string())?;
            Ok(json!({"tag": result}))
        }

        // ─── Settings ───
        "settings.get" => {
            let current = settings.get_settings();
            let mode = match params.get("mode") {
                Some(mode) => serde_json::from_value::<DisplayMode>(mode.clone())
                    .map_err(|e| format!("invalid mode: {}", e))?,
                None => current.display_mode,
            };
            Ok(json!({
                "settings": current,
                "mode": mode,
                "view": current.view_settings(mode),
            }))
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            settings.set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
