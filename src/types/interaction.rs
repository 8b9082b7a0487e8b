//! Host-platform capabilities the tag-tree logic talks to.
//!
//! A browser front-end implements these over native drag-and-drop and
//! context menus; tests implement them with plain structs.

use serde::{Deserialize, Serialize};

/// Data carried by a bookmark while it is being dragged onto a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    pub id: i64,
    #[serde(rename = "sourceTag")]
    pub source_tag: String,
}

/// Something a bookmark can be dragged from.
pub trait DragSource {
    /// The payload of the current drag, or `None` if nothing usable is being dragged.
    fn payload(&self) -> Option<DragPayload>;
}

impl DragSource for DragPayload {
    fn payload(&self) -> Option<DragPayload> {
        Some(self.clone())
    }
}

/// Actions offered on a folder's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderAction {
    AddSubfolder,
    Rename,
    Remove,
}

impl FolderAction {
    pub fn label(&self) -> &'static str {
        match self {
            FolderAction::AddSubfolder => "New Sub-folder...",
            FolderAction::Rename => "Rename...",
            FolderAction::Remove => "Remove",
        }
    }
}

/// One entry of a folder context menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMenuItem {
    pub action: FolderAction,
    pub label: String,
    pub enabled: bool,
}

/// Something that can display a context menu for a folder.
pub trait ContextMenuHost {
    fn show(&mut self, tag: &str, items: &[ContextMenuItem]);
}
