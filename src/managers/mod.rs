// Linkshelf state managers
// Managers own derived bookmark state: the tag index, the folder tree and the view-model.

pub mod bookmark_manager;
pub mod tag_index;
pub mod tag_tree;
