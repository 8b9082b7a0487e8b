//! Hierarchical view of dotted tag names.
//!
//! `work.projects.backend` becomes `work` → `projects` → `backend`, with only
//! the terminal node marked as a real tag. The same tree drives the folder
//! listing and the native bookmarks-bar replay through [`walk`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::tag::TAG_SEPARATOR;

/// A node in the tag hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTreeNode {
    /// `true` when some bookmark (or virtual folder) uses this exact path.
    pub is_tag: bool,
    /// Full dotted tag name, set only when `is_tag` is `true`.
    pub full_name: Option<String>,
    pub children: BTreeMap<String, TagTreeNode>,
}

impl TagTreeNode {
    /// Children in display order: case-insensitive by segment, ties broken by raw bytes.
    pub fn sorted_children(&self) -> Vec<(&str, &TagTreeNode)> {
        let mut children: Vec<(&str, &TagTreeNode)> = self
            .children
            .iter()
            .map(|(segment, node)| (segment.as_str(), node))
            .collect();
        children.sort_by(|a, b| compare_segments(a.0, b.0));
        children
    }

    /// Looks up a node by its full dotted path.
    pub fn find(&self, path: &str) -> Option<&TagTreeNode> {
        let mut node = self;
        for segment in path.split(TAG_SEPARATOR) {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Builds the tag tree for a set of tag names.
pub fn build_tree<I, S>(tag_names: I) -> TagTreeNode
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root = TagTreeNode::default();
    for tag in tag_names {
        let tag = tag.as_ref();
        let mut node = &mut root;
        for segment in tag.split(TAG_SEPARATOR) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.is_tag = true;
        node.full_name = Some(tag.to_string());
    }
    root
}

/// What a visitor sees for each folder during [`walk`].
#[derive(Debug, Clone, Copy)]
pub struct FolderVisit<'a> {
    /// The last path segment, shown as the folder label.
    pub segment: &'a str,
    /// Dotted path from the root; this is the tag a drop onto the folder assigns.
    pub path: &'a str,
    pub depth: usize,
    pub node: &'a TagTreeNode,
}

/// Per-node callback for [`walk`].
///
/// `enter` receives the scope produced for the parent folder and returns the
/// scope for this folder's children (a DOM container, a native folder id, an
/// indentation level...).
pub trait TagTreeVisitor {
    type Scope;
    type Error;

    fn enter(&mut self, parent: &Self::Scope, folder: FolderVisit<'_>)
        -> Result<Self::Scope, Self::Error>;
}

/// Depth-first, display-ordered traversal of `root`'s descendants.
pub fn walk<V: TagTreeVisitor>(
    root: &TagTreeNode,
    root_scope: &V::Scope,
    visitor: &mut V,
) -> Result<(), V::Error> {
    walk_inner(root, root_scope, "", 0, visitor)
}

fn walk_inner<V: TagTreeVisitor>(
    node: &TagTreeNode,
    scope: &V::Scope,
    prefix: &str,
    depth: usize,
    visitor: &mut V,
) -> Result<(), V::Error> {
    for (segment, child) in node.sorted_children() {
        let path = if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}{}{}", prefix, TAG_SEPARATOR, segment)
        };
        let child_scope = visitor.enter(
            scope,
            FolderVisit {
                segment,
                path: &path,
                depth,
                node: child,
            },
        )?;
        if child.has_children() {
            walk_inner(child, &child_scope, &path, depth + 1, visitor)?;
        }
    }
    Ok(())
}

/// Renders the tree as indented lines, marking scaffolding folders with `~`.
pub fn render_outline(root: &TagTreeNode) -> Vec<String> {
    struct Outline(Vec<String>);

    impl TagTreeVisitor for Outline {
        type Scope = ();
        type Error = std::convert::Infallible;

        fn enter(&mut self, _: &(), folder: FolderVisit<'_>) -> Result<(), Self::Error> {
            let marker = if folder.node.is_tag { "" } else { "~" };
            self.0.push(format!(
                "{}{}{}",
                "  ".repeat(folder.depth),
                folder.segment,
                marker
            ));
            Ok(())
        }
    }

    let mut outline = Outline(Vec::new());
    match walk(root, &(), &mut outline) {
        Ok(()) => outline.0,
        Err(never) => match never {},
    }
}
