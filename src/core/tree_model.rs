/*
 * This module implements the pure update operations on the in-memory file
 * tree. Every operation takes the current top-level nodes by reference and
 * returns a freshly built tree; the caller's tree is never mutated, so a
 * failing operation leaves nothing half-constructed. The top level is a
 * bare sequence of nodes; there is no synthetic root node.
 *
 * Delete and rename are deliberately not offered by this model.
 */
use crate::core::file_node::{FileSystemNode, compare_siblings};
use crate::core::path_utils;

/*
 * The kind of node a caller asks `create_node` to construct.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
    InvalidName(String),
    DuplicateName(String),
    ParentNotFound(String),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::InvalidName(name) => {
                write!(f, "Invalid node name: {name:?}")
            }
            TreeError::DuplicateName(name) => {
                write!(f, "Name \"{name}\" already exists among its siblings")
            }
            TreeError::ParentNotFound(path) => {
                write!(f, "Parent directory \"{path}\" was not found")
            }
        }
    }
}

impl std::error::Error for TreeError {}

pub type Result<T> = std::result::Result<T, TreeError>;

/*
 * Depth-first search for the directory with exactly the given path.
 * Returns None when no node matches or when the path names a file; the
 * returned reference is always the `Directory` variant.
 */
pub fn find_directory<'a>(
    nodes: &'a [FileSystemNode],
    path: &str,
) -> Option<&'a FileSystemNode> {
    for node in nodes {
        if let FileSystemNode::Directory { path: node_path, children, .. } = node {
            if node_path == path {
                return Some(node);
            }
            if let Some(found) = find_directory(children, path) {
                return Some(found);
            }
        }
    }
    None
}

/*
 * Depth-first search for the file with exactly the given path. The
 * counterpart to `find_directory`; directories never match.
 */
pub fn find_file<'a>(nodes: &'a [FileSystemNode], path: &str) -> Option<&'a FileSystemNode> {
    for node in nodes {
        match node {
            FileSystemNode::File { path: node_path, .. } if node_path == path => {
                return Some(node);
            }
            FileSystemNode::Directory { children, .. } => {
                if let Some(found) = find_file(children, path) {
                    return Some(found);
                }
            }
            FileSystemNode::File { .. } => {}
        }
    }
    None
}

/*
 * Replaces the content of the file at `path`, structurally rebuilding every
 * node from the top level down to the target. A path that matches no file
 * is a no-op by contract, not an error: the returned tree is
 * indistinguishable from the input.
 */
pub fn update_file_content(
    nodes: &[FileSystemNode],
    path: &str,
    new_content: &str,
) -> Vec<FileSystemNode> {
    nodes
        .iter()
        .map(|node| match node {
            FileSystemNode::Directory { name, path: dir_path, children } => {
                FileSystemNode::Directory {
                    name: name.clone(),
                    path: dir_path.clone(),
                    children: update_file_content(children, path, new_content),
                }
            }
            FileSystemNode::File { name, path: file_path, content } => FileSystemNode::File {
                name: name.clone(),
                path: file_path.clone(),
                content: if file_path == path {
                    new_content.to_string()
                } else {
                    content.clone()
                },
            },
        })
        .collect()
}

/*
 * Creates an empty file or directory under `parent_path` (top level when
 * None) and returns the rebuilt tree with the sibling ordering invariant
 * restored. The name is trimmed before validation. Fails with
 * `InvalidName` for blank names or names containing '/', `ParentNotFound`
 * when the parent path resolves to nothing (or to a file), and
 * `DuplicateName` when any sibling of either kind already carries the
 * name. On failure the input tree is untouched.
 */
pub fn create_node(
    nodes: &[FileSystemNode],
    parent_path: Option<&str>,
    name: &str,
    kind: NodeKind,
) -> Result<Vec<FileSystemNode>> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(TreeError::InvalidName(name.to_string()));
    }

    match parent_path {
        None => insert_child(nodes, None, trimmed, kind),
        Some(parent) => {
            if find_directory(nodes, parent).is_none() {
                log::debug!("TreeModel: create_node target parent {parent:?} not found.");
                return Err(TreeError::ParentNotFound(parent.to_string()));
            }
            insert_under_parent(nodes, parent, trimmed, kind)
        }
    }
}

fn insert_child(
    siblings: &[FileSystemNode],
    parent_path: Option<&str>,
    name: &str,
    kind: NodeKind,
) -> Result<Vec<FileSystemNode>> {
    if siblings.iter().any(|sibling| sibling.name() == name) {
        return Err(TreeError::DuplicateName(name.to_string()));
    }

    let new_node = match kind {
        NodeKind::File => FileSystemNode::new_file(parent_path, name, String::new()),
        NodeKind::Directory => FileSystemNode::new_directory(parent_path, name),
    };
    log::trace!(
        "TreeModel: Inserting new {:?} at {:?}.",
        kind,
        path_utils::join_path(parent_path, name)
    );

    let mut rebuilt = siblings.to_vec();
    rebuilt.push(new_node);
    rebuilt.sort_by(compare_siblings);
    Ok(rebuilt)
}

fn insert_under_parent(
    nodes: &[FileSystemNode],
    parent: &str,
    name: &str,
    kind: NodeKind,
) -> Result<Vec<FileSystemNode>> {
    nodes
        .iter()
        .map(|node| match node {
            FileSystemNode::Directory { name: dir_name, path, children } => {
                let rebuilt_children = if path == parent {
                    insert_child(children, Some(parent), name, kind)?
                } else {
                    insert_under_parent(children, parent, name, kind)?
                };
                Ok(FileSystemNode::Directory {
                    name: dir_name.clone(),
                    path: path.clone(),
                    children: rebuilt_children,
                })
            }
            file_node => Ok(file_node.clone()),
        })
        .collect()
}
