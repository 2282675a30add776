use std::cmp::Ordering;

use crate::core::path_utils;

/*
 * Represents a node in the in-memory file tree.
 * The two variants form an explicit tagged union so that every place that
 * cares about node kind (sorting, traversal, archiving) dispatches
 * exhaustively instead of probing for a children field. A node's `path` is
 * the unique slash-joined identifier from the top level and never changes
 * after construction; edits produce a rebuilt tree rather than renaming
 * nodes in place.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum FileSystemNode {
    File {
        name: String,
        path: String,
        content: String,
    },
    Directory {
        name: String,
        path: String,
        children: Vec<FileSystemNode>,
    },
}

impl FileSystemNode {
    /*
     * Creates a file node with the given content. The full path is derived
     * from the parent path so the path invariant holds by construction.
     */
    pub fn new_file(parent_path: Option<&str>, name: &str, content: String) -> Self {
        FileSystemNode::File {
            name: name.to_string(),
            path: path_utils::join_path(parent_path, name),
            content,
        }
    }

    /*
     * Creates an empty directory node under the given parent path.
     */
    pub fn new_directory(parent_path: Option<&str>, name: &str) -> Self {
        FileSystemNode::Directory {
            name: name.to_string(),
            path: path_utils::join_path(parent_path, name),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FileSystemNode::File { name, .. } => name,
            FileSystemNode::Directory { name, .. } => name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            FileSystemNode::File { path, .. } => path,
            FileSystemNode::Directory { path, .. } => path,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileSystemNode::Directory { .. })
    }

    /*
     * Returns the file content, or None for directories.
     */
    pub fn content(&self) -> Option<&str> {
        match self {
            FileSystemNode::File { content, .. } => Some(content),
            FileSystemNode::Directory { .. } => None,
        }
    }

    /*
     * Returns the child nodes of a directory, or None for files.
     */
    pub fn children(&self) -> Option<&[FileSystemNode]> {
        match self {
            FileSystemNode::File { .. } => None,
            FileSystemNode::Directory { children, .. } => Some(children),
        }
    }
}

/*
 * Orders two siblings per the tree invariant: every directory precedes
 * every file, and within each kind names ascend.
 */
pub fn compare_siblings(a: &FileSystemNode, b: &FileSystemNode) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => path_utils::compare_names(a.name(), b.name()),
    }
}

/*
 * Normalizes an arbitrary tree to the sibling-ordering invariant at every
 * level. Used as the final pass after ingestion, which builds children in
 * arrival order.
 */
pub fn sort_nodes_recursively(nodes: &mut [FileSystemNode]) {
    nodes.sort_by(compare_siblings);
    for node in nodes.iter_mut() {
        if let FileSystemNode::Directory { children, .. } = node {
            sort_nodes_recursively(children);
        }
    }
}
