use crate::core::file_node::{FileSystemNode, sort_nodes_recursively};
use crate::core::path_utils;
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*
 * This module converts a flat collection of uploaded entries, each a
 * relative path plus a deferred content read, into the in-memory file
 * tree. It defines errors specific to ingestion, a trait
 * `UploadIngesterOperations` for abstracting the conversion, a concrete
 * `CoreUploadIngester`, and the disk-backed entry source used when the
 * user picks a folder.
 */

/*
 * Defines custom error types for ingestion.
 * Ingestion is all-or-nothing: the first failure aborts the run and the
 * partially built tree is discarded.
 */
#[derive(Debug)]
pub enum IngestError {
    /* A file's content could not be read. */
    Read { path: String, source: io::Error },
    /* An entry's directory chain collides with an existing file name,
     * which would break sibling-name uniqueness. */
    PathConflict(String),
    /* Walking the selected folder failed. */
    Walk(ignore::Error),
    InvalidRoot(PathBuf),
}

impl From<ignore::Error> for IngestError {
    fn from(err: ignore::Error) -> Self {
        IngestError::Walk(err)
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Read { path, source } => {
                write!(f, "Failed to read uploaded file \"{path}\": {source}")
            }
            IngestError::PathConflict(path) => {
                write!(f, "Path \"{path}\" is used by both a file and a directory")
            }
            IngestError::Walk(e) => write!(f, "Folder walk error: {e}"),
            IngestError::InvalidRoot(p) => write!(f, "Not a folder: {p:?}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Read { source, .. } => Some(source),
            IngestError::Walk(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/*
 * A single uploaded entry: a '/'-separated relative path (whose first
 * segment is the uploaded folder's own name) and a deferred content read.
 * Content is only pulled when the ingester asks for it.
 */
pub trait UploadEntryOperations: Send + Sync {
    fn relative_path(&self) -> &str;
    fn read_content(&self) -> io::Result<String>;
}

/*
 * Defines the operation of turning uploaded entries into a file tree.
 * The resulting tree satisfies the sibling ordering invariant and contains
 * exactly one directory node per distinct ancestor path, regardless of the
 * order entries arrive in.
 */
pub trait UploadIngesterOperations: Send + Sync {
    fn ingest(&self, entries: &[Box<dyn UploadEntryOperations>]) -> Result<Vec<FileSystemNode>>;
}

pub struct CoreUploadIngester {}

impl CoreUploadIngester {
    pub fn new() -> Self {
        CoreUploadIngester {}
    }
}

impl Default for CoreUploadIngester {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadIngesterOperations for CoreUploadIngester {
    /*
     * Builds a fresh tree from the given entries. Ancestor directories are
     * created on demand and keyed by path, so entries sharing a prefix
     * reuse the same directory node. Any read failure aborts the whole
     * ingestion. A final pass normalizes ordering, since children are
     * accumulated in arrival order.
     */
    fn ingest(&self, entries: &[Box<dyn UploadEntryOperations>]) -> Result<Vec<FileSystemNode>> {
        let mut tree: Vec<FileSystemNode> = Vec::new();

        for entry in entries {
            let relative = entry.relative_path();
            let segments = path_utils::split_path(relative);
            let Some((file_name, dir_segments)) = segments.split_last() else {
                log::warn!("Ingest: Skipping entry with empty relative path {relative:?}.");
                continue;
            };

            let content = entry.read_content().map_err(|source| IngestError::Read {
                path: relative.to_string(),
                source,
            })?;
            insert_entry(&mut tree, dir_segments, file_name, content)?;
        }

        sort_nodes_recursively(&mut tree);
        log::debug!(
            "Ingest: Built tree with {} top-level nodes from {} entries.",
            tree.len(),
            entries.len()
        );
        Ok(tree)
    }
}

/*
 * Threads one entry into the growing tree, creating missing directories
 * along its ancestor chain. Directory creation is idempotent by path; a
 * repeated file path overwrites the earlier content rather than producing
 * a duplicate sibling.
 */
fn insert_entry(
    tree: &mut Vec<FileSystemNode>,
    dir_segments: &[&str],
    file_name: &str,
    content: String,
) -> Result<()> {
    insert_into_level(tree, None, dir_segments, file_name, content)
}

fn insert_into_level(
    level: &mut Vec<FileSystemNode>,
    parent_path: Option<&str>,
    dir_segments: &[&str],
    file_name: &str,
    content: String,
) -> Result<()> {
    let Some((segment, remaining)) = dir_segments.split_first() else {
        // The ancestor chain is in place; this level receives the file.
        match level.iter_mut().find(|node| node.name() == file_name) {
            Some(FileSystemNode::File { path, content: existing, .. }) => {
                log::debug!("Ingest: Duplicate entry for {path:?}; later content wins.");
                *existing = content;
            }
            Some(_) => {
                return Err(IngestError::PathConflict(path_utils::join_path(
                    parent_path, file_name,
                )));
            }
            None => {
                level.push(FileSystemNode::new_file(parent_path, file_name, content));
            }
        }
        return Ok(());
    };

    let dir_path = path_utils::join_path(parent_path, segment);
    let index = match level.iter().position(|node| node.name() == *segment) {
        Some(i) if level[i].is_dir() => i,
        Some(_) => return Err(IngestError::PathConflict(dir_path)),
        None => {
            level.push(FileSystemNode::new_directory(parent_path, segment));
            level.len() - 1
        }
    };

    let FileSystemNode::Directory { children, .. } = &mut level[index] else {
        unreachable!("index points at a directory checked above");
    };
    insert_into_level(children, Some(&dir_path), remaining, file_name, content)
}

/*
 * An uploaded entry backed by a file on disk. Reading is deferred until
 * the ingester asks, mirroring the deferred reads of a browser upload.
 */
pub struct DiskUploadEntry {
    absolute_path: PathBuf,
    relative_path: String,
}

impl UploadEntryOperations for DiskUploadEntry {
    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn read_content(&self) -> io::Result<String> {
        fs::read_to_string(&self.absolute_path)
    }
}

/*
 * Walks a folder the user picked and produces the flat entry list an
 * upload would supply, respecting .gitignore and the other standard ignore
 * files. Every relative path starts with the folder's own name, matching
 * how browser folder uploads report their paths.
 */
pub fn collect_folder_entries(root: &Path) -> Result<Vec<Box<dyn UploadEntryOperations>>> {
    if !root.is_dir() {
        return Err(IngestError::InvalidRoot(root.to_path_buf()));
    }
    let folder_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());
    log::debug!("Ingest: Collecting entries under {root:?} as folder {folder_name:?}.");

    let mut entries: Vec<Box<dyn UploadEntryOperations>> = Vec::new();
    let walker = WalkBuilder::new(root)
        .standard_filters(true)
        .git_global(false) // Hermetic behavior, especially in tests.
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    for entry_result in walker {
        let entry = entry_result?;
        if entry.path() == root || !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let mut segments = vec![folder_name.clone()];
        segments.extend(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        );

        entries.push(Box::new(DiskUploadEntry {
            absolute_path: entry.path().to_path_buf(),
            relative_path: segments.join("/"),
        }));
    }

    log::debug!("Ingest: Collected {} file entries.", entries.len());
    Ok(entries)
}
