use crate::core::file_node::FileSystemNode;
use crate::core::path_utils;
use std::io::{self, Cursor, Seek, Write};
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

/*
 * This module serializes a file tree into a downloadable archive. The
 * traversal itself knows nothing about the zip format: it walks the tree
 * in child order and emits folder/file calls against an
 * `ArchiveWriterOperations` collaborator. The concrete collaborator here
 * wraps the `zip` crate; tests substitute a recording writer.
 */

#[derive(Debug)]
pub enum ArchiveError {
    Zip(ZipError),
    Io(io::Error),
}

impl From<ZipError> for ArchiveError {
    fn from(err: ZipError) -> Self {
        ArchiveError::Zip(err)
    }
}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        ArchiveError::Io(err)
    }
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::Zip(e) => write!(f, "Archive encoding error: {e}"),
            ArchiveError::Io(e) => write!(f, "Archive I/O error: {e}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Zip(e) => Some(e),
            ArchiveError::Io(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/*
 * The external archive collaborator: accepts folder and file entries
 * identified by '/'-joined paths and owns all byte-level encoding.
 */
pub trait ArchiveWriterOperations {
    fn add_folder(&mut self, path: &str) -> Result<()>;
    fn add_file(&mut self, path: &str, content: &str) -> Result<()>;
}

/*
 * Defines the operation of serializing a tree through an archive writer.
 * Entry order mirrors the tree's child order (directories first, names
 * ascending), so the archive layout is deterministic for a given tree.
 */
pub trait ArchiverOperations: Send + Sync {
    fn build(
        &self,
        nodes: &[FileSystemNode],
        writer: &mut dyn ArchiveWriterOperations,
    ) -> Result<()>;
}

pub struct CoreArchiver {}

impl CoreArchiver {
    pub fn new() -> Self {
        CoreArchiver {}
    }
}

impl Default for CoreArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiverOperations for CoreArchiver {
    fn build(
        &self,
        nodes: &[FileSystemNode],
        writer: &mut dyn ArchiveWriterOperations,
    ) -> Result<()> {
        write_nodes(nodes, None, writer)
    }
}

/*
 * Recursive descent over the tree. Entry paths are rebuilt from node names
 * as the walk descends, which keeps the writer scoped to the traversal the
 * way a per-folder sub-writer would be.
 */
fn write_nodes(
    nodes: &[FileSystemNode],
    prefix: Option<&str>,
    writer: &mut dyn ArchiveWriterOperations,
) -> Result<()> {
    for node in nodes {
        match node {
            FileSystemNode::Directory { name, children, .. } => {
                let folder_path = path_utils::join_path(prefix, name);
                writer.add_folder(&folder_path)?;
                write_nodes(children, Some(&folder_path), writer)?;
            }
            FileSystemNode::File { name, content, .. } => {
                writer.add_file(&path_utils::join_path(prefix, name), content)?;
            }
        }
    }
    Ok(())
}

/*
 * The zip-backed archive writer. File bodies are stored as UTF-8 text with
 * the crate's default compression settings.
 */
pub struct ZipArchiveWriter<W: Write + Seek> {
    inner: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    pub fn new(sink: W) -> Self {
        ZipArchiveWriter {
            inner: ZipWriter::new(sink),
            options: SimpleFileOptions::default(),
        }
    }

    /*
     * Finalizes the central directory and hands back the underlying sink.
     */
    pub fn finish(self) -> Result<W> {
        Ok(self.inner.finish()?)
    }
}

impl<W: Write + Seek> ArchiveWriterOperations for ZipArchiveWriter<W> {
    fn add_folder(&mut self, path: &str) -> Result<()> {
        self.inner.add_directory(path, self.options)?;
        Ok(())
    }

    fn add_file(&mut self, path: &str, content: &str) -> Result<()> {
        self.inner.start_file(path, self.options)?;
        self.inner.write_all(content.as_bytes())?;
        Ok(())
    }
}

/*
 * Serializes a whole tree to in-memory zip bytes, ready to be offered as
 * the download.
 */
pub fn write_zip_archive(nodes: &[FileSystemNode]) -> Result<Vec<u8>> {
    let mut writer = ZipArchiveWriter::new(Cursor::new(Vec::new()));
    CoreArchiver::new().build(nodes, &mut writer)?;
    let cursor = writer.finish()?;
    log::debug!(
        "Archiver: Serialized tree into {} archive bytes.",
        cursor.get_ref().len()
    );
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree_model::{NodeKind, create_node, update_file_content};
    use std::io::Read;
    use zip::ZipArchive;

    /*
     * Records folder/file calls as flat strings so tests can assert on the
     * exact emission order.
     */
    struct RecordingWriter {
        calls: Vec<String>,
    }

    impl RecordingWriter {
        fn new() -> Self {
            RecordingWriter { calls: Vec::new() }
        }
    }

    impl ArchiveWriterOperations for RecordingWriter {
        fn add_folder(&mut self, path: &str) -> Result<()> {
            self.calls.push(format!("folder {path}"));
            Ok(())
        }

        fn add_file(&mut self, path: &str, content: &str) -> Result<()> {
            self.calls.push(format!("file {path}={content}"));
            Ok(())
        }
    }

    fn sample_tree() -> Vec<FileSystemNode> {
        vec![FileSystemNode::Directory {
            name: "a".to_string(),
            path: "a".to_string(),
            children: vec![
                FileSystemNode::Directory {
                    name: "c".to_string(),
                    path: "a/c".to_string(),
                    children: vec![FileSystemNode::new_file(
                        Some("a/c"),
                        "d.txt",
                        "world".to_string(),
                    )],
                },
                FileSystemNode::new_file(Some("a"), "b.txt", "hello".to_string()),
            ],
        }]
    }

    #[test]
    fn test_build_emits_entries_in_child_order() {
        let tree = sample_tree();
        let mut writer = RecordingWriter::new();

        CoreArchiver::new().build(&tree, &mut writer).unwrap();

        assert_eq!(
            writer.calls,
            vec![
                "folder a",
                "folder a/c",
                "file a/c/d.txt=world",
                "file a/b.txt=hello",
            ]
        );
    }

    #[test]
    fn test_zip_round_trip_preserves_paths_and_bytes() {
        let tree = sample_tree();
        let bytes = write_zip_archive(&tree).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
        assert!(names.contains(&"a/c/".to_string()));

        let mut body = String::new();
        archive
            .by_name("a/b.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "hello");

        body.clear();
        archive
            .by_name("a/c/d.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "world");
    }

    #[test]
    fn test_empty_tree_produces_empty_archive() {
        let bytes = write_zip_archive(&[]).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_create_update_archive_end_to_end() {
        // Build up from an empty tree through the pure operations, then
        // decode the archive and expect exactly the one written file.
        let tree = create_node(&[], None, "src", NodeKind::Directory).unwrap();
        let tree = create_node(&tree, Some("src"), "index.txt", NodeKind::File).unwrap();
        let tree = update_file_content(&tree, "src/index.txt", "hi");

        let bytes = write_zip_archive(&tree).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let file_entries: Vec<String> = archive
            .file_names()
            .filter(|n| !n.ends_with('/'))
            .map(|n| n.to_string())
            .collect();
        assert_eq!(file_entries, vec!["src/index.txt"]);

        let mut body = String::new();
        archive
            .by_name("src/index.txt")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "hi");
    }
}
