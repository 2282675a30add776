/*
 * This module consolidates the core, UI-agnostic logic of the editor. It
 * re-exports the tree data model, the pure tree operations, and the
 * collaborator abstractions (`UploadIngesterOperations`,
 * `ArchiverOperations`, `RewriteServiceOperations`,
 * `ConfigManagerOperations`) together with their concrete implementations.
 */
pub mod archiver;
pub mod config;
pub mod file_node;
pub mod ingest;
pub mod path_utils;
pub mod rewrite;
pub mod tree_model;

// Re-export key structures and enums
pub use file_node::{FileSystemNode, sort_nodes_recursively};
pub use tree_model::{NodeKind, TreeError, create_node, find_directory, find_file, update_file_content};

// Re-export ingestion related items
pub use ingest::{
    CoreUploadIngester, DiskUploadEntry, IngestError, UploadEntryOperations,
    UploadIngesterOperations, collect_folder_entries,
};

// Re-export archiver related items
pub use archiver::{
    ArchiveError, ArchiveWriterOperations, ArchiverOperations, CoreArchiver, ZipArchiveWriter,
    write_zip_archive,
};

// Re-export rewrite service related items
pub use rewrite::{GeminiRewriteService, RewriteError, RewriteServiceOperations};

// Re-export config related items
pub use config::{ConfigManagerOperations, CoreConfigManager};
