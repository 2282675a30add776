use crate::core::{
    ArchiverOperations, FileSystemNode, NodeKind, RewriteServiceOperations,
    UploadEntryOperations, UploadIngesterOperations, ZipArchiveWriter, tree_model,
};
use std::io::Cursor;
use std::sync::Arc;

/* Default name offered for the downloaded archive. */
pub const DEFAULT_ARCHIVE_NAME: &str = "edited-code.zip";

/*
 * Owns the state of one editing session: the current tree, the selected
 * file, a single user-visible error slot, and the rewrite-in-flight flag.
 * All collaborators are injected behind their operation traits so the
 * session can be driven entirely by mocks in tests.
 *
 * Every failing operation is recovered here and surfaced through the error
 * slot; the tree either moves to a fully built replacement or stays as it
 * was. Each mutation works on the current tree and installs its result
 * atomically as the new current tree.
 */
pub struct EditorSession {
    pub(crate) file_tree: Vec<FileSystemNode>,
    pub(crate) selected_path: Option<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) rewrite_in_flight: bool,
    pub(crate) ingester: Arc<dyn UploadIngesterOperations>,
    pub(crate) rewrite_service: Arc<dyn RewriteServiceOperations>,
    pub(crate) archiver: Arc<dyn ArchiverOperations>,
}

impl EditorSession {
    pub fn new(
        ingester: Arc<dyn UploadIngesterOperations>,
        rewrite_service: Arc<dyn RewriteServiceOperations>,
        archiver: Arc<dyn ArchiverOperations>,
    ) -> Self {
        EditorSession {
            file_tree: Vec::new(),
            selected_path: None,
            last_error: None,
            rewrite_in_flight: false,
            ingester,
            rewrite_service,
            archiver,
        }
    }

    pub fn file_tree(&self) -> &[FileSystemNode] {
        &self.file_tree
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected_path.as_deref()
    }

    pub fn selected_content(&self) -> Option<&str> {
        let path = self.selected_path.as_deref()?;
        tree_model::find_file(&self.file_tree, path).and_then(|node| node.content())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /* Dismisses the active error message. */
    pub fn acknowledge_error(&mut self) {
        self.last_error = None;
    }

    /*
     * Replaces the whole session tree with the result of ingesting the
     * given entries. On failure the previous tree and selection survive
     * untouched and the error is surfaced. Success clears both the
     * selection and any active error, since the new tree shares nothing
     * with the old one.
     */
    pub fn load_entries(&mut self, entries: &[Box<dyn UploadEntryOperations>]) -> bool {
        match self.ingester.ingest(entries) {
            Ok(tree) => {
                log::info!(
                    "Session: Loaded {} entries into {} top-level nodes.",
                    entries.len(),
                    tree.len()
                );
                self.file_tree = tree;
                self.selected_path = None;
                self.last_error = None;
                true
            }
            Err(e) => {
                log::warn!("Session: Ingestion failed: {e}");
                self.last_error = Some(format!("Failed to process uploaded folder: {e}"));
                false
            }
        }
    }

    /*
     * Selects the file at `path` for editing. Directories and unknown
     * paths are not selectable.
     */
    pub fn select_file(&mut self, path: &str) -> bool {
        if tree_model::find_file(&self.file_tree, path).is_some() {
            self.selected_path = Some(path.to_string());
            true
        } else {
            log::debug!("Session: Ignoring selection of non-file path {path:?}.");
            false
        }
    }

    /*
     * Applies an editor keystroke: replaces the selected file's content.
     * With no selection this does nothing.
     */
    pub fn edit_selected_content(&mut self, new_content: &str) {
        if let Some(path) = self.selected_path.clone() {
            self.file_tree = tree_model::update_file_content(&self.file_tree, &path, new_content);
        }
    }

    /*
     * Creates a new empty file or directory under `parent_path` (top level
     * when None). Tree errors are surfaced through the error slot and
     * leave the tree untouched.
     */
    pub fn create_entry(&mut self, parent_path: Option<&str>, name: &str, kind: NodeKind) -> bool {
        match tree_model::create_node(&self.file_tree, parent_path, name, kind) {
            Ok(tree) => {
                self.file_tree = tree;
                self.last_error = None;
                true
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /*
     * Sends the selected file's content and the instruction to the AI
     * collaborator and installs the rewritten text on success. Only one
     * rewrite may be outstanding at a time; a failed call leaves the
     * content exactly as it was.
     */
    pub fn submit_rewrite(&mut self, instruction: &str) -> bool {
        if self.rewrite_in_flight {
            self.last_error = Some("An AI rewrite is already in progress.".to_string());
            return false;
        }
        let Some(path) = self.selected_path.clone() else {
            self.last_error = Some("Please select a file and enter a prompt.".to_string());
            return false;
        };
        if instruction.trim().is_empty() {
            self.last_error = Some("Please select a file and enter a prompt.".to_string());
            return false;
        }
        let Some(content) = self.selected_content().map(str::to_string) else {
            // Selection points at a path the current tree no longer has.
            self.last_error = Some("Please select a file and enter a prompt.".to_string());
            return false;
        };

        self.rewrite_in_flight = true;
        log::info!("Session: Submitting AI rewrite for {path:?}.");
        let result = self.rewrite_service.rewrite(&content, instruction);
        self.rewrite_in_flight = false;

        match result {
            Ok(rewritten) => {
                self.file_tree =
                    tree_model::update_file_content(&self.file_tree, &path, &rewritten);
                self.last_error = None;
                true
            }
            Err(e) => {
                log::warn!("Session: AI rewrite failed: {e}");
                self.last_error = Some(format!("Failed to get a response from the AI: {e}"));
                false
            }
        }
    }

    /*
     * Serializes the current tree into zip bytes ready to be saved as the
     * download. An empty tree is reported through the error slot rather
     * than producing an empty archive.
     */
    pub fn archive_bytes(&mut self) -> Option<Vec<u8>> {
        if self.file_tree.is_empty() {
            self.last_error = Some("No files to download.".to_string());
            return None;
        }

        let mut writer = ZipArchiveWriter::new(Cursor::new(Vec::new()));
        let built = self
            .archiver
            .build(&self.file_tree, &mut writer)
            .and_then(|_| writer.finish());
        match built {
            Ok(cursor) => Some(cursor.into_inner()),
            Err(e) => {
                log::warn!("Session: Archive serialization failed: {e}");
                self.last_error = Some(format!("Failed to create the zip archive: {e}"));
                None
            }
        }
    }
}
