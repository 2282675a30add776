use super::session::EditorSession;
use crate::core::{
    CoreArchiver, FileSystemNode, IngestError, NodeKind, RewriteError, RewriteServiceOperations,
    UploadEntryOperations, UploadIngesterOperations, find_directory,
};
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use zip::ZipArchive;

/*
 * Mock collaborators. The ingester replays a canned tree (or fails), the
 * rewrite service returns a canned response (or fails); the archiver is
 * the real one, since its output is what the download tests decode.
 */

struct MockIngester {
    tree: Vec<FileSystemNode>,
    fail: bool,
}

impl UploadIngesterOperations for MockIngester {
    fn ingest(
        &self,
        _entries: &[Box<dyn UploadEntryOperations>],
    ) -> Result<Vec<FileSystemNode>, IngestError> {
        if self.fail {
            Err(IngestError::Read {
                path: "mock/file.txt".to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "mock read failure"),
            })
        } else {
            Ok(self.tree.clone())
        }
    }
}

struct MockRewriteService {
    response: Option<String>, // None simulates a service failure.
}

impl RewriteServiceOperations for MockRewriteService {
    fn rewrite(&self, _code: &str, _instruction: &str) -> Result<String, RewriteError> {
        self.response
            .clone()
            .ok_or(RewriteError::MissingApiKey)
    }
}

fn sample_tree() -> Vec<FileSystemNode> {
    vec![FileSystemNode::Directory {
        name: "src".to_string(),
        path: "src".to_string(),
        children: vec![FileSystemNode::new_file(
            Some("src"),
            "main.rs",
            "fn main() {}".to_string(),
        )],
    }]
}

fn session_with(
    tree: Vec<FileSystemNode>,
    ingest_fails: bool,
    rewrite_response: Option<String>,
) -> EditorSession {
    EditorSession::new(
        Arc::new(MockIngester {
            tree,
            fail: ingest_fails,
        }),
        Arc::new(MockRewriteService {
            response: rewrite_response,
        }),
        Arc::new(CoreArchiver::new()),
    )
}

fn loaded_session() -> EditorSession {
    let mut session = session_with(sample_tree(), false, Some("rewritten".to_string()));
    assert!(session.load_entries(&[]));
    session
}

#[test]
fn test_load_entries_replaces_tree_and_clears_selection() {
    let mut session = loaded_session();
    assert!(session.select_file("src/main.rs"));

    assert!(session.load_entries(&[]));
    assert_eq!(session.selected_path(), None);
    assert!(session.last_error().is_none());
    assert!(find_directory(session.file_tree(), "src").is_some());
}

#[test]
fn test_load_entries_failure_keeps_previous_tree() {
    let mut session = loaded_session();
    session.ingester = Arc::new(MockIngester {
        tree: Vec::new(),
        fail: true,
    });

    assert!(!session.load_entries(&[]));
    assert_eq!(session.file_tree().len(), 1, "prior tree must survive");
    assert!(
        session
            .last_error()
            .is_some_and(|msg| msg.contains("Failed to process uploaded folder"))
    );
}

#[test]
fn test_select_file_rejects_directories_and_unknown_paths() {
    let mut session = loaded_session();
    assert!(!session.select_file("src"));
    assert!(!session.select_file("does/not/exist.txt"));
    assert_eq!(session.selected_path(), None);

    assert!(session.select_file("src/main.rs"));
    assert_eq!(session.selected_path(), Some("src/main.rs"));
    assert_eq!(session.selected_content(), Some("fn main() {}"));
}

#[test]
fn test_edit_selected_content_updates_tree() {
    let mut session = loaded_session();
    session.select_file("src/main.rs");

    session.edit_selected_content("fn main() { println!(); }");
    assert_eq!(session.selected_content(), Some("fn main() { println!(); }"));
}

#[test]
fn test_create_entry_duplicate_sets_error_and_keeps_tree() {
    let mut session = loaded_session();
    let before = session.file_tree().to_vec();

    assert!(!session.create_entry(Some("src"), "main.rs", NodeKind::Directory));
    assert_eq!(session.file_tree(), &before[..]);
    assert!(session.last_error().is_some_and(|msg| msg.contains("main.rs")));
}

#[test]
fn test_create_entry_success_clears_error() {
    let mut session = loaded_session();
    session.create_entry(Some("src"), "main.rs", NodeKind::File); // Seed an error.
    assert!(session.last_error().is_some());

    assert!(session.create_entry(Some("src"), "lib.rs", NodeKind::File));
    assert!(session.last_error().is_none());
}

#[test]
fn test_submit_rewrite_success_installs_new_content() {
    let mut session = loaded_session();
    session.select_file("src/main.rs");

    assert!(session.submit_rewrite("make it better"));
    assert_eq!(session.selected_content(), Some("rewritten"));
    assert!(session.last_error().is_none());
}

#[test]
fn test_submit_rewrite_failure_leaves_content_untouched() {
    let mut session = loaded_session();
    session.rewrite_service = Arc::new(MockRewriteService { response: None });
    session.select_file("src/main.rs");

    assert!(!session.submit_rewrite("make it better"));
    assert_eq!(session.selected_content(), Some("fn main() {}"));
    assert!(
        session
            .last_error()
            .is_some_and(|msg| msg.contains("Failed to get a response from the AI"))
    );
}

#[test]
fn test_submit_rewrite_requires_selection_and_instruction() {
    let mut session = loaded_session();
    assert!(!session.submit_rewrite("no file selected"));
    assert!(session.last_error().is_some());

    session.acknowledge_error();
    session.select_file("src/main.rs");
    assert!(!session.submit_rewrite("   "));
    assert!(session.last_error().is_some());
}

#[test]
fn test_submit_rewrite_rejected_while_one_is_outstanding() {
    let mut session = loaded_session();
    session.select_file("src/main.rs");
    session.rewrite_in_flight = true;

    assert!(!session.submit_rewrite("second request"));
    assert!(
        session
            .last_error()
            .is_some_and(|msg| msg.contains("already in progress"))
    );
    assert_eq!(session.selected_content(), Some("fn main() {}"));
}

#[test]
fn test_archive_bytes_empty_tree_sets_error() {
    let mut session = session_with(Vec::new(), false, None);
    assert!(session.archive_bytes().is_none());
    assert_eq!(session.last_error(), Some("No files to download."));
}

#[test]
fn test_archive_bytes_round_trips_through_zip_decoder() {
    let mut session = loaded_session();
    session.select_file("src/main.rs");
    session.edit_selected_content("hi");

    let bytes = session.archive_bytes().expect("archive should serialize");
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut body = String::new();
    archive
        .by_name("src/main.rs")
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "hi");
}

#[test]
fn test_acknowledge_error_clears_message() {
    let mut session = loaded_session();
    session.create_entry(None, "   ", NodeKind::File);
    assert!(session.last_error().is_some());

    session.acknowledge_error();
    assert!(session.last_error().is_none());
}
