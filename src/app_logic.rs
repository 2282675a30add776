/*
 * This module holds the orchestration layer: the editor session that owns
 * the current tree and selection and mediates between the UI, the pure
 * tree operations, and the injected collaborators.
 */
pub mod session;

#[cfg(test)]
mod session_tests;

pub use session::EditorSession;
