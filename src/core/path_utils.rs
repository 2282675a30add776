/*
 * This module provides utility functions for manipulating the slash-joined
 * path strings that identify nodes in the file tree. It centralizes the
 * splitting, joining, and sibling-ordering comparisons used by the tree
 * model, the upload ingester, and the archiver.
 */
use std::cmp::Ordering;

/*
 * Splits a path into its non-empty segments.
 * Leading, trailing, and doubled slashes all collapse, so "a//b/" and
 * "/a/b" both yield ["a", "b"]. An all-slash or empty input yields an
 * empty vector.
 */
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/*
 * Joins a parent path and a child name into the child's full path.
 * A missing or empty parent means the child sits at the top level, so its
 * path is just its name. The function never introduces doubled slashes
 * because node names are forbidden from containing '/'.
 */
pub fn join_path(parent_path: Option<&str>, name: &str) -> String {
    match parent_path {
        Some(parent) if !parent.is_empty() => format!("{parent}/{name}"),
        _ => name.to_string(),
    }
}

/*
 * Compares two sibling names for the ascending portion of the ordering
 * invariant. Plain code-point comparison keeps the ordering deterministic
 * across platforms; there is no locale table involved.
 */
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_simple() {
        assert_eq!(split_path("src/main.rs"), vec!["src", "main.rs"]);
        assert_eq!(split_path("README.md"), vec!["README.md"]);
    }

    #[test]
    fn test_split_path_collapses_empty_segments() {
        assert_eq!(split_path("/src//lib.rs/"), vec!["src", "lib.rs"]);
        assert_eq!(split_path("//"), Vec::<&str>::new());
        assert_eq!(split_path(""), Vec::<&str>::new());
    }

    #[test]
    fn test_join_path_with_parent() {
        assert_eq!(join_path(Some("src"), "main.rs"), "src/main.rs");
        assert_eq!(join_path(Some("a/b"), "c.txt"), "a/b/c.txt");
    }

    #[test]
    fn test_join_path_without_parent() {
        assert_eq!(join_path(None, "src"), "src");
        assert_eq!(join_path(Some(""), "src"), "src");
    }

    #[test]
    fn test_compare_names_is_ascending() {
        assert_eq!(compare_names("alpha", "beta"), Ordering::Less);
        assert_eq!(compare_names("beta", "alpha"), Ordering::Greater);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }
}
