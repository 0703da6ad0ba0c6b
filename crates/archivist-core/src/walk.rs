//! Deterministic enumeration of auxiliary trees.

use crate::error::{BuildError, BuildResult};
use crate::group::SourceFileRef;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::error;
use walkdir::WalkDir;

/// What to do when part of a tree cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkPolicy {
    /// Log the failure and keep whatever was enumerated.
    #[default]
    Skip,
    /// Abort the run on the first failure.
    Abort,
}

/// List every directory and file under `root`, depth-first, siblings sorted
/// by file name. The root itself is not listed, so an empty tree yields an
/// empty list.
pub fn list_tree(root: &Path, policy: WalkPolicy) -> BuildResult<Vec<SourceFileRef>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                let path = entry.path().to_path_buf();
                if entry.file_type().is_dir() {
                    out.push(SourceFileRef::dir(path));
                } else {
                    out.push(SourceFileRef::file(path));
                }
            }
            Err(e) => match policy {
                WalkPolicy::Abort => {
                    return Err(BuildError::Walk {
                        root: root.to_path_buf(),
                        source: e,
                    })
                }
                WalkPolicy::Skip => {
                    let at = e.path().unwrap_or(root).display().to_string();
                    error!(root = %root.display(), path = %at, error = %e, "cannot be accessed, skipping");
                }
            },
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_directories_and_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/empty")).unwrap();
        fs::write(root.join("b/z.txt"), b"z").unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();

        let listed = list_tree(root, WalkPolicy::Skip).unwrap();
        let rel: Vec<(String, bool)> = listed
            .iter()
            .map(|f| {
                (
                    f.path
                        .strip_prefix(root)
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/"),
                    f.is_dir,
                )
            })
            .collect();
        assert_eq!(
            rel,
            vec![
                ("a.txt".to_string(), false),
                ("b".to_string(), true),
                ("b/empty".to_string(), true),
                ("b/z.txt".to_string(), false),
            ]
        );
    }

    #[test]
    fn empty_root_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_tree(dir.path(), WalkPolicy::Skip).unwrap().is_empty());
        assert!(list_tree(dir.path(), WalkPolicy::Abort).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_empty_under_skip() {
        let dir = tempfile::tempdir().unwrap();
        let listed = list_tree(&dir.path().join("absent"), WalkPolicy::Skip).unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn missing_root_aborts_under_abort() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_tree(&dir.path().join("absent"), WalkPolicy::Abort).unwrap_err();
        assert!(matches!(err, BuildError::Walk { .. }));
    }
}
