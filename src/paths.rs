//! Path utilities for manifest detection.

use crate::config::MANIFEST_FILE;
use std::path::{Path, PathBuf};

/// Find `extbind.toml` in `dir` or the nearest ancestor that has one.
#[must_use]
pub fn find_manifest_in(dir: impl AsRef<Path>) -> Option<PathBuf> {
    dir.as_ref()
        .ancestors()
        .map(|d| d.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
}

/// Resolve `path` against `root` unless it is already absolute.
#[must_use]
pub fn resolve_in(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_manifest_in_same_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "").unwrap();
        assert_eq!(
            find_manifest_in(temp.path()),
            Some(temp.path().join(MANIFEST_FILE))
        );
    }

    #[test]
    fn nearest_ancestor_wins() {
        let temp = TempDir::new().unwrap();
        let inner = temp.path().join("bindings");
        let deeper = inner.join("python");
        fs::create_dir_all(&deeper).unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "").unwrap();
        fs::write(inner.join(MANIFEST_FILE), "").unwrap();

        assert_eq!(find_manifest_in(&deeper), Some(inner.join(MANIFEST_FILE)));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Path::new("/project");
        assert_eq!(resolve_in(root, "build"), PathBuf::from("/project/build"));
        if cfg!(unix) {
            assert_eq!(resolve_in(root, "/tmp/out"), PathBuf::from("/tmp/out"));
        }
    }
}
