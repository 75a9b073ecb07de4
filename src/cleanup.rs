use std::fs;
use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

/// Remove `root` and everything below it.
///
/// Walks depth first with contents before their directory. Failures are
/// logged and the walk continues; returns `true` only when every entry,
/// `root` included, was removed. A missing `root` counts as removed.
pub fn remove_tree(root: &Path) -> bool {
    if !root.exists() {
        return true;
    }

    let mut all_removed = true;

    for entry in WalkDir::new(root).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("failed to walk {}: {}", root.display(), e);
                all_removed = false;
                continue;
            }
        };

        let path = entry.path();
        let result = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };

        if let Err(e) = result {
            warn!("failed to remove {}: {}", path.display(), e);
            all_removed = false;
        }
    }

    debug!("removed {} (complete: {})", root.display(), all_removed);

    all_removed && !root.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("temp1");
        fs::create_dir_all(root.join("split")).unwrap();
        fs::create_dir_all(root.join("sortgroup").join("deeper")).unwrap();
        fs::write(root.join("split").join("0.txt"), "a\n").unwrap();
        fs::write(root.join("sortgroup").join("0.txt"), "a 1\n").unwrap();
        fs::write(root.join("sortgroup").join("deeper").join("x"), "").unwrap();

        assert!(remove_tree(&root));
        assert!(!root.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn missing_root_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_tree(&dir.path().join("never-created")));
    }

    #[test]
    fn single_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lonely.txt");
        fs::write(&file, "x").unwrap();

        assert!(remove_tree(&file));
        assert!(!file.exists());
    }
}
