use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

/// Finds a document on disk from part of its name.
pub trait FileLocator {
    /// First file under `root` whose name contains `partial_name`.
    fn locate(&self, root: &Path, partial_name: &str) -> Option<PathBuf>;
}

/// Depth-first directory walk, visiting entries in file-name order.
#[derive(Debug, Clone, Default)]
pub struct WalkLocator {
    max_depth: Option<usize>,
}

impl WalkLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many directory levels below the root are searched.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

impl FileLocator for WalkLocator {
    fn locate(&self, root: &Path, partial_name: &str) -> Option<PathBuf> {
        let mut walker = WalkDir::new(root).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let found = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    trace!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| entry.file_name().to_string_lossy().contains(partial_name))
            .map(|entry| entry.into_path());

        debug!(
            "Looked for {:?} under {}: {:?}",
            partial_name,
            root.display(),
            found
        );
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/deep")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a/deep/rechnung_2024.pdf"), "").unwrap();
        fs::write(dir.path().join("b/rechnung_2023.txt"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        dir
    }

    #[test]
    fn test_depth_first_order() {
        let dir = tree();
        let found = WalkLocator::new().locate(dir.path(), "rechnung").unwrap();

        assert_eq!(found, dir.path().join("a/deep/rechnung_2024.pdf"));
    }

    #[test]
    fn test_partial_name() {
        let dir = tree();
        let found = WalkLocator::new().locate(dir.path(), "2023").unwrap();

        assert_eq!(found, dir.path().join("b/rechnung_2023.txt"));
    }

    #[test]
    fn test_directories_are_not_matches() {
        let dir = tree();
        assert_eq!(WalkLocator::new().locate(dir.path(), "deep"), None);
    }

    #[test]
    fn test_max_depth() {
        let dir = tree();
        let locator = WalkLocator::new().with_max_depth(2);

        assert_eq!(
            locator.locate(dir.path(), "rechnung"),
            Some(dir.path().join("b/rechnung_2023.txt"))
        );
    }

    #[test]
    fn test_not_found() {
        let dir = tree();
        assert_eq!(WalkLocator::new().locate(dir.path(), "missing"), None);
        assert_eq!(WalkLocator::new().locate(&dir.path().join("nope"), "notes"), None);
    }
}
