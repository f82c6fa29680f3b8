//! Filesystem store for generated images.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Writes generated images under a public static-serving root.
///
/// Names are collision-resistant (UUID v4 hex), so a write never clobbers an
/// earlier artifact.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::Storage(e.to_string()))?;
        tracing::info!("Artifact store initialized at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write PNG bytes under a fresh name and return the public URL.
    pub fn save(&self, bytes: &[u8]) -> Result<String> {
        let file_name = format!("{}.png", uuid::Uuid::new_v4().simple());
        let path = self.root.join(&file_name);
        fs::write(&path, bytes).map_err(|e| Error::Storage(e.to_string()))?;
        tracing::debug!("Saved artifact {}", path.display());
        Ok(format!("static/{}", file_name))
    }

    /// Resolve a record's image_url to its file under the root.
    pub fn path_for(&self, image_url: &str) -> Option<PathBuf> {
        Path::new(image_url)
            .file_name()
            .map(|name| self.root.join(name))
    }

    /// Delete the artifact a record references. A file that is already gone
    /// is not an error.
    pub fn delete(&self, image_url: &str) -> Result<()> {
        let Some(path) = self.path_for(image_url) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted artifact {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_writes_png_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let url = store.save(b"not really a png").unwrap();
        assert!(url.starts_with("static/"));
        assert!(url.ends_with(".png"));

        let path = store.path_for(&url).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"not really a png");
    }

    #[test]
    fn test_save_never_reuses_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let first = store.save(b"a").unwrap();
        let second = store.save(b"b").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        let url = store.save(b"bytes").unwrap();
        let path = store.path_for(&url).unwrap();
        assert!(path.exists());

        store.delete(&url).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();

        store.delete("static/nothing-here.png").unwrap();
    }

    #[test]
    fn test_new_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/static");
        ArtifactStore::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
