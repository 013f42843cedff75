//! Filesystem storage for downloaded box images

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use crate::domain::{AssetStore, StoredAsset};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

/// Writes assets into one directory, overwriting files from earlier runs
#[derive(Debug, Clone)]
pub struct FileSystemAssetStore {
    dir: PathBuf,
    link_prefix: String,
}

impl FileSystemAssetStore {
    pub fn new(dir: impl Into<PathBuf>, link_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            link_prefix: link_prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn link_for(&self, name: &str) -> String {
        let prefix = self.link_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }
}

#[async_trait]
impl AssetStore for FileSystemAssetStore {
    async fn store(&self, name: &str, bytes: &[u8]) -> ParsingResult<StoredAsset> {
        let path = self.dir.join(name);
        let storage_failed = |e: std::io::Error| ParsingError::AssetStorageFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.dir).await.map_err(storage_failed)?;
        fs::write(&path, bytes).await.map_err(storage_failed)?;
        info!("File written to: {}", path.display());

        Ok(StoredAsset {
            link: self.link_for(name),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_bytes_and_builds_link() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemAssetStore::new(dir.path().join("assets"), "assets/");

        let stored = store.store("hackerbox-0041-circuit-breaker.png", b"\x89PNG").await.unwrap();

        assert_eq!(stored.link, "assets/hackerbox-0041-circuit-breaker.png");
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"\x89PNG");
        assert_eq!(stored.path.parent().unwrap(), store.dir());
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemAssetStore::new(dir.path(), "");

        store.store("box.png", b"old").await.unwrap();
        let stored = store.store("box.png", b"new").await.unwrap();

        assert_eq!(stored.link, "box.png");
        assert_eq!(std::fs::read(stored.path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn unwritable_location_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let store = FileSystemAssetStore::new(blocker.join("assets"), "assets");
        let err = store.store("box.png", b"x").await.unwrap_err();
        assert!(matches!(err, ParsingError::AssetStorageFailed { .. }));
    }
}
