//! Flat public directory holding generated images.
//!
//! Files are named `processed_image_<unix-millis>.jpg`. The name pattern is
//! the only record the service keeps: nothing else in the directory can be
//! deleted through the store.

use crate::{Error, Result};
use log::{debug, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

const FILE_PREFIX: &str = "processed_image_";
const FILE_EXT: &str = ".jpg";

// Same-millisecond saves bump the timestamp; give up after this many.
const MAX_NAME_ATTEMPTS: u64 = 1000;

/// A freshly written image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the public directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            Error::InitializationError(format!("Failed to create public directory {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `jpeg` under a new timestamp-derived name. Never overwrites.
    pub async fn save(&self, jpeg: &[u8]) -> Result<StoredImage> {
        let mut timestamp = now_millis();
        let mut created_dir = false;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let file_name = file_name_for(timestamp);
            let path = self.dir.join(&file_name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists, trying next timestamp", file_name);
                    timestamp += 1;
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::NotFound && !created_dir => {
                    // Directory was removed while running
                    fs::create_dir_all(&self.dir)
                        .await
                        .map_err(|e| Error::WriteFailure(format!("Failed to recreate {}: {}", self.dir.display(), e)))?;
                    created_dir = true;
                    continue;
                }
                Err(e) => return Err(Error::WriteFailure(format!("Failed to create {}: {}", path.display(), e))),
            };

            let written = async {
                file.write_all(jpeg).await?;
                file.flush().await
            }
            .await;
            if let Err(e) = written {
                let _ = fs::remove_file(&path).await;
                return Err(Error::WriteFailure(format!("Failed to write {}: {}", path.display(), e)));
            }

            info!("Saved {} ({} bytes)", file_name, jpeg.len());
            return Ok(StoredImage { file_name, path });
        }

        Err(Error::WriteFailure(format!(
            "No free file name after {} attempts",
            MAX_NAME_ATTEMPTS
        )))
    }

    /// Remove a generated image by bare file name.
    ///
    /// Names not matching the generated pattern are refused before any
    /// filesystem access.
    pub async fn delete(&self, file_name: &str) -> Result<()> {
        if !is_valid_file_name(file_name) {
            return Err(Error::InvalidFilename(file_name.to_string()));
        }

        let path = self.dir.join(file_name);
        match fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => return Err(Error::NotFound(file_name.to_string())),
            Err(e) => {
                debug!("Existence check for {} failed: {}", path.display(), e);
                return Err(Error::NotFound(file_name.to_string()));
            }
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", file_name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(file_name.to_string())),
            Err(e) => Err(Error::DeleteFailure(format!("{}: {}", path.display(), e))),
        }
    }
}

/// `^processed_image_\d+\.jpg$`, ASCII digits only
pub fn is_valid_file_name(name: &str) -> bool {
    name.strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILE_EXT))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

pub fn file_name_for(timestamp_ms: u64) -> String {
    format!("{}{}{}", FILE_PREFIX, timestamp_ms, FILE_EXT)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_pattern() {
        assert!(is_valid_file_name("processed_image_1700000000000.jpg"));
        assert!(is_valid_file_name("processed_image_0.jpg"));
        assert!(!is_valid_file_name("processed_image_.jpg"));
        assert!(!is_valid_file_name("processed_image_12a.jpg"));
        assert!(!is_valid_file_name("processed_image_12.jpeg"));
        assert!(!is_valid_file_name("processed_image_12.jpg.bak"));
        assert!(!is_valid_file_name("xprocessed_image_12.jpg"));
        assert!(!is_valid_file_name("../processed_image_12.jpg"));
        assert!(!is_valid_file_name("processed_image_12.jpg/.."));
        assert!(!is_valid_file_name("../../etc/passwd"));
        assert!(!is_valid_file_name("processed_image_١٢.jpg"));
        assert_eq!(file_name_for(42), "processed_image_42.jpg");
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("public");
        let store = FileStore::open(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn save_then_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();

        let stored = store.save(b"\xFF\xD8jpeg\xFF\xD9").await.unwrap();
        assert!(is_valid_file_name(&stored.file_name));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"\xFF\xD8jpeg\xFF\xD9");

        store.delete(&stored.file_name).await.unwrap();
        assert!(!stored.path.exists());
        assert!(matches!(store.delete(&stored.file_name).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn rapid_saves_get_distinct_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        let mut names = std::collections::HashSet::new();
        for _ in 0..20 {
            names.insert(store.save(b"x").await.unwrap().file_name);
        }
        assert_eq!(names.len(), 20);
    }

    #[tokio::test]
    async fn save_recreates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("public");
        let store = FileStore::open(&dir).await.unwrap();
        std::fs::remove_dir(&dir).unwrap();

        let stored = store.save(b"x").await.unwrap();
        assert!(stored.path.exists());
    }

    #[tokio::test]
    async fn invalid_names_never_touch_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        let decoy = tmp.path().join("processed_image_abc.jpg");
        std::fs::write(&decoy, b"keep me").unwrap();

        assert!(matches!(
            store.delete("processed_image_abc.jpg").await,
            Err(Error::InvalidFilename(_))
        ));
        assert!(decoy.exists());
    }
}
