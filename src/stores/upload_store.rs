use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::UploadError;

/// URL prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Profile images on the local filesystem
///
/// Files are named `<uuid>.<ext>` and referenced from accounts by their
/// public path `/uploads/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), InternalError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| UploadError::Write {
                path: self.dir.clone(),
                source,
            })?;
        Ok(())
    }

    /// Write an image and return its public path
    ///
    /// # Errors
    /// * `UploadError::Rejected` - empty file or extension outside the image allow-list
    /// * `UploadError::Write` - filesystem failure
    pub async fn save(&self, file_name: Option<&str>, bytes: &[u8]) -> Result<String, InternalError> {
        if bytes.is_empty() {
            return Err(UploadError::Rejected("empty file".to_string()).into());
        }

        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                UploadError::Rejected(format!(
                    "unsupported image type '{}'",
                    file_name.unwrap_or_default()
                ))
            })?;

        self.ensure_dir().await?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.dir.join(&stored_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| UploadError::Write { path: path.clone(), source })?;

        tracing::debug!(file = %stored_name, size = bytes.len(), "Stored upload");

        Ok(format!("{}/{}", PUBLIC_PREFIX, stored_name))
    }

    /// Delete the file behind a public path; `false` if it was already gone
    pub async fn remove(&self, public_path: &str) -> Result<bool, InternalError> {
        let Some(path) = self.file_path(public_path) else {
            tracing::warn!(public_path, "Refusing to remove path outside the upload directory");
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(UploadError::Remove { path, source }.into()),
        }
    }

    /// Remove without failing the caller; used for cleanup after the row has been written
    pub async fn remove_quietly(&self, public_path: &str) {
        if let Err(e) = self.remove(public_path).await {
            tracing::warn!(public_path, error = %e, "Failed to remove upload");
        }
    }

    /// Public paths of every file in the upload directory
    pub async fn list(&self) -> Result<Vec<String>, InternalError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(UploadError::ReadDir {
                    path: self.dir.clone(),
                    source,
                }
                .into());
            }
        };

        let mut paths = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|source| UploadError::ReadDir {
                path: self.dir.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };

            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if let (true, Some(name)) = (is_file, entry.file_name().to_str()) {
                paths.push(format!("{}/{}", PUBLIC_PREFIX, name));
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Map `/uploads/<name>` to a file inside the upload directory
    ///
    /// Only a single plain path component is accepted.
    pub fn file_path(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_uuid_named_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"));

        let public_path = store.save(Some("Portrait.PNG"), b"png-bytes").await.unwrap();

        assert!(public_path.starts_with("/uploads/"));
        assert!(public_path.ends_with(".png"));
        let file = store.file_path(&public_path).unwrap();
        assert_eq!(tokio::fs::read(&file).await.unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_save_rejects_non_images_and_empty_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());

        let result = store.save(Some("script.sh"), b"#!/bin/sh").await;
        assert!(matches!(result, Err(InternalError::Upload(UploadError::Rejected(_)))));

        let result = store.save(Some("empty.png"), b"").await;
        assert!(matches!(result, Err(InternalError::Upload(UploadError::Rejected(_)))));

        let result = store.save(None, b"bytes").await;
        assert!(matches!(result, Err(InternalError::Upload(UploadError::Rejected(_)))));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path());
        let public_path = store.save(Some("a.jpg"), b"jpg").await.unwrap();

        assert!(store.remove(&public_path).await.unwrap());
        assert!(!store.remove(&public_path).await.unwrap());
    }

    #[test]
    fn test_file_path_rejects_traversal() {
        let store = UploadStore::new("/srv/uploads");

        assert_eq!(
            store.file_path("/uploads/abc.png"),
            Some(PathBuf::from("/srv/uploads/abc.png"))
        );
        assert_eq!(store.file_path("/uploads/../etc/passwd"), None);
        assert_eq!(store.file_path("/uploads/.."), None);
        assert_eq!(store.file_path("/elsewhere/abc.png"), None);
        assert_eq!(store.file_path("/uploads/"), None);
    }

    #[tokio::test]
    async fn test_list_returns_public_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("missing"));
        assert!(store.list().await.unwrap().is_empty());

        let first = store.save(Some("a.png"), b"a").await.unwrap();
        let second = store.save(Some("b.gif"), b"b").await.unwrap();

        let mut expected = vec![first, second];
        expected.sort();
        assert_eq!(store.list().await.unwrap(), expected);
    }
}
