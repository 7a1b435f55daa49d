//! File-based key-value backend.
//!
//! Stores one file per entry with a 2-level fan-out directory structure:
//! `{base_dir}/{hex[0..2]}/{hex[2..4]}/{hex}`, where `hex` is the
//! hex-encoded key.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::backend::KvBackend;
use crate::error::BackendError;

/// File-based backend with a 2-level fan-out directory layout.
///
/// Writes are atomic: data is written to a temporary file first, then
/// renamed into place, so a crash mid-write never leaves a half-written
/// entry behind.
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, BackendError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Compute the full file path for a key.
    fn entry_path(&self, key: &[u8]) -> PathBuf {
        let hex = hex_encode(key);
        self.base_dir.join(&hex[0..2]).join(&hex[2..4]).join(&hex)
    }
}

#[async_trait::async_trait]
impl KvBackend for FileBackend {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>, BackendError> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::Io(e)),
        }
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), BackendError> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Atomic write: temp file in the same directory, then rename.
        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &value).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(path = %path.display(), size = value.len(), "stored entry to file");
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<bool, BackendError> {
        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BackendError::Io(e)),
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(s, "{byte:02x}").expect("writing to a String cannot fail");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_backend() -> (FileBackend, TempDir) {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();
        (backend, dir)
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (backend, _dir) = make_backend();
        let value = Bytes::from_static(b"hello file entry");

        backend.put(&[0xAB; 16], value.clone()).await.unwrap();
        assert_eq!(backend.get(&[0xAB; 16]).await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let (backend, _dir) = make_backend();
        assert_eq!(backend.get(&[0x01; 16]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let (backend, _dir) = make_backend();
        backend
            .put(&[0xCD; 16], Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert!(backend.delete(&[0xCD; 16]).await.unwrap());
        assert!(!backend.delete(&[0xCD; 16]).await.unwrap());
        assert_eq!(backend.get(&[0xCD; 16]).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite() {
        let (backend, _dir) = make_backend();
        backend
            .put(&[0x11; 16], Bytes::from_static(b"v1"))
            .await
            .unwrap();
        backend
            .put(&[0x11; 16], Bytes::from_static(b"v2"))
            .await
            .unwrap();
        assert_eq!(
            backend.get(&[0x11; 16]).await.unwrap(),
            Some(Bytes::from_static(b"v2"))
        );
    }

    #[tokio::test]
    async fn test_fanout_directory_structure() {
        let (backend, dir) = make_backend();
        let key = [0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        backend
            .put(&key, Bytes::from_static(b"fanout"))
            .await
            .unwrap();

        let expected = dir
            .path()
            .join("de")
            .join("ad")
            .join("deadbeef00000000000000000000000001");
        assert!(
            expected.exists(),
            "entry file should exist at fan-out path: {}",
            expected.display()
        );
    }

    #[tokio::test]
    async fn test_no_tmp_file_left_after_write() {
        let (backend, dir) = make_backend();
        let key = [0x42u8; 16];
        backend
            .put(&key, Bytes::from_static(b"atomic"))
            .await
            .unwrap();

        let hex = hex_encode(&key);
        let tmp = dir
            .path()
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(format!("{hex}.tmp"));
        assert!(!tmp.exists(), "temp file left behind: {}", tmp.display());
    }

    #[tokio::test]
    async fn test_empty_value() {
        let (backend, _dir) = make_backend();
        backend.put(&[0x77; 16], Bytes::new()).await.unwrap();
        assert_eq!(
            backend.get(&[0x77; 16]).await.unwrap(),
            Some(Bytes::new())
        );
    }
}
