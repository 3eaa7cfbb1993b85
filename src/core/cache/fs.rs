//! Filesystem helpers for the disk tier.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// Read a file, mapping "not found" to `None`.
pub async fn read_if_exists(path: &Path) -> io::Result<Option<Bytes>> {
    match fs::read(path).await {
        Ok(data) => Ok(Some(Bytes::from(data))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write `data` to `path` so readers only ever see the complete file.
///
/// The payload goes to a uniquely named temp file in the same directory and
/// is then renamed into place. If the rename is refused because the
/// destination exists (Windows, or a file left behind by an earlier run), the
/// destination is removed and the rename retried once.
pub async fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }

    let tmp = temp_path(path);
    let result = match fs::write(&tmp, data).await {
        Ok(()) => rename_replacing(&tmp, path).await,
        Err(e) => Err(e),
    };

    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

async fn rename_replacing(tmp: &Path, path: &Path) -> io::Result<()> {
    match fs::rename(tmp, path).await {
        Ok(()) => Ok(()),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
            ) =>
        {
            warn!(
                "Rename onto {:?} refused ({}), replacing existing file",
                path, e
            );
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            fs::rename(tmp, path).await
        }
        Err(e) => Err(e),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        "{file_name}.tmp-{}-{}",
        std::process::id(),
        Uuid::new_v4().simple()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_if_exists(&dir.path().join("nope.bin")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("entry.bin");
        write_atomic(&path, b"payload").await.unwrap();
        let read = read_if_exists(&path).await.unwrap().unwrap();
        assert_eq!(&read[..], b"payload");
    }

    #[tokio::test]
    async fn test_write_replaces_existing_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.bin");
        std::fs::write(&path, b"stale").unwrap();
        write_atomic(&path, b"fresh").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.bin");
        write_atomic(&path, b"payload").await.unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("entry.bin")]);
    }

    #[tokio::test]
    async fn test_write_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let result = write_atomic(&blocker.join("entry.bin"), b"payload").await;
        assert!(result.is_err());
    }
}
