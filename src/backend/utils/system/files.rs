//! File system utilities for common operations.

use log::info;
use std::io;
use std::path::Path;
use tokio::fs;

/// True if `path` exists and is a regular file. Directories and missing
/// paths are both `false`.
pub async fn is_regular_file<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Ensures a directory exists, creating it and all parent directories if necessary.
pub async fn ensure_directory<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path = path.as_ref();
    if !fs::try_exists(path).await.unwrap_or(false) {
        info!("Creating directory {}", path.display());
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Ensures the parent directory of a file exists.
pub async fn ensure_parent_directory<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    match file_path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent).await,
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a").join("b").join("c.zip");

        ensure_parent_directory(&file).await.unwrap();

        assert!(tmp.path().join("a").join("b").is_dir());
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn directories_are_not_regular_files() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("scan.ply");

        assert!(!is_regular_file(tmp.path()).await);
        assert!(!is_regular_file(&file).await);

        fs::write(&file, b"ply").await.unwrap();
        assert!(is_regular_file(&file).await);
    }

    #[tokio::test]
    async fn bare_file_name_needs_no_directory() {
        ensure_parent_directory("scan.zip").await.unwrap();
    }
}
