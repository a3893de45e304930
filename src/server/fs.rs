use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::fs;

/// What a directory entry is, as far as the protocol cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Storage behind a server. Sessions reach the disk only through this
/// seam, so an in-memory implementation can stand in for tests.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Entry names directly under `path`, partitioned into
    /// (subdirectories, files), each sorted.
    async fn list_dir(&self, path: &Path) -> io::Result<(Vec<String>, Vec<String>)>;

    /// Create a single directory level.
    async fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    async fn remove_dir(&self, path: &Path) -> io::Result<()>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    async fn write_file(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Resolve `path` to an absolute form with `.` and `..` folded away.
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    async fn kind_of(&self, path: &Path) -> io::Result<EntryKind>;
}

/// The real filesystem; a thin pass-through to `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl Filesystem for LocalFs {
    async fn list_dir(&self, path: &Path) -> io::Result<(Vec<String>, Vec<String>)> {
        let mut entries = fs::read_dir(path).await?;
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();

            // follows symlinks, so a link to a directory lists as one
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => dirs.push(name),
                _ => files.push(name),
            }
        }

        dirs.sort();
        files.sort();

        Ok((dirs, files))
    }

    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path).await
    }

    async fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        fs::write(path, content).await
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path).await
    }

    async fn kind_of(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = fs::metadata(path).await?;

        Ok(if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        })
    }
}
