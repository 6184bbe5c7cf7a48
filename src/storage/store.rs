use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::namespace::Namespace;
use super::paths::resolve_name;

/// Per-file upload ceiling: 100 MiB.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Directory where in-flight uploads are staged before being renamed into a
/// namespace root. Keeping it under the same data dir keeps the final rename
/// on one filesystem.
const STAGING_DIR: &str = "uploads";

/// A directory entry in a namespace root.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_directory: bool,
}

/// Filesystem-backed store for the two namespaces.
///
/// Holds no state beyond the data dir path; every operation re-queries the
/// filesystem, which is the sole source of truth. Concurrent writes to the
/// same (namespace, name) race at the filesystem level and the last write
/// wins; that is an accepted limitation of the design, not something this
/// type guards against.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn root(&self, namespace: Namespace) -> PathBuf {
        self.data_dir.join(namespace.dir_name())
    }

    fn staging_dir(&self) -> PathBuf {
        self.data_dir.join(STAGING_DIR)
    }

    /// Idempotent creation of the staging dir and both namespace roots.
    pub async fn ensure_roots(&self) -> Result<()> {
        for dir in [
            self.staging_dir(),
            self.root(Namespace::Client),
            self.root(Namespace::Server),
        ] {
            fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Safe absolute path for a user-supplied name, or `UnsafeName`.
    pub fn resolve(&self, namespace: Namespace, raw_name: &str) -> Result<PathBuf> {
        resolve_name(&self.root(namespace), raw_name)
    }

    /// Immediate children of the namespace root. Iteration order is whatever
    /// the directory yields; callers must not depend on it.
    pub async fn list(&self, namespace: Namespace) -> Result<Vec<StoredFile>> {
        let mut entries = fs::read_dir(self.root(namespace)).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            let modified = metadata.modified().map(DateTime::<Utc>::from)?;
            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified,
                is_directory: metadata.is_dir(),
            });
        }

        Ok(files)
    }

    /// Deletes the named file. `NotFound` if it does not exist.
    pub async fn remove(&self, namespace: Namespace, name: &str) -> Result<()> {
        let path = self.resolve(namespace, name)?;
        fs::remove_file(&path).await.map_err(Error::from_io)
    }

    /// Creates or fully replaces the named file. The content lands in the
    /// staging dir first and is renamed into place, so readers never observe
    /// a half-written file.
    pub async fn write(&self, namespace: Namespace, name: &str, bytes: &[u8]) -> Result<()> {
        let dest = self.resolve(namespace, name)?;
        let temp = self.staging_dir().join(Uuid::new_v4().to_string());

        let mut file = File::create(&temp).await?;
        if let Err(e) = write_and_sync(&mut file, bytes).await {
            drop(file);
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        drop(file);

        fs::rename(&temp, &dest).await?;
        Ok(())
    }

    /// Opens the file for sequential streaming and reports its length.
    /// The handle is the only resource held; dropping it on any exit path
    /// releases the file.
    pub async fn open_for_read(&self, namespace: Namespace, name: &str) -> Result<(File, u64)> {
        let path = self.resolve(namespace, name)?;
        let file = File::open(&path).await.map_err(Error::from_io)?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Reads the whole file into memory. Only the view-as-text path wants
    /// this; every other read streams.
    pub async fn read_to_vec(&self, namespace: Namespace, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(namespace, name)?;
        fs::read(&path).await.map_err(Error::from_io)
    }

    /// Opens a fresh staging file for a streamed upload.
    pub async fn begin_staged(&self) -> Result<StagedUpload> {
        let path = self.staging_dir().join(Uuid::new_v4().to_string());
        let file = File::create(&path).await?;
        Ok(StagedUpload {
            path,
            file,
            written: 0,
        })
    }

    /// Moves a completed staged upload under its final name, overwriting any
    /// existing file of that name (last write wins).
    pub async fn commit_staged(
        &self,
        staged: StagedUpload,
        namespace: Namespace,
        name: &str,
    ) -> Result<u64> {
        let dest = match self.resolve(namespace, name) {
            Ok(dest) => dest,
            Err(e) => {
                staged.discard().await;
                return Err(e);
            }
        };

        let StagedUpload {
            path,
            mut file,
            written,
        } = staged;

        if let Err(e) = file.sync_all().await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }
        drop(file);

        if let Err(e) = fs::rename(&path, &dest).await {
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }
        Ok(written)
    }
}

async fn write_and_sync(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// An in-flight upload living in the staging dir. Nothing is visible under a
/// namespace root until [`FileStore::commit_staged`] renames it into place.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    file: File,
    written: u64,
}

impl StagedUpload {
    /// Appends a chunk, enforcing the per-file ceiling. On `SizeExceeded`
    /// the caller must [`discard`](Self::discard) the upload.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        if self.written + chunk.len() as u64 > MAX_FILE_SIZE {
            return Err(Error::SizeExceeded);
        }
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.written
    }

    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.path
    }

    /// Drops the staged bytes. Best-effort; a failed unlink only leaks a
    /// temp file in the staging dir, never a partial file in a namespace.
    pub async fn discard(self) {
        let StagedUpload { path, file, .. } = self;
        drop(file);
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!("failed to remove staged upload {}: {e}", path.display());
        }
    }
}
