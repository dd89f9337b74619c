use chrono::{DateTime, Utc};
use futures_util::{pin_mut, Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::error::{BoxError, StoreError};
use super::models::{StorageStats, StoredFile};
use super::naming::{sanitize_file_name, validate_file_name};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Private directory under the root holding uploads that are still receiving.
/// Listing skips it because it is a directory, and sanitized names can never
/// collide with it because they never start with a dot.
pub const STAGING_DIR_NAME: &str = ".staging";

pub const DEFAULT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub root: PathBuf,
    pub max_upload_bytes: Option<u64>,
    /// Unix permission bits given to published files.
    pub file_mode: u32,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            max_upload_bytes: Some(200 * 1024 * 1024),
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl FileStoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes: None,
            file_mode: DEFAULT_FILE_MODE,
        }
    }

    pub fn with_max_upload_bytes(mut self, limit: u64) -> Self {
        self.max_upload_bytes = Some(limit);
        self
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }
}

/// Flat file storage under a single root directory.
///
/// Every call reads the filesystem directly; nothing is cached and no locks
/// are held between calls, so clones can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: FileStoreConfig,
}

impl FileStore {
    pub fn new(config: FileStoreConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    fn staging_dir(&self) -> PathBuf {
        self.config.root.join(STAGING_DIR_NAME)
    }

    /// Creates the root and staging directories if they are missing.
    pub async fn initialize(&self) -> Result<()> {
        async_fs::create_dir_all(self.staging_dir()).await?;
        Ok(())
    }

    /// Regular files directly under the root, oldest modification first.
    pub async fn list(&self) -> Result<Vec<StoredFile>> {
        let mut entries = async_fs::read_dir(&self.config.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Ok(metadata) = async_fs::metadata(entry.path()).await else {
                continue;
            };
            if let Some(file) = StoredFile::from_metadata(name, &metadata) {
                files.push(file);
            }
        }

        // stable: equal timestamps keep scan order
        files.sort_by_key(|file| file.modified_at);

        Ok(files)
    }

    pub async fn metadata(&self, name: &str) -> Result<Option<StoredFile>> {
        validate_file_name(name)?;

        match async_fs::metadata(self.config.root.join(name)).await {
            Ok(metadata) => Ok(StoredFile::from_metadata(name.to_string(), &metadata)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        if self.metadata(name).await?.is_none() {
            return Err(StoreError::NotFound);
        }

        match async_fs::remove_file(self.config.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Streams an upload into the root under a name derived from `name_hint`.
    ///
    /// Bytes go to a staging file first and are renamed onto the final name
    /// only once the stream has ended cleanly, replacing any existing file.
    /// On every other exit, including the returned future being dropped, the
    /// staging file is closed and removed.
    pub async fn ingest_upload<S, B, E>(
        &self,
        name_hint: Option<&str>,
        data: S,
    ) -> Result<StoredFile>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<BoxError>,
    {
        let name = name_hint.and_then(sanitize_file_name);

        self.ensure_staging_dir().await?;
        let staging_dir = self.staging_dir();
        let (staged, handle) = run_blocking(move || {
            let staged = tempfile::Builder::new()
                .prefix("upload-")
                .tempfile_in(&staging_dir)?;
            let handle = staged.as_file().try_clone()?;
            Ok((staged, handle))
        })
        .await?;
        let mut file = async_fs::File::from_std(handle);
        let mut written: u64 = 0;

        pin_mut!(data);
        while let Some(chunk) = data.next().await {
            let chunk = chunk.map_err(StoreError::incomplete)?;
            let bytes = chunk.as_ref();

            written += bytes.len() as u64;
            if let Some(limit) = self.config.max_upload_bytes {
                if written > limit {
                    return Err(StoreError::UploadTooLarge { limit });
                }
            }

            file.write_all(bytes).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if written == 0 && name.is_none() {
            return Err(StoreError::MissingFile);
        }

        let name = name.unwrap_or_else(|| format!("upload-{}", Uuid::new_v4()));
        let target = self.config.root.join(&name);

        let file_mode = self.config.file_mode;
        let publish_to = target.clone();
        run_blocking(move || {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                staged
                    .as_file()
                    .set_permissions(std::fs::Permissions::from_mode(file_mode))?;
            }
            #[cfg(not(unix))]
            let _ = file_mode;

            staged.persist(&publish_to).map(drop).map_err(|e| e.error)
        })
        .await?;

        tracing::debug!(file = %name, size = written, "upload published");

        let metadata = async_fs::metadata(&target).await?;

        Ok(StoredFile {
            name,
            size_bytes: written,
            modified_at: DateTime::<Utc>::from(metadata.modified()?),
        })
    }

    pub async fn stats(&self) -> Result<StorageStats> {
        let files = self.list().await?;

        Ok(StorageStats {
            file_count: files.len() as u64,
            total_size_bytes: files.iter().map(|file| file.size_bytes).sum(),
            root: self.config.root.clone(),
        })
    }

    // Only the staging directory is created here; a missing root stays an error.
    async fn ensure_staging_dir(&self) -> Result<()> {
        match async_fs::create_dir(self.staging_dir()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(outcome?)
}
