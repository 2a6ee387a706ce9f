use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info};

pub const PROJECTS_KEY: &str = "projects.json";
pub const ANALYTICS_KEY: &str = "analytics.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which persistence backend serves the endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Object-store adapter: deterministic keys, overwrite in place,
    /// `put` reports a public URL.
    Blob,
    /// Local-file target: snapshots the existing file to a timestamped
    /// backup before each overwrite.
    File,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "file" => Ok(Self::File),
            other => Err(other.to_string()),
        }
    }
}

/// What a successful `put` can report back to the caller.
#[derive(Debug, Clone, Default)]
pub struct PutReceipt {
    pub url: Option<String>,
}

/// Directory-backed adapter over the external object store: one file per key,
/// overwritten wholesale on every write (last-write-wins by construction).
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base: String,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        read_optional(&self.root.join(key)).await
    }

    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<PutReceipt, StoreError> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.root.join(key), bytes).await?;
        Ok(PutReceipt {
            url: Some(format!("{}/{}", self.public_base.trim_end_matches('/'), key)),
        })
    }
}

/// Local-file deployment target. Same contract as `BlobStore`, plus a
/// timestamped backup copy of the previous contents before each overwrite.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        read_optional(&self.root.join(key)).await
    }

    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<PutReceipt, StoreError> {
        fs::create_dir_all(&self.root).await?;

        let path = self.root.join(key);
        if fs::try_exists(&path).await? {
            let stem = key.strip_suffix(".json").unwrap_or(key);
            let stamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
            let backup = self.root.join(format!("{stem}-backup-{stamp}.json"));
            fs::copy(&path, &backup).await?;
            info!("backed up {key} to {}", backup.display());
        }

        fs::write(&path, bytes).await?;
        Ok(PutReceipt::default())
    }
}

/// The configured backend. The variant is picked once at startup from
/// `STORAGE`; handlers never branch on it themselves.
#[derive(Debug, Clone)]
pub enum Store {
    Blob(BlobStore),
    File(FileStore),
}

impl Store {
    pub fn open(kind: StorageKind, root: &Path, public_base: &str) -> Self {
        match kind {
            StorageKind::Blob => Self::Blob(BlobStore::new(root, public_base)),
            StorageKind::File => Self::File(FileStore::new(root)),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self {
            Self::Blob(store) => store.get(key).await,
            Self::File(store) => store.get(key).await,
        }
    }

    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<PutReceipt, StoreError> {
        match self {
            Self::Blob(store) => store.put(key, bytes).await,
            Self::File(store) => store.put(key, bytes).await,
        }
    }

    pub async fn put_json<T: serde::Serialize>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<PutReceipt, StoreError> {
        let payload = serde_json::to_vec_pretty(value)?;
        self.put(key, &payload).await
    }

    /// Fail-open hydration: absence, read failure, and parse failure all
    /// collapse into the default value. Failures are logged and swallowed.
    pub async fn load_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(err) => {
                    error!("failed to parse {key}: {err}");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(err) => {
                error!("failed to read {key}: {err}");
                T::default()
            }
        }
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalyticsDocument;

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("portfolio_store_{label}_{}_{nanos}", std::process::id()));
        path
    }

    #[tokio::test]
    async fn blob_put_then_get_round_trips() {
        let root = scratch_dir("blob");
        let store = BlobStore::new(&root, "/data");

        let receipt = store.put(PROJECTS_KEY, b"[]").await.unwrap();
        assert_eq!(receipt.url.as_deref(), Some("/data/projects.json"));
        assert_eq!(store.get(PROJECTS_KEY).await.unwrap().unwrap(), b"[]");
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = BlobStore::new(scratch_dir("missing"), "/data");
        assert!(store.get(PROJECTS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_backs_up_before_overwrite() {
        let root = scratch_dir("backup");
        let store = FileStore::new(&root);

        store.put(PROJECTS_KEY, b"[1]").await.unwrap();
        store.put(PROJECTS_KEY, b"[2]").await.unwrap();

        assert_eq!(store.get(PROJECTS_KEY).await.unwrap().unwrap(), b"[2]");

        let mut backups = 0;
        for entry in std::fs::read_dir(&root).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            if name.starts_with("projects-backup-") && name.ends_with(".json") {
                backups += 1;
            }
        }
        assert_eq!(backups, 1);
    }

    #[tokio::test]
    async fn first_file_store_write_creates_no_backup() {
        let root = scratch_dir("first");
        let store = FileStore::new(&root);
        store.put(PROJECTS_KEY, b"[]").await.unwrap();

        let count = std::fs::read_dir(&root).unwrap().count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn load_or_default_swallows_garbage() {
        let root = scratch_dir("garbage");
        let store = Store::open(StorageKind::Blob, &root, "/data");

        store.put(ANALYTICS_KEY, b"not json").await.unwrap();
        let doc: AnalyticsDocument = store.load_or_default(ANALYTICS_KEY).await;
        assert_eq!(doc.visitors.total, 0);
    }

    #[tokio::test]
    async fn load_or_default_on_empty_store() {
        let store = Store::open(StorageKind::File, &scratch_dir("empty"), "/data");
        let projects: Vec<serde_json::Value> = store.load_or_default(PROJECTS_KEY).await;
        assert!(projects.is_empty());
    }
}
