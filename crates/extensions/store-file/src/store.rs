//! JSON file backed [`KeyValueStore`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use jobfill_protocols::{KeyValueStore, StoreError};

use crate::error::FileStoreError;

/// Key-value store persisted as one JSON object.
pub struct FileStore {
    path: PathBuf,
    /// Contents of the file as of the last read or write.
    cache: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating its directory if needed. A missing
    /// file is an empty store; it is created on the first `set`.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, FileStoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .await
                    .map_err(|e| FileStoreError::CreateDirFailed {
                        path: dir.to_path_buf(),
                        reason: e.to_string(),
                    })?;
                info!("Created credential storage directory: {:?}", dir);
            }
        }

        let values = Self::read(&path).await?;
        debug!(entries = values.len(), "Opened credential store {:?}", path);

        Ok(Self {
            path,
            cache: RwLock::new(values),
        })
    }

    /// Open the store at the default location (`~/.jobfill/credentials.json`).
    pub async fn default_path() -> Result<Self, FileStoreError> {
        Self::new(Self::default_location()?).await
    }

    pub fn default_location() -> Result<PathBuf, FileStoreError> {
        let home = dirs::home_dir().ok_or(FileStoreError::StoragePathNotSet)?;
        Ok(home.join(".jobfill").join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(path: &Path) -> Result<BTreeMap<String, String>, FileStoreError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| FileStoreError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write `values` to a sibling temp file, then move it over the store
    /// file so readers never see a partial write.
    async fn save(&self, values: &BTreeMap<String, String>) -> Result<(), FileStoreError> {
        let content = serde_json::to_string_pretty(values)
            .map_err(|e| FileStoreError::Serialize(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        // Credentials stay readable by the owner only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }
        fs::rename(&tmp, &self.path).await?;
        debug!("Saved credential store to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn id(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        next.insert(key.to_string(), value.to_string());
        self.save(&next).await?;
        *cache = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
