use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::app_name::AppName;
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::storage::{load_group, locate, modify_group, storage_dir};

/// [`KeyValueStore`] persisted as JSON group files
///
/// Several keys can share a group file, so every read-modify-write cycle
/// holds the store's lock. Clones share the lock.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Store in the platform config directory of `app_name`
    pub fn new(app_name: &AppName) -> Self {
        Self::at(storage_dir(app_name))
    }

    /// Store rooted at an explicit directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let (path, entry) = locate(&self.root, key)?;
        let _guard = self.lock.lock().await;
        let mut group = load_group(&path).await?;
        Ok(group.remove(&entry))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let (path, entry) = locate(&self.root, key)?;
        let _guard = self.lock.lock().await;
        modify_group(&path, |group| {
            group.insert(entry, value);
            true
        })
        .await?;
        debug!(%key, path = %path.display(), "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let (path, entry) = locate(&self.root, key)?;
        let _guard = self.lock.lock().await;
        let removed = modify_group(&path, |group| group.remove(&entry).is_some()).await?;
        debug!(%key, removed, "deleted value");
        Ok(removed)
    }
}
