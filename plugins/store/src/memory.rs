use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;

#[derive(Debug, Default)]
struct Inner {
    values: Mutex<HashMap<String, String>>,
    read_delay: Mutex<Option<Duration>>,
    failing: AtomicBool,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

/// In-memory [`KeyValueStore`]
///
/// Clones share the same data, so a clone kept aside can inspect what a
/// plugin wrote, or stand in for the same device storage across a simulated
/// restart. Reads can be slowed down and all operations can be made to fail.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with raw JSON values
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut map) = store.inner.values.lock() {
            map.extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        store
    }

    /// Delay every `get` by `delay`
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        if let Ok(mut slot) = self.inner.read_delay.lock() {
            *slot = delay;
        }
    }

    /// Make every operation fail with [`StoreError::Unavailable`]
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw JSON currently stored under `key`
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner
            .values
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Number of successful `set` calls so far
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of successful `delete` calls so far
    pub fn delete_count(&self) -> usize {
        self.inner.deletes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.inner
            .values
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let delay = self.inner.read_delay.lock().ok().and_then(|slot| *slot);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_available()?;
        Ok(self.values()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check_available()?;
        self.values()?.insert(key.to_string(), value);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        let removed = self.values()?.remove(key).is_some();
        self.inner.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_data() {
        let store = MemoryStore::new();
        let observer = store.clone();

        store.set("k", "[1]".into()).await.unwrap();
        assert_eq!(observer.raw("k").as_deref(), Some("[1]"));
        assert_eq!(observer.write_count(), 1);

        assert!(store.delete("k").await.unwrap());
        assert!(!observer.contains_key("k"));
        assert!(!store.delete("k").await.unwrap());
        assert_eq!(observer.delete_count(), 2);
    }

    #[tokio::test]
    async fn failing_store_rejects_everything() {
        let store = MemoryStore::with_values([("k", "true")]);
        store.set_failing(true);

        assert!(matches!(store.get("k").await, Err(StoreError::Unavailable(_))));
        assert!(store.set("k", "false".into()).await.is_err());
        assert!(store.delete("k").await.is_err());
        assert_eq!(store.write_count(), 0);

        store.set_failing(false);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("true"));
    }
}
