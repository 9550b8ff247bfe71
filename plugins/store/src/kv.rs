use async_trait::async_trait;

use crate::error::Result;

/// Async string-keyed storage of JSON text.
///
/// Implementations are shared as `Arc<dyn KeyValueStore>` and called from
/// background tasks, so every method takes `&self`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// The raw JSON stored under `key`, or `None` if nothing is stored
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Returns whether something was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn KeyValueStore) {}
};
