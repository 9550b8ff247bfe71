//! Typed access on top of [`KeyValueStore`]
//!
//! These work with any backend, including `Arc<dyn KeyValueStore>`.

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;
use serde::{Serialize, de::DeserializeOwned};

/// Read and decode the value stored under `key`
///
/// # Returns
///
/// `Ok(None)` when nothing is stored under the key.
///
/// # Errors
///
/// Returns the backend's error if the read fails, or
/// [`StoreError::Deserialize`] if the stored JSON does not decode into `T`.
///
/// # Example
///
/// ```ignore
/// use myrecipes_store::{MemoryStore, read_value};
///
/// let store = MemoryStore::with_values([("@myrecipes/v2/mealPlan", "[]")]);
/// let plan: Option<Vec<String>> = read_value(&store, "@myrecipes/v2/mealPlan").await?;
/// assert_eq!(plan, Some(vec![]));
/// ```
pub async fn read_value<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Deserialize {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] if the value cannot be encoded, or the
/// backend's error if the write fails.
pub async fn write_value<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, json).await
}

/// Remove `key`. Returns `Ok(true)` if a value was removed.
pub async fn delete_value<S>(store: &S, key: &str) -> Result<bool>
where
    S: KeyValueStore + ?Sized,
{
    store.delete(key).await
}
