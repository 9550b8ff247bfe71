//! Async side of the meal plan: the startup reads and the storage effects

use std::sync::Arc;

use iced::futures::future::join;
use myrecipes_store::{KeyValueStore, StoreError, delete_value, read_value, write_value};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::StorageKeys;
use crate::error::StorageError;
use crate::model::Collection;
use crate::state::{Hydration, Loaded, Snapshot, StorageEffect};

/// Read both collections concurrently. Never fails: problems are carried
/// in the returned [`Hydration`] for the state to log and skip.
pub async fn hydrate(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Hydration {
    let (planned_recipes, shopping_items) = join(
        load_collection(store.as_ref(), Collection::MealPlan, &keys.meal_plan),
        load_collection(store.as_ref(), Collection::ShoppingList, &keys.shopping_items),
    )
    .await;

    Hydration {
        planned_recipes,
        shopping_items,
    }
}

async fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    collection: Collection,
    key: &str,
) -> Loaded<T> {
    read_value::<Vec<T>, _>(store, key).await.map_err(|source| {
        let key = key.to_string();
        Arc::new(match source {
            source @ (StoreError::Deserialize { .. } | StoreError::CorruptGroup { .. }) => {
                StorageError::Malformed {
                    collection,
                    key,
                    source,
                }
            }
            source => StorageError::Read {
                collection,
                key,
                source,
            },
        })
    })
}

/// Carry out one storage effect.
///
/// Failures are logged here and handed back so the plugin can report them;
/// nothing is retried.
pub async fn apply_effect(
    store: Arc<dyn KeyValueStore>,
    effect: StorageEffect,
) -> Result<Collection, Arc<StorageError>> {
    let collection = effect.collection();

    let outcome = match effect {
        StorageEffect::Save { key, snapshot } => {
            let count = snapshot.len();
            let written = match &snapshot {
                Snapshot::MealPlan(items) => write_value(store.as_ref(), &key, items).await,
                Snapshot::ShoppingList(items) => write_value(store.as_ref(), &key, items).await,
            };
            match written {
                Ok(()) => {
                    debug!(%collection, %key, count, "saved to storage");
                    Ok(collection)
                }
                Err(source) => Err(StorageError::Write {
                    collection,
                    key,
                    source,
                }),
            }
        }
        StorageEffect::Delete { key, .. } => match delete_value(store.as_ref(), &key).await {
            Ok(removed) => {
                debug!(%collection, %key, removed, "deleted from storage");
                Ok(collection)
            }
            Err(source) => Err(StorageError::Delete {
                collection,
                key,
                source,
            }),
        },
    };

    outcome.map_err(|error| {
        warn!(%collection, error = %error, cause = %source_of(&error), "storage write failed");
        Arc::new(error)
    })
}

fn source_of(error: &StorageError) -> String {
    std::error::Error::source(error)
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlannedRecipe;
    use crate::recipe::Recipe;
    use myrecipes_store::{FileStore, MemoryStore};

    fn shared(store: &MemoryStore) -> Arc<dyn KeyValueStore> {
        Arc::new(store.clone())
    }

    #[tokio::test]
    async fn non_array_data_is_malformed() {
        let keys = StorageKeys::default();
        let store = MemoryStore::with_values([
            (keys.meal_plan.clone(), r#"{"id": 1}"#.to_string()),
            (keys.shopping_items.clone(), "not json".to_string()),
        ]);

        let hydration = hydrate(shared(&store), keys).await;

        let plan_error = hydration.planned_recipes.unwrap_err();
        assert!(matches!(*plan_error, StorageError::Malformed { .. }));
        let shopping_error = hydration.shopping_items.unwrap_err();
        assert!(matches!(*shopping_error, StorageError::Malformed { .. }));
    }

    #[tokio::test]
    async fn corrupt_group_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let group_dir = dir.path().join("myrecipes");
        std::fs::create_dir_all(&group_dir).unwrap();
        std::fs::write(group_dir.join("v2.json"), "{ not json").unwrap();

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::at(dir.path()));
        let hydration = hydrate(store, StorageKeys::default()).await;

        let error = hydration.shopping_items.unwrap_err();
        assert!(matches!(*error, StorageError::Malformed { .. }));
        assert_eq!(error.collection(), Collection::ShoppingList);
    }

    #[tokio::test]
    async fn unavailable_store_is_a_read_error() {
        let store = MemoryStore::new();
        store.set_failing(true);

        let hydration = hydrate(shared(&store), StorageKeys::default()).await;
        let error = hydration.planned_recipes.unwrap_err();
        assert!(matches!(*error, StorageError::Read { .. }));
        assert_eq!(error.collection(), Collection::MealPlan);
    }

    #[tokio::test]
    async fn save_and_delete_reach_the_store() {
        let store = MemoryStore::new();
        let keys = StorageKeys::default();
        let planned = vec![PlannedRecipe::from_recipe(&Recipe::new(1, "Noodles"))];

        let saved = apply_effect(
            shared(&store),
            StorageEffect::Save {
                key: keys.meal_plan.clone(),
                snapshot: Snapshot::MealPlan(planned.clone()),
            },
        )
        .await;
        assert_eq!(saved.unwrap(), Collection::MealPlan);

        let raw = store.raw(&keys.meal_plan).unwrap();
        let decoded: Vec<PlannedRecipe> = serde_json::from_str(&raw).unwrap();
        assert_eq!(decoded, planned);

        let deleted = apply_effect(
            shared(&store),
            StorageEffect::Delete {
                collection: Collection::MealPlan,
                key: keys.meal_plan.clone(),
            },
        )
        .await;
        assert!(deleted.is_ok());
        assert!(!store.contains_key(&keys.meal_plan));
    }

    #[tokio::test]
    async fn write_failures_are_returned_not_raised() {
        let store = MemoryStore::new();
        store.set_failing(true);

        let result = apply_effect(
            shared(&store),
            StorageEffect::Delete {
                collection: Collection::ShoppingList,
                key: StorageKeys::default().shopping_items,
            },
        )
        .await;

        let error = result.unwrap_err();
        assert!(matches!(*error, StorageError::Delete { .. }));
        assert_eq!(error.collection(), Collection::ShoppingList);
    }
}
