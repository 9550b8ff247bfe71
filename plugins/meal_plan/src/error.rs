use myrecipes_store::StoreError;

use crate::model::Collection;

/// Storage failures met by the meal plan. None of them reach the caller of
/// a mutation: reads fall back to empty collections and failed writes are
/// logged and reported on the plugin output.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to load {collection} from `{key}`")]
    Read {
        collection: Collection,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("saved {collection} under `{key}` is malformed")]
    Malformed {
        collection: Collection,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to save {collection} to `{key}`")]
    Write {
        collection: Collection,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to delete {collection} at `{key}`")]
    Delete {
        collection: Collection,
        key: String,
        #[source]
        source: StoreError,
    },
}

impl StorageError {
    pub fn collection(&self) -> Collection {
        match self {
            StorageError::Read { collection, .. }
            | StorageError::Malformed { collection, .. }
            | StorageError::Write { collection, .. }
            | StorageError::Delete { collection, .. } => *collection,
        }
    }
}

/// Misuse of the meal plan accessor. This is a programming error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("use_meal_plan used outside provider scope: no MealPlanPlugin is installed")]
    OutsideProviderScope,
}
