use std::env;

use crate::model::Collection;

/// Storage settings of the meal plan.
///
/// Keys have the form `<namespace>/v<schema_version>/<collection>`. Bumping
/// the schema version makes the app start from empty collections instead of
/// reading data written in an older format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MealPlanConfig {
    pub namespace: String,
    pub schema_version: u32,
}

impl MealPlanConfig {
    pub const DEFAULT_NAMESPACE: &str = "@myrecipes";

    /// v1 stored numeric timestamp ids; v2 stores UUIDs.
    pub const SCHEMA_VERSION: u32 = 2;

    /// Environment variable overriding the namespace
    pub const NAMESPACE_ENV: &str = "MYRECIPES_STORAGE_NAMESPACE";

    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            schema_version: Self::SCHEMA_VERSION,
        }
    }

    /// Default config, with the namespace taken from
    /// `MYRECIPES_STORAGE_NAMESPACE` when it is set and not blank.
    pub fn from_env() -> Self {
        match env::var(Self::NAMESPACE_ENV) {
            Ok(namespace) if !namespace.trim().is_empty() => Self::new(namespace.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_schema_version(mut self, schema_version: u32) -> Self {
        self.schema_version = schema_version;
        self
    }

    pub fn keys(&self) -> StorageKeys {
        let prefix = format!(
            "{}/v{}",
            self.namespace.trim_end_matches('/'),
            self.schema_version
        );
        StorageKeys {
            meal_plan: format!("{prefix}/mealPlan"),
            shopping_items: format!("{prefix}/shoppingItems"),
        }
    }
}

impl Default for MealPlanConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMESPACE)
    }
}

/// The store key of each collection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub meal_plan: String,
    pub shopping_items: String,
}

impl StorageKeys {
    pub fn key(&self, collection: Collection) -> &str {
        match collection {
            Collection::MealPlan => &self.meal_plan,
            Collection::ShoppingList => &self.shopping_items,
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        MealPlanConfig::default().keys()
    }
}
