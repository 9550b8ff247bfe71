//! Meal Plan Plugin for myrecipes
//!
//! Keeps the recipes the user plans to cook and the shopping list derived
//! from their ingredients, and persists both through a
//! [`KeyValueStore`](myrecipes_store::KeyValueStore).
//!
//! # Lifecycle
//!
//! - Installing the plugin starts with empty collections and schedules the
//!   two startup reads.
//! - Once both reads settle the state is hydrated; from then on every change
//!   writes the whole affected collection, and clears delete its key.
//! - Changes made before hydration are kept and replayed on top of the
//!   loaded data, and nothing is written until then.
//!
//! Storage failures never reach the caller of a mutation. They are logged
//! through `tracing` and emitted as [`MealPlanOutput::StorageFailed`].
//!
//! # Example
//!
//! ```ignore
//! use myrecipes::PluginManagerBuilder;
//! use myrecipes_meal_plan_plugin::{MealPlanPlugin, RecipeCatalog, use_meal_plan};
//! use myrecipes_store::{AppName, FileStore};
//!
//! let mut builder = PluginManagerBuilder::new();
//! builder.install(MealPlanPlugin::new(FileStore::new(&AppName::default())));
//! let (mut plugins, init_task) = builder.build();
//!
//! let recipe = RecipeCatalog::default().search(Some("noodles")).remove(0);
//! let mut meal_plan = use_meal_plan(&mut plugins);
//! let save_task = meal_plan.add_recipe_to_meal_plan(&recipe);
//! assert_eq!(meal_plan.planned_recipes().len(), 1);
//! ```

mod config;
mod context;
mod error;
mod model;
mod persistence;
mod plugin;
mod recipe;
mod state;

pub use config::{MealPlanConfig, StorageKeys};
pub use context::{MealPlan, try_use_meal_plan, use_meal_plan};
pub use error::{ConfigurationError, StorageError};
pub use model::{Collection, PlannedRecipe, ShoppingItem};
pub use persistence::{apply_effect, hydrate};
pub use plugin::{MealPlanInput, MealPlanMessage, MealPlanOutput, MealPlanPlugin};
pub use recipe::{Recipe, RecipeCatalog, RecipeId};
pub use state::{Hydration, Loaded, MealPlanState, Snapshot, StorageEffect};
