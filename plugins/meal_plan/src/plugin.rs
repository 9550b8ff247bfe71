//! The meal plan as an installable plugin

use std::sync::Arc;

use iced::{Subscription, Task};
use myrecipes::Plugin;
use myrecipes_store::KeyValueStore;

use crate::config::MealPlanConfig;
use crate::error::StorageError;
use crate::model::Collection;
use crate::persistence::{apply_effect, hydrate};
use crate::recipe::Recipe;
use crate::state::{Hydration, MealPlanState, StorageEffect};

/// Commands application code sends to the meal plan
#[derive(Clone, Debug)]
pub enum MealPlanInput {
    AddRecipe(Recipe),
    AddIngredients(Recipe),
    ClearMealPlan,
    ClearShoppingList,
}

impl From<MealPlanInput> for MealPlanMessage {
    fn from(input: MealPlanInput) -> Self {
        match input {
            MealPlanInput::AddRecipe(recipe) => MealPlanMessage::AddRecipe(recipe),
            MealPlanInput::AddIngredients(recipe) => MealPlanMessage::AddIngredients(recipe),
            MealPlanInput::ClearMealPlan => MealPlanMessage::ClearMealPlan,
            MealPlanInput::ClearShoppingList => MealPlanMessage::ClearShoppingList,
        }
    }
}

/// Internal messages of the meal plan plugin.
///
/// Applications should send [`MealPlanInput`] instead.
#[derive(Clone, Debug)]
pub enum MealPlanMessage {
    AddRecipe(Recipe),
    AddIngredients(Recipe),
    ClearMealPlan,
    ClearShoppingList,
    /// Both startup reads settled
    Hydrated(Hydration),
    /// A storage effect finished
    Persisted(Result<Collection, Arc<StorageError>>),
}

/// Events the meal plan emits to listeners
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum MealPlanOutput {
    /// Saved data has been loaded; counts are after replaying early changes
    Hydrated {
        planned_recipes: usize,
        shopping_items: usize,
    },
    /// A collection changed in memory
    Changed(Collection),
    /// A save or delete failed. The in-memory state is unaffected.
    StorageFailed(Arc<StorageError>),
}

/// Plugin keeping the meal plan and the shopping list, persisted in a
/// [`KeyValueStore`]
///
/// # Example
///
/// ```ignore
/// use myrecipes::PluginManagerBuilder;
/// use myrecipes_meal_plan_plugin::MealPlanPlugin;
/// use myrecipes_store::{AppName, FileStore};
///
/// let mut builder = PluginManagerBuilder::new();
/// let store = FileStore::new(&AppName::new("com", "example", "myrecipes"));
/// let meal_plan = builder.install(MealPlanPlugin::new(store));
/// let (plugins, init_task) = builder.build();
/// ```
#[derive(Clone)]
pub struct MealPlanPlugin {
    store: Arc<dyn KeyValueStore>,
    config: MealPlanConfig,
}

impl std::fmt::Debug for MealPlanPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealPlanPlugin")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MealPlanPlugin {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_shared_store(Arc::new(store))
    }

    pub fn with_shared_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            config: MealPlanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MealPlanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MealPlanConfig {
        &self.config
    }

    fn run(&self, effects: Vec<StorageEffect>) -> Task<MealPlanMessage> {
        Task::batch(effects.into_iter().map(|effect| {
            Task::perform(
                apply_effect(Arc::clone(&self.store), effect),
                MealPlanMessage::Persisted,
            )
        }))
    }

    fn mutate(
        &self,
        state: &mut MealPlanState,
        collection: Collection,
        op: impl FnOnce(&mut MealPlanState) -> Vec<StorageEffect>,
    ) -> (Task<MealPlanMessage>, Option<MealPlanOutput>) {
        let (effects, output) = change(state, collection, op);
        (self.run(effects), output)
    }
}

/// Apply `op` and work out whether listeners should hear about it.
///
/// Before hydration a change produces no effects but is still reported.
fn change(
    state: &mut MealPlanState,
    collection: Collection,
    op: impl FnOnce(&mut MealPlanState) -> Vec<StorageEffect>,
) -> (Vec<StorageEffect>, Option<MealPlanOutput>) {
    let before = state.len(collection);
    let effects = op(state);
    let changed = before != state.len(collection) || !effects.is_empty();
    (effects, changed.then_some(MealPlanOutput::Changed(collection)))
}

impl Plugin for MealPlanPlugin {
    type Input = MealPlanInput;
    type Message = MealPlanMessage;
    type State = MealPlanState;
    type Output = MealPlanOutput;

    fn name(&self) -> &'static str {
        "meal_plan"
    }

    fn init(&self) -> (Self::State, Task<Self::Message>) {
        let keys = self.config.keys();
        let state = MealPlanState::new(keys.clone());
        let task = Task::perform(
            hydrate(Arc::clone(&self.store), keys),
            MealPlanMessage::Hydrated,
        );
        (state, task)
    }

    fn update(
        &self,
        state: &mut Self::State,
        message: Self::Message,
    ) -> (Task<Self::Message>, Option<Self::Output>) {
        match message {
            MealPlanMessage::AddRecipe(recipe) => {
                self.mutate(state, Collection::MealPlan, |s| s.add_recipe_to_meal_plan(&recipe))
            }
            MealPlanMessage::AddIngredients(recipe) => {
                self.mutate(state, Collection::ShoppingList, |s| {
                    s.add_ingredients_to_shopping_list(&recipe)
                })
            }
            MealPlanMessage::ClearMealPlan => {
                self.mutate(state, Collection::MealPlan, MealPlanState::clear_meal_plan)
            }
            MealPlanMessage::ClearShoppingList => {
                self.mutate(state, Collection::ShoppingList, MealPlanState::clear_shopping_list)
            }
            MealPlanMessage::Hydrated(hydration) => {
                let Some(effects) = state.finish_hydration(hydration) else {
                    return (Task::none(), None);
                };
                let output = MealPlanOutput::Hydrated {
                    planned_recipes: state.planned_recipes().len(),
                    shopping_items: state.shopping_items().len(),
                };
                (self.run(effects), Some(output))
            }
            MealPlanMessage::Persisted(Ok(_)) => (Task::none(), None),
            MealPlanMessage::Persisted(Err(error)) => {
                (Task::none(), Some(MealPlanOutput::StorageFailed(error)))
            }
        }
    }

    fn subscription(&self, _state: &Self::State) -> Subscription<Self::Message> {
        Subscription::none()
    }
}
