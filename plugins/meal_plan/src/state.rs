//! The meal plan state and its storage bookkeeping
//!
//! [`MealPlanState`] is plain data: every operation updates the collections
//! in place and answers with the [`StorageEffect`]s the change calls for.
//! Running those effects is the plugin's job (see `persistence`).
//!
//! Until hydration settles no effect is produced. Changes made in that
//! window are journaled and replayed over whatever the store returned, then
//! every collection they touched is saved.

use std::mem;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::StorageKeys;
use crate::error::StorageError;
use crate::model::{Collection, PlannedRecipe, ShoppingItem};
use crate::recipe::Recipe;

/// Result of loading one collection: `Ok(None)` when nothing was stored
pub type Loaded<T> = Result<Option<Vec<T>>, Arc<StorageError>>;

/// What the startup reads produced
#[derive(Clone, Debug)]
pub struct Hydration {
    pub planned_recipes: Loaded<PlannedRecipe>,
    pub shopping_items: Loaded<ShoppingItem>,
}

impl Hydration {
    /// Nothing stored for either collection
    pub fn empty() -> Self {
        Self {
            planned_recipes: Ok(None),
            shopping_items: Ok(None),
        }
    }
}

/// Full copy of one collection, taken when the change happened
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Snapshot {
    MealPlan(Vec<PlannedRecipe>),
    ShoppingList(Vec<ShoppingItem>),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Snapshot::MealPlan(_) => Collection::MealPlan,
            Snapshot::ShoppingList(_) => Collection::ShoppingList,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Snapshot::MealPlan(items) => items.len(),
            Snapshot::ShoppingList(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Storage work requested by a state change
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageEffect {
    /// Overwrite the key with the whole collection
    Save { key: String, snapshot: Snapshot },
    /// Remove the key
    Delete { collection: Collection, key: String },
}

impl StorageEffect {
    pub fn collection(&self) -> Collection {
        match self {
            StorageEffect::Save { snapshot, .. } => snapshot.collection(),
            StorageEffect::Delete { collection, .. } => *collection,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StorageEffect::Save { key, .. } | StorageEffect::Delete { key, .. } => key,
        }
    }
}

#[derive(Clone, Debug)]
enum JournalEntry {
    AddRecipe(PlannedRecipe),
    AddItems(Vec<ShoppingItem>),
    ClearMealPlan,
    ClearShoppingList,
}

/// Planned recipes and shopping items of the running app
#[derive(Debug)]
pub struct MealPlanState {
    keys: StorageKeys,
    planned_recipes: Vec<PlannedRecipe>,
    shopping_items: Vec<ShoppingItem>,
    hydrated: bool,
    journal: Vec<JournalEntry>,
}

impl MealPlanState {
    /// Empty, not yet hydrated state
    pub fn new(keys: StorageKeys) -> Self {
        Self {
            keys,
            planned_recipes: Vec::new(),
            shopping_items: Vec::new(),
            hydrated: false,
            journal: Vec::new(),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Planned recipes in the order they were added
    pub fn planned_recipes(&self) -> &[PlannedRecipe] {
        &self.planned_recipes
    }

    /// Shopping items in the order they were added
    pub fn shopping_items(&self) -> &[ShoppingItem] {
        &self.shopping_items
    }

    /// Shopping items ordered by the title of their recipe. Items of the same
    /// recipe keep their insertion order.
    pub fn shopping_items_by_recipe(&self) -> Vec<&ShoppingItem> {
        let mut items: Vec<&ShoppingItem> = self.shopping_items.iter().collect();
        items.sort_by(|a, b| a.from_recipe_title.cmp(&b.from_recipe_title));
        items
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::MealPlan => self.planned_recipes.len(),
            Collection::ShoppingList => self.shopping_items.len(),
        }
    }

    /// Append `recipe` to the meal plan. Duplicates are allowed.
    pub fn add_recipe_to_meal_plan(&mut self, recipe: &Recipe) -> Vec<StorageEffect> {
        let planned = PlannedRecipe::from_recipe(recipe);
        debug!(recipe_id = recipe.id, id = %planned.id, "adding recipe to meal plan");
        self.planned_recipes.push(planned.clone());

        self.changed(JournalEntry::AddRecipe(planned), Collection::MealPlan)
    }

    /// Append one shopping item per ingredient of `recipe`, in order.
    ///
    /// Recipes without ingredients change nothing and produce no effect.
    pub fn add_ingredients_to_shopping_list(&mut self, recipe: &Recipe) -> Vec<StorageEffect> {
        let Some(ingredients) = recipe.ingredients.as_deref().filter(|i| !i.is_empty()) else {
            debug!(recipe_id = recipe.id, "recipe has no ingredients, nothing to add");
            return Vec::new();
        };

        let items: Vec<ShoppingItem> = ingredients
            .iter()
            .map(|ingredient| ShoppingItem::from_ingredient(recipe, ingredient.as_str()))
            .collect();
        self.shopping_items.extend(items.iter().cloned());
        debug!(
            recipe_id = recipe.id,
            added = items.len(),
            total = self.shopping_items.len(),
            "added ingredients to shopping list"
        );

        self.changed(JournalEntry::AddItems(items), Collection::ShoppingList)
    }

    /// Empty the meal plan and drop its key
    pub fn clear_meal_plan(&mut self) -> Vec<StorageEffect> {
        self.planned_recipes.clear();
        debug!("cleared meal plan");
        self.changed(JournalEntry::ClearMealPlan, Collection::MealPlan)
    }

    /// Empty the shopping list and drop its key
    pub fn clear_shopping_list(&mut self) -> Vec<StorageEffect> {
        self.shopping_items.clear();
        debug!("cleared shopping list");
        self.changed(JournalEntry::ClearShoppingList, Collection::ShoppingList)
    }

    /// Take in the startup reads.
    ///
    /// Loaded collections replace the in-memory ones; failed or missing
    /// reads leave them empty. Journaled changes are then replayed and the
    /// collections they touched are persisted.
    ///
    /// Only the first call counts; later ones change nothing and return
    /// `None`.
    pub fn finish_hydration(&mut self, hydration: Hydration) -> Option<Vec<StorageEffect>> {
        if self.hydrated {
            warn!("meal plan hydration settled twice, ignoring the second result");
            return None;
        }

        self.planned_recipes = settle(
            Collection::MealPlan,
            &self.keys.meal_plan,
            hydration.planned_recipes,
        );
        self.shopping_items = settle(
            Collection::ShoppingList,
            &self.keys.shopping_items,
            hydration.shopping_items,
        );

        let journal = mem::take(&mut self.journal);
        let replayed = journal.len();
        let mut plan_touched = false;
        let mut shopping_touched = false;
        for entry in journal {
            match entry {
                JournalEntry::AddRecipe(planned) => {
                    self.planned_recipes.push(planned);
                    plan_touched = true;
                }
                JournalEntry::AddItems(items) => {
                    self.shopping_items.extend(items);
                    shopping_touched = true;
                }
                JournalEntry::ClearMealPlan => {
                    self.planned_recipes.clear();
                    plan_touched = true;
                }
                JournalEntry::ClearShoppingList => {
                    self.shopping_items.clear();
                    shopping_touched = true;
                }
            }
        }

        self.hydrated = true;
        info!(
            planned_recipes = self.planned_recipes.len(),
            shopping_items = self.shopping_items.len(),
            replayed,
            "meal plan hydrated"
        );

        let mut effects = Vec::new();
        if plan_touched {
            effects.push(self.persist(Collection::MealPlan));
        }
        if shopping_touched {
            effects.push(self.persist(Collection::ShoppingList));
        }
        Some(effects)
    }

    fn changed(&mut self, entry: JournalEntry, collection: Collection) -> Vec<StorageEffect> {
        if !self.hydrated {
            debug!(%collection, "not hydrated yet, deferring storage");
            self.journal.push(entry);
            return Vec::new();
        }
        vec![self.persist(collection)]
    }

    // Empty collections are deleted rather than saved as `[]`.
    fn persist(&self, collection: Collection) -> StorageEffect {
        let key = self.keys.key(collection).to_string();
        if self.len(collection) == 0 {
            return StorageEffect::Delete { collection, key };
        }

        let snapshot = match collection {
            Collection::MealPlan => Snapshot::MealPlan(self.planned_recipes.clone()),
            Collection::ShoppingList => Snapshot::ShoppingList(self.shopping_items.clone()),
        };
        StorageEffect::Save { key, snapshot }
    }
}

fn settle<T>(collection: Collection, key: &str, loaded: Loaded<T>) -> Vec<T> {
    match loaded {
        Ok(Some(items)) => {
            debug!(%collection, %key, count = items.len(), "loaded from storage");
            items
        }
        Ok(None) => {
            debug!(%collection, %key, "nothing saved");
            Vec::new()
        }
        Err(error) => {
            warn!(%collection, %key, error = %error, "ignoring saved data");
            Vec::new()
        }
    }
}
