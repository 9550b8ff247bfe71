//! Single entry point for screens that read or change the meal plan

use iced::Task;
use myrecipes::{PluginHandle, PluginManager, PluginMessage};

use crate::error::ConfigurationError;
use crate::model::{PlannedRecipe, ShoppingItem};
use crate::plugin::{MealPlanInput, MealPlanPlugin};
use crate::recipe::Recipe;
use crate::state::MealPlanState;

/// The installed meal plan, borrowed from its [`PluginManager`].
///
/// Reads see the live state. Mutations are applied before they return; the
/// returned task performs the storage work and has to be passed back to the
/// iced runtime.
pub struct MealPlan<'a> {
    manager: &'a mut PluginManager,
    handle: PluginHandle<MealPlanPlugin>,
}

/// Access the meal plan installed in `manager`.
///
/// # Panics
///
/// Panics with [`ConfigurationError::OutsideProviderScope`] when no
/// [`MealPlanPlugin`] has been installed.
///
/// # Example
///
/// ```ignore
/// Message::AddToPlan(recipe) => {
///     return use_meal_plan(&mut self.plugins)
///         .add_recipe_to_meal_plan(&recipe)
///         .map(Message::Plugin);
/// }
/// ```
pub fn use_meal_plan(manager: &mut PluginManager) -> MealPlan<'_> {
    match try_use_meal_plan(manager) {
        Ok(meal_plan) => meal_plan,
        Err(error) => panic!("{error}"),
    }
}

/// Like [`use_meal_plan`], but returns the error instead of panicking
pub fn try_use_meal_plan(
    manager: &mut PluginManager,
) -> Result<MealPlan<'_>, ConfigurationError> {
    let handle = manager
        .handle::<MealPlanPlugin>()
        .ok_or(ConfigurationError::OutsideProviderScope)?;
    Ok(MealPlan { manager, handle })
}

impl MealPlan<'_> {
    pub fn planned_recipes(&self) -> &[PlannedRecipe] {
        self.state().planned_recipes()
    }

    pub fn shopping_items(&self) -> &[ShoppingItem] {
        self.state().shopping_items()
    }

    pub fn shopping_items_by_recipe(&self) -> Vec<&ShoppingItem> {
        self.state().shopping_items_by_recipe()
    }

    pub fn is_hydrated(&self) -> bool {
        self.state().is_hydrated()
    }

    pub fn handle(&self) -> &PluginHandle<MealPlanPlugin> {
        &self.handle
    }

    pub fn add_recipe_to_meal_plan(&mut self, recipe: &Recipe) -> Task<PluginMessage> {
        self.apply(MealPlanInput::AddRecipe(recipe.clone()))
    }

    pub fn add_ingredients_to_shopping_list(&mut self, recipe: &Recipe) -> Task<PluginMessage> {
        self.apply(MealPlanInput::AddIngredients(recipe.clone()))
    }

    pub fn clear_meal_plan(&mut self) -> Task<PluginMessage> {
        self.apply(MealPlanInput::ClearMealPlan)
    }

    pub fn clear_shopping_list(&mut self) -> Task<PluginMessage> {
        self.apply(MealPlanInput::ClearShoppingList)
    }

    fn apply(&mut self, input: MealPlanInput) -> Task<PluginMessage> {
        self.handle.apply(self.manager, input)
    }

    // The plugin cannot be uninstalled, so the lookup done in
    // `try_use_meal_plan` stays valid for the lifetime of this borrow.
    fn state(&self) -> &MealPlanState {
        match self.manager.get_plugin_state::<MealPlanPlugin>() {
            Some(state) => state,
            None => panic!("{}", ConfigurationError::OutsideProviderScope),
        }
    }
}
