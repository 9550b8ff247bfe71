use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipe::{Recipe, RecipeId};

/// A recipe the user plans to cook.
///
/// `title` is copied from the recipe when it is planned and does not follow
/// later changes to the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedRecipe {
    pub id: Uuid,
    pub recipe_id: RecipeId,
    pub title: String,
}

impl PlannedRecipe {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: next_id(),
            recipe_id: recipe.id,
            title: recipe.title.clone(),
        }
    }
}

/// One ingredient line on the shopping list, with the recipe it came from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: Uuid,
    pub name: String,
    pub from_recipe_id: RecipeId,
    pub from_recipe_title: String,
}

impl ShoppingItem {
    pub fn from_ingredient(recipe: &Recipe, ingredient: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            name: ingredient.into(),
            from_recipe_id: recipe.id,
            from_recipe_title: recipe.title.clone(),
        }
    }
}

/// The two persisted collections
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    MealPlan,
    ShoppingList,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::MealPlan => f.write_str("meal plan"),
            Collection::ShoppingList => f.write_str("shopping list"),
        }
    }
}

// v7 ids sort by creation time and stay unique within a millisecond.
fn next_id() -> Uuid {
    Uuid::now_v7()
}
