//! Recipes and the built-in recipe catalog

use serde::{Deserialize, Serialize};

pub type RecipeId = u64;

/// A recipe as served by the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Recipe {
    pub fn new(id: RecipeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            prep_time_minutes: None,
            cook_time_minutes: None,
            ingredients: None,
            steps: None,
            notes: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_times(mut self, prep_minutes: u32, cook_minutes: u32) -> Self {
        self.prep_time_minutes = Some(prep_minutes);
        self.cook_time_minutes = Some(cook_minutes);
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = Some(ingredients.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = Some(steps.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Prep plus cook time, when both are known
    pub fn total_time_minutes(&self) -> Option<u32> {
        Some(self.prep_time_minutes? + self.cook_time_minutes?)
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(needle)
    }
}

/// Read-only source of recipes
#[derive(Clone, Debug)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Recipes whose title or description contains `query`, ignoring case.
    /// No query, or an empty one, returns the whole catalog.
    pub fn search(&self, query: Option<&str>) -> Vec<Recipe> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return self.recipes.clone();
        };

        let needle = query.to_lowercase();
        self.recipes
            .iter()
            .filter(|recipe| recipe.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeCatalog {
    /// The sample recipes bundled with the app
    fn default() -> Self {
        Self::new(vec![
            Recipe::new(1, "Garlic Noodles")
                .with_description("Rich, buttery garlic noodles with parmesan and umami.")
                .with_times(15, 15)
                .with_ingredients([
                    "200g spaghetti or Chinese egg noodles",
                    "4 cloves garlic, finely minced",
                    "3 tbsp butter",
                    "1 tbsp soy sauce",
                    "1 tbsp oyster sauce",
                    "2 tbsp grated parmesan",
                    "Pinch of sugar",
                ])
                .with_steps([
                    "Cook noodles in salted water until just al dente.",
                    "Melt butter in a pan on low heat and gently cook garlic until fragrant (do not brown).",
                    "Stir in soy sauce, oyster sauce, and a pinch of sugar.",
                    "Add drained noodles to the pan and toss to coat.",
                    "Turn off heat, add parmesan, and toss again.",
                    "Adjust seasoning and serve immediately.",
                ])
                .with_notes("Great with a squeeze of lime and some chili crisp on top."),
            Recipe::new(2, "Butternut Squash Soup")
                .with_description("Creamy roasted butternut squash soup with brown butter.")
                .with_times(20, 40)
                .with_ingredients([
                    "1 medium butternut squash, peeled and cubed",
                    "1 onion, sliced",
                    "3 cloves garlic",
                    "3 tbsp butter (for browning)",
                    "3–4 cups chicken or veggie stock",
                    "Salt and pepper",
                    "Splash of cream (optional)",
                ])
                .with_steps([
                    "Roast squash, onion, and garlic at 400°F until soft and caramelized.",
                    "Brown butter in a pot until nutty and golden.",
                    "Add roasted veggies and enough stock to cover.",
                    "Simmer 10–15 minutes, then blend until smooth.",
                    "Adjust thickness with more stock, then season.",
                    "Finish with a splash of cream if desired.",
                ])
                .with_notes(
                    "Top with toasted pumpkin seeds, a drizzle of brown butter, or chili oil.",
                ),
            Recipe::new(3, "Matcha Genmaicha Ice Cream")
                .with_description("Toasty rice and green tea ice cream, super creamy.")
                .with_times(30, 0)
                .with_ingredients([
                    "2 cups heavy cream",
                    "1 cup whole milk",
                    "4 egg yolks",
                    "120g sugar",
                    "2–3 tbsp matcha genmaicha (tea)",
                    "Pinch of salt",
                ])
                .with_steps([
                    "Warm milk and cream with the tea, then steep 15–20 minutes.",
                    "Strain out tea, then reheat gently.",
                    "Whisk egg yolks with sugar until pale.",
                    "Temper yolks with warm dairy, then cook to nappe (about 170°F).",
                    "Chill completely, then churn in ice cream maker.",
                ])
                .with_notes("Adjust tea amount based on how roasty/bitter you like it."),
        ])
    }
}
