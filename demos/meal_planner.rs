//! Meal planner demo
//!
//! Browse the sample recipes, add them to the meal plan, pull their
//! ingredients into the shopping list and restart the app to see both come
//! back. Set `RUST_LOG=debug` to watch hydration and every save.
//!
//! The pantry screen is a scratch list kept in memory only.

use iced::widget::{Column, button, column, row, scrollable, text, text_input};
use iced::{Element, Length, Task};
use myrecipes::{PluginHandle, PluginManager, PluginManagerBuilder, PluginMessage};
use myrecipes_meal_plan_plugin::{
    MealPlanConfig, MealPlanOutput, MealPlanPlugin, Recipe, RecipeCatalog, RecipeId,
    use_meal_plan,
};
use myrecipes_store::{AppName, FileStore};

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    iced::application(App::new, App::update, App::view)
        .subscription(subscription)
        .run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Recipes,
    Recipe(RecipeId),
    MealPlan,
    ShoppingList,
    Pantry,
}

#[derive(Debug, Clone)]
struct PantryItem {
    id: u64,
    name: String,
    quantity: Option<String>,
}

impl PantryItem {
    fn new(id: u64, name: &str, quantity: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            quantity: Some(quantity.to_string()),
        }
    }
}

struct App {
    plugins: PluginManager,
    meal_plan: PluginHandle<MealPlanPlugin>,
    catalog: RecipeCatalog,
    screen: Screen,
    query: String,
    status_message: String,
    pantry: Vec<PantryItem>,
    next_pantry_id: u64,
    pantry_name: String,
    pantry_quantity: String,
}

#[derive(Debug, Clone)]
enum Message {
    Plugin(PluginMessage),
    MealPlanOutput(MealPlanOutput),

    Navigate(Screen),
    QueryChanged(String),

    AddToMealPlan(Recipe),
    AddIngredients(Recipe),
    ClearMealPlan,
    ClearShoppingList,

    PantryNameChanged(String),
    PantryQuantityChanged(String),
    AddPantryItem,
    RemovePantryItem(u64),
}

impl App {
    fn new() -> (App, Task<Message>) {
        let store = FileStore::new(&AppName::new("com", "myrecipes", "meal_planner"));
        let plugin = MealPlanPlugin::new(store).with_config(MealPlanConfig::from_env());

        let mut builder = PluginManagerBuilder::new();
        let meal_plan = builder.install(plugin);
        let (plugins, init_task) = builder.build();

        let app = App {
            plugins,
            meal_plan,
            catalog: RecipeCatalog::default(),
            screen: Screen::Recipes,
            query: String::new(),
            status_message: "Loading saved meal plan...".to_string(),
            pantry: vec![
                PantryItem::new(1, "Garlic", "3 cloves"),
                PantryItem::new(2, "Butter", "1 stick"),
                PantryItem::new(3, "Chicken thighs", "2 lbs"),
            ],
            next_pantry_id: 4,
            pantry_name: String::new(),
            pantry_quantity: String::new(),
        };

        (app, init_task.map(Message::Plugin))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Plugin(plugin_msg) => {
                return self.plugins.update(plugin_msg).map(Message::Plugin);
            }

            Message::MealPlanOutput(output) => match output {
                MealPlanOutput::Hydrated {
                    planned_recipes,
                    shopping_items,
                } => {
                    self.status_message = format!(
                        "Loaded {} planned recipes and {} shopping items",
                        planned_recipes, shopping_items
                    );
                }
                MealPlanOutput::StorageFailed(error) => {
                    self.status_message = format!("Could not save: {}", error);
                }
                _ => {}
            },

            Message::Navigate(screen) => {
                self.screen = screen;
            }

            Message::QueryChanged(query) => {
                self.query = query;
            }

            Message::AddToMealPlan(recipe) => {
                self.status_message = format!("Added {} to your meal plan", recipe.title);
                return use_meal_plan(&mut self.plugins)
                    .add_recipe_to_meal_plan(&recipe)
                    .map(Message::Plugin);
            }

            Message::AddIngredients(recipe) => {
                self.status_message = format!("Added ingredients of {}", recipe.title);
                return use_meal_plan(&mut self.plugins)
                    .add_ingredients_to_shopping_list(&recipe)
                    .map(Message::Plugin);
            }

            Message::ClearMealPlan => {
                return use_meal_plan(&mut self.plugins)
                    .clear_meal_plan()
                    .map(Message::Plugin);
            }

            Message::ClearShoppingList => {
                return use_meal_plan(&mut self.plugins)
                    .clear_shopping_list()
                    .map(Message::Plugin);
            }

            Message::PantryNameChanged(name) => {
                self.pantry_name = name;
            }

            Message::PantryQuantityChanged(quantity) => {
                self.pantry_quantity = quantity;
            }

            Message::AddPantryItem => {
                let name = self.pantry_name.trim();
                if !name.is_empty() {
                    let quantity = self.pantry_quantity.trim();
                    self.pantry.push(PantryItem {
                        id: self.next_pantry_id,
                        name: name.to_string(),
                        quantity: (!quantity.is_empty()).then(|| quantity.to_string()),
                    });
                    self.next_pantry_id += 1;
                    self.pantry_name.clear();
                    self.pantry_quantity.clear();
                }
            }

            Message::RemovePantryItem(id) => {
                self.pantry.retain(|item| item.id != id);
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let nav = row![
            button("Recipes").on_press(Message::Navigate(Screen::Recipes)),
            button("Meal Plan").on_press(Message::Navigate(Screen::MealPlan)),
            button("Shopping List").on_press(Message::Navigate(Screen::ShoppingList)),
            button("Pantry").on_press(Message::Navigate(Screen::Pantry)),
        ]
        .spacing(10);

        let body = match self.screen {
            Screen::Recipes => self.recipes_view(),
            Screen::Recipe(id) => self.recipe_view(id),
            Screen::MealPlan => self.meal_plan_view(),
            Screen::ShoppingList => self.shopping_list_view(),
            Screen::Pantry => self.pantry_view(),
        };

        let content = column![
            nav,
            text(&self.status_message).size(12),
            text("").size(6),
            body,
        ]
        .spacing(10)
        .padding(20);

        scrollable(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn recipes_view(&self) -> Element<'_, Message> {
        let query = Some(self.query.as_str());
        let mut list = Column::new()
            .spacing(8)
            .push(text("Recipes").size(28))
            .push(text_input("Search recipes", &self.query).on_input(Message::QueryChanged));

        for recipe in self.catalog.search(query) {
            let summary = recipe.description.clone().unwrap_or_default();
            list = list.push(
                column![
                    button(text(recipe.title.clone())).on_press(Message::Navigate(Screen::Recipe(recipe.id))),
                    text(summary).size(12),
                ]
                .spacing(2),
            );
        }

        list.into()
    }

    fn recipe_view(&self, id: RecipeId) -> Element<'_, Message> {
        let Some(recipe) = self.catalog.get(id) else {
            return text("Recipe not found").into();
        };

        let mut details = Column::new()
            .spacing(6)
            .push(text(&recipe.title).size(28));

        if let Some(description) = &recipe.description {
            details = details.push(text(description).size(14));
        }
        if let Some(total) = recipe.total_time_minutes() {
            details = details.push(text(format!("Total time: {} min", total)).size(12));
        }

        details = details.push(text("Ingredients").size(18));
        for ingredient in recipe.ingredients.iter().flatten() {
            details = details.push(text(format!("• {}", ingredient)).size(14));
        }

        details = details.push(text("Steps").size(18));
        for (i, step) in recipe.steps.iter().flatten().enumerate() {
            details = details.push(text(format!("{}. {}", i + 1, step)).size(14));
        }

        if let Some(notes) = &recipe.notes {
            details = details.push(text(format!("Notes: {}", notes)).size(12));
        }

        details
            .push(
                row![
                    button("Add to meal plan").on_press(Message::AddToMealPlan(recipe.clone())),
                    button("Add ingredients to shopping list")
                        .on_press(Message::AddIngredients(recipe.clone())),
                ]
                .spacing(10),
            )
            .into()
    }

    fn meal_plan_view(&self) -> Element<'_, Message> {
        let Some(state) = self.plugins.get_plugin_state::<MealPlanPlugin>() else {
            return text("Meal plan unavailable").into();
        };
        let planned = state.planned_recipes();

        let mut header = row![text(format!("Planned recipes: {}", planned.len())).size(14)].spacing(10);
        if !planned.is_empty() {
            header = header.push(button("Clear all").on_press(Message::ClearMealPlan));
        }

        let mut list = Column::new()
            .spacing(6)
            .push(text("Meal Plan").size(28))
            .push(header);

        if planned.is_empty() {
            list = list.push(text(
                "No recipes in your meal plan yet.\nAdd some from a recipe detail screen.",
            ));
        }
        for (i, entry) in planned.iter().enumerate() {
            list = list.push(
                row![
                    text(format!("{}.", i + 1)).size(16),
                    button(text(entry.title.clone()))
                        .on_press(Message::Navigate(Screen::Recipe(entry.recipe_id))),
                ]
                .spacing(8),
            );
        }

        list.into()
    }

    fn shopping_list_view(&self) -> Element<'_, Message> {
        let Some(state) = self.plugins.get_plugin_state::<MealPlanPlugin>() else {
            return text("Shopping list unavailable").into();
        };
        let items = state.shopping_items_by_recipe();

        let mut header = row![text(format!("Items: {}", items.len())).size(14)].spacing(10);
        if !items.is_empty() {
            header = header.push(button("Clear all").on_press(Message::ClearShoppingList));
        }

        let mut list = Column::new()
            .spacing(6)
            .push(text("Shopping List").size(28))
            .push(text("Ingredients pulled from your planned recipes.").size(12))
            .push(header);

        if items.is_empty() {
            list = list.push(text(
                "No items yet.\nAdd ingredients from a recipe detail screen.",
            ));
        }
        for item in items {
            list = list.push(
                column![
                    text(item.name.clone()).size(14),
                    text(format!("from {}", item.from_recipe_title)).size(11),
                ]
                .spacing(2),
            );
        }

        list.into()
    }

    fn pantry_view(&self) -> Element<'_, Message> {
        let form = row![
            text_input("Ingredient name (e.g. Garlic)", &self.pantry_name)
                .on_input(Message::PantryNameChanged)
                .on_submit(Message::AddPantryItem),
            text_input("Quantity (optional, e.g. 2 cups)", &self.pantry_quantity)
                .on_input(Message::PantryQuantityChanged)
                .on_submit(Message::AddPantryItem),
            button("Add").on_press(Message::AddPantryItem),
        ]
        .spacing(10);

        let mut list = Column::new()
            .spacing(6)
            .push(text("Pantry").size(28))
            .push(form);

        if self.pantry.is_empty() {
            list = list.push(text("Your pantry is empty."));
        }
        for item in &self.pantry {
            let label = match &item.quantity {
                Some(quantity) => format!("{} ({})", item.name, quantity),
                None => item.name.clone(),
            };
            list = list.push(
                row![
                    text(label).size(14),
                    button("Remove").on_press(Message::RemovePantryItem(item.id)),
                ]
                .spacing(8),
            );
        }

        list.into()
    }
}

fn subscription(app: &App) -> iced::Subscription<Message> {
    iced::Subscription::batch([
        app.plugins.subscriptions().map(Message::Plugin),
        app.meal_plan.listen().map(Message::MealPlanOutput),
    ])
}
