//! Hydrate/mutate/persist cycles against real stores, including simulated
//! restarts where a fresh state hydrates from what the previous one wrote.

use std::sync::Arc;
use std::time::Duration;

use myrecipes_meal_plan_plugin::{
    Collection, MealPlanConfig, MealPlanState, Recipe, StorageEffect, StorageKeys, apply_effect,
    hydrate,
};
use myrecipes_store::{FileStore, KeyValueStore, MemoryStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn noodles() -> Recipe {
    Recipe::new(1, "Garlic Noodles").with_ingredients(["noodles", "garlic", "butter"])
}

fn soup() -> Recipe {
    Recipe::new(2, "Butternut Squash Soup").with_ingredients(["squash", "stock"])
}

/// Start the app: fresh state, hydrated from `store`.
async fn boot(store: &Arc<dyn KeyValueStore>, keys: &StorageKeys) -> MealPlanState {
    let mut state = MealPlanState::new(keys.clone());
    let effects = state
        .finish_hydration(hydrate(Arc::clone(store), keys.clone()).await)
        .expect("fresh state hydrates once");
    flush(store, effects).await;
    state
}

async fn flush(store: &Arc<dyn KeyValueStore>, effects: Vec<StorageEffect>) {
    for effect in effects {
        apply_effect(Arc::clone(store), effect)
            .await
            .expect("storage effect failed");
    }
}

fn memory() -> (MemoryStore, Arc<dyn KeyValueStore>) {
    let store = MemoryStore::new();
    let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    (store, shared)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hydrating_with_nothing_saved_gives_empty_collections() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();

    let state = boot(&store, &keys).await;

    assert!(state.is_hydrated());
    assert!(state.planned_recipes().is_empty());
    assert!(state.shopping_items().is_empty());
    assert_eq!(observer.write_count(), 0);
}

#[tokio::test]
async fn planned_recipe_survives_restart() {
    let (_, store) = memory();
    let keys = StorageKeys::default();

    let mut state = boot(&store, &keys).await;
    let recipe = noodles();
    let effects = state.add_recipe_to_meal_plan(&recipe);
    flush(&store, effects).await;
    drop(state);

    let restarted = boot(&store, &keys).await;
    let planned = restarted.planned_recipes();
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].recipe_id, recipe.id);
    assert_eq!(planned[0].title, recipe.title);
}

#[tokio::test]
async fn shopping_list_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::at(dir.path()));
    let keys = StorageKeys::default();

    let mut state = boot(&store, &keys).await;
    let effects = state.add_ingredients_to_shopping_list(&noodles());
    flush(&store, effects).await;
    let effects = state.add_ingredients_to_shopping_list(&soup());
    flush(&store, effects).await;
    let before = state.shopping_items().to_vec();
    drop(state);

    let reopened: Arc<dyn KeyValueStore> = Arc::new(FileStore::at(dir.path()));
    let restarted = boot(&reopened, &keys).await;
    assert_eq!(restarted.shopping_items(), before.as_slice());
}

#[tokio::test]
async fn empty_ingredients_do_not_write() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();
    let mut state = boot(&store, &keys).await;

    let effects = state.add_ingredients_to_shopping_list(&Recipe::new(5, "Mystery"));
    assert!(effects.is_empty());
    let effects = state.add_ingredients_to_shopping_list(
        &Recipe::new(6, "Nothing").with_ingredients(Vec::<String>::new()),
    );
    assert!(effects.is_empty());

    assert!(state.shopping_items().is_empty());
    assert_eq!(observer.write_count(), 0);
    assert!(!observer.contains_key(&keys.shopping_items));
}

#[tokio::test]
async fn ingredients_are_appended_as_one_write() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();
    let mut state = boot(&store, &keys).await;

    let recipe = Recipe::new(7, "Trio").with_ingredients(["a", "b", "c"]);
    let effects = state.add_ingredients_to_shopping_list(&recipe);
    assert_eq!(effects.len(), 1);
    flush(&store, effects).await;

    assert_eq!(observer.write_count(), 1);
    let names: Vec<&str> = state.shopping_items().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert!(
        state
            .shopping_items()
            .iter()
            .all(|i| i.from_recipe_id == 7 && i.from_recipe_title == "Trio")
    );
}

#[tokio::test]
async fn cleared_meal_plan_stays_cleared_after_restart() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();

    let mut state = boot(&store, &keys).await;
    let effects = state.add_recipe_to_meal_plan(&noodles());
    flush(&store, effects).await;
    assert!(observer.contains_key(&keys.meal_plan));

    let effects = state.clear_meal_plan();
    flush(&store, effects).await;
    assert!(!observer.contains_key(&keys.meal_plan));
    drop(state);

    let restarted = boot(&store, &keys).await;
    assert!(restarted.planned_recipes().is_empty());
}

#[tokio::test]
async fn clearing_one_collection_keeps_the_other_stored() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();

    let mut state = boot(&store, &keys).await;
    flush(&store, state.add_recipe_to_meal_plan(&soup())).await;
    flush(&store, state.add_ingredients_to_shopping_list(&soup())).await;

    flush(&store, state.clear_shopping_list()).await;
    assert_eq!(state.planned_recipes().len(), 1);
    assert!(observer.contains_key(&keys.meal_plan));
    assert!(!observer.contains_key(&keys.shopping_items));

    flush(&store, state.add_ingredients_to_shopping_list(&soup())).await;
    flush(&store, state.clear_meal_plan()).await;
    assert_eq!(state.shopping_items().len(), 2);
    assert!(observer.contains_key(&keys.shopping_items));

    let restarted = boot(&store, &keys).await;
    assert!(restarted.planned_recipes().is_empty());
    assert_eq!(restarted.shopping_items().len(), 2);
}

#[tokio::test]
async fn mutation_racing_a_slow_hydration_is_persisted_after_it() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();

    // A previous session left one planned recipe behind.
    {
        let mut earlier = boot(&store, &keys).await;
        flush(&store, earlier.add_recipe_to_meal_plan(&soup())).await;
    }
    let writes_before = observer.write_count();

    observer.set_read_delay(Some(Duration::from_millis(50)));
    let mut state = MealPlanState::new(keys.clone());
    let loading = tokio::spawn(hydrate(Arc::clone(&store), keys.clone()));

    let effects = state.add_recipe_to_meal_plan(&noodles());
    assert!(effects.is_empty());
    assert_eq!(state.planned_recipes().len(), 1);
    assert_eq!(observer.write_count(), writes_before);

    let hydration = loading.await.unwrap();
    let effects = state.finish_hydration(hydration).unwrap();
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].collection(), Collection::MealPlan);
    flush(&store, effects).await;

    let titles: Vec<&str> = state.planned_recipes().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Butternut Squash Soup", "Garlic Noodles"]);

    observer.set_read_delay(None);
    let restarted = boot(&store, &keys).await;
    assert_eq!(restarted.planned_recipes(), state.planned_recipes());
}

#[tokio::test]
async fn corrupt_saved_data_is_skipped_and_replaced() {
    let keys = MealPlanConfig::new("@corrupt").keys();
    let observer = MemoryStore::with_values([(keys.meal_plan.clone(), "{\"oops\": true}")]);
    let store: Arc<dyn KeyValueStore> = Arc::new(observer.clone());

    let mut state = boot(&store, &keys).await;
    assert!(state.planned_recipes().is_empty());

    flush(&store, state.add_recipe_to_meal_plan(&noodles())).await;
    let restarted = boot(&store, &keys).await;
    assert_eq!(restarted.planned_recipes().len(), 1);
}

#[tokio::test]
async fn corrupt_file_on_disk_is_replaced_by_the_next_save() {
    let dir = tempfile::tempdir().unwrap();
    let group_dir = dir.path().join("myrecipes");
    std::fs::create_dir_all(&group_dir).unwrap();
    std::fs::write(group_dir.join("v2.json"), "{ not json").unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::at(dir.path()));
    let keys = StorageKeys::default();

    let mut state = boot(&store, &keys).await;
    assert!(state.planned_recipes().is_empty());
    assert!(state.shopping_items().is_empty());

    flush(&store, state.add_recipe_to_meal_plan(&noodles())).await;
    flush(&store, state.add_ingredients_to_shopping_list(&soup())).await;
    flush(&store, state.clear_shopping_list()).await;

    let restarted = boot(&store, &keys).await;
    assert_eq!(restarted.planned_recipes(), state.planned_recipes());
    assert!(restarted.shopping_items().is_empty());
}

#[tokio::test]
async fn failed_writes_leave_memory_authoritative() {
    let (observer, store) = memory();
    let keys = StorageKeys::default();
    let mut state = boot(&store, &keys).await;

    observer.set_failing(true);
    let effects = state.add_recipe_to_meal_plan(&noodles());
    for effect in effects {
        assert!(apply_effect(Arc::clone(&store), effect).await.is_err());
    }

    assert_eq!(state.planned_recipes().len(), 1);
}

#[tokio::test]
async fn schema_bump_starts_from_scratch() {
    let (_, store) = memory();
    let v2 = MealPlanConfig::default().keys();
    let v3 = MealPlanConfig::default().with_schema_version(3).keys();

    let mut state = boot(&store, &v2).await;
    flush(&store, state.add_recipe_to_meal_plan(&noodles())).await;

    let upgraded = boot(&store, &v3).await;
    assert!(upgraded.planned_recipes().is_empty());
}
