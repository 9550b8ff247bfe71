//! On-disk behaviour of `FileStore`, each test in its own temp directory.

use std::sync::Arc;

use myrecipes_store::{
    FileStore, KeyValueStore, StoreError, delete_value, read_value, write_value,
};

const PLAN_KEY: &str = "@myrecipes/v2/mealPlan";
const SHOPPING_KEY: &str = "@myrecipes/v2/shoppingItems";

#[tokio::test]
async fn values_persist_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();

    let store = FileStore::at(dir.path());
    write_value(&store, PLAN_KEY, &vec!["Garlic Noodles"]).await.unwrap();

    let reopened = FileStore::at(dir.path());
    let plan: Option<Vec<String>> = read_value(&reopened, PLAN_KEY).await.unwrap();
    assert_eq!(plan, Some(vec!["Garlic Noodles".to_string()]));

    assert!(dir.path().join("myrecipes").join("v2.json").is_file());
}

#[tokio::test]
async fn missing_directory_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::at(dir.path().join("never-created"));

    assert_eq!(store.get(PLAN_KEY).await.unwrap(), None);
    assert!(!store.delete(PLAN_KEY).await.unwrap());
}

#[tokio::test]
async fn delete_leaves_sibling_keys_alone() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::at(dir.path());

    store.set(PLAN_KEY, "[1]".into()).await.unwrap();
    store.set(SHOPPING_KEY, "[2]".into()).await.unwrap();

    assert!(store.delete(PLAN_KEY).await.unwrap());
    assert_eq!(store.get(PLAN_KEY).await.unwrap(), None);
    assert_eq!(store.get(SHOPPING_KEY).await.unwrap().as_deref(), Some("[2]"));
}

#[tokio::test]
async fn deleting_last_key_removes_group_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::at(dir.path());

    store.set(PLAN_KEY, "[]".into()).await.unwrap();
    let group_file = dir.path().join("myrecipes").join("v2.json");
    assert!(group_file.is_file());

    store.delete(PLAN_KEY).await.unwrap();
    assert!(!group_file.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_to_one_group_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::at(dir.path()));

    let mut tasks = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store
                .set(&format!("@myrecipes/v2/key{i}"), format!("[{i}]"))
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for i in 0..16 {
        let raw = store.get(&format!("@myrecipes/v2/key{i}")).await.unwrap();
        assert_eq!(raw, Some(format!("[{i}]")));
    }
}

#[tokio::test]
async fn corrupt_group_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let group_dir = dir.path().join("myrecipes");
    std::fs::create_dir_all(&group_dir).unwrap();
    std::fs::write(group_dir.join("v2.json"), "{ not json").unwrap();

    let store = FileStore::at(dir.path());
    let result = store.get(PLAN_KEY).await;
    assert!(matches!(result, Err(StoreError::CorruptGroup { .. })));
}

#[tokio::test]
async fn writes_recover_from_a_corrupt_group_file() {
    let dir = tempfile::tempdir().unwrap();
    let group_dir = dir.path().join("myrecipes");
    std::fs::create_dir_all(&group_dir).unwrap();
    std::fs::write(group_dir.join("v2.json"), "{ not json").unwrap();

    let store = FileStore::at(dir.path());
    let read: Result<Option<Vec<String>>, _> = read_value(&store, PLAN_KEY).await;
    assert!(matches!(read, Err(StoreError::CorruptGroup { .. })));

    write_value(&store, PLAN_KEY, &vec!["Noodles"]).await.unwrap();
    assert!(!delete_value(&store, SHOPPING_KEY).await.unwrap());

    let plan: Option<Vec<String>> = read_value(&store, PLAN_KEY).await.unwrap();
    assert_eq!(plan, Some(vec!["Noodles".to_string()]));

    let kept = std::fs::read_to_string(group_dir.join("v2.json.corrupt")).unwrap();
    assert_eq!(kept, "{ not json");
}

#[tokio::test]
async fn deleting_from_a_corrupt_group_file_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    let group_dir = dir.path().join("myrecipes");
    std::fs::create_dir_all(&group_dir).unwrap();
    std::fs::write(group_dir.join("v2.json"), "[1, 2").unwrap();

    let store = FileStore::at(dir.path());
    assert!(!store.delete(SHOPPING_KEY).await.unwrap());

    assert!(!group_dir.join("v2.json").exists());
    assert_eq!(store.get(PLAN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn invalid_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::at(dir.path());

    let result = store.set("../outside/key", "1".into()).await;
    assert!(matches!(result, Err(StoreError::InvalidKey(_))));
}
