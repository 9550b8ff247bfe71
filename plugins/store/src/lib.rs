//! Key-value storage for myrecipes
//!
//! Values are JSON text addressed by string keys such as
//! `@myrecipes/v2/mealPlan`. Two backends implement [`KeyValueStore`]:
//!
//! - [`FileStore`] keeps data on disk. The part of a key before the last `/`
//!   selects a group file, the rest is the entry inside that file.
//! - [`MemoryStore`] keeps data in memory, for the memory-only app variant
//!   and for tests.
//!
//! The typed helpers ([`read_value`], [`write_value`], [`delete_value`])
//! take care of the JSON encoding.
//!
//! # Example
//!
//! ```ignore
//! use myrecipes_store::{AppName, FileStore, read_value, write_value};
//!
//! let store = FileStore::new(&AppName::new("com", "example", "myrecipes"));
//! write_value(&store, "@myrecipes/v2/mealPlan", &vec!["noodles"]).await?;
//! let plan: Option<Vec<String>> = read_value(&store, "@myrecipes/v2/mealPlan").await?;
//! ```

mod app_name;
mod error;
mod file_store;
mod helpers;
mod kv;
mod memory;
mod storage;

pub use app_name::AppName;
pub use error::StoreError;
pub use file_store::FileStore;
pub use helpers::{delete_value, read_value, write_value};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use storage::storage_dir;
