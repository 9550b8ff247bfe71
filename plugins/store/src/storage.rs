//! Group files on disk

use crate::app_name::AppName;
use crate::error::{Result, StoreError};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

const DEFAULT_GROUP: &str = "default";

/// Directory holding the store files for the application
///
/// Uses platform-specific conventions:
/// - Linux: `$XDG_CONFIG_HOME/<app>/store` or `~/.config/<app>/store`
/// - macOS: `~/Library/Application Support/<qualifier>.<org>.<app>/store`
/// - Windows: `%LOCALAPPDATA%\<org>\<app>\config\store`
pub fn storage_dir(app_name: &AppName) -> PathBuf {
    directories::ProjectDirs::from(
        app_name.qualifier.as_str(),
        app_name.organization.as_str(),
        app_name.application.as_str(),
    )
    .map(|dirs| dirs.config_local_dir().to_path_buf())
    .unwrap_or_else(|| PathBuf::from("."))
    .join("store")
}

/// Map a store key onto its group file and the entry name inside it.
///
/// `@myrecipes/v2/mealPlan` lands in `<root>/myrecipes/v2.json` under
/// `mealPlan`. Keys without a `/` go to `<root>/default.json`.
pub(crate) fn locate(root: &Path, key: &str) -> Result<(PathBuf, String)> {
    let invalid = || StoreError::InvalidKey(key.to_string());

    let (group, entry) = match key.rsplit_once('/') {
        Some((group, entry)) => (group, entry),
        None => (DEFAULT_GROUP, key),
    };
    if entry.is_empty() {
        return Err(invalid());
    }

    let mut path = root.to_path_buf();
    let segments: Vec<&str> = group.split('/').collect();
    for (i, raw) in segments.iter().enumerate() {
        let segment = raw.trim_start_matches('@');
        let unsafe_segment = segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['\\', ':']);
        if unsafe_segment {
            return Err(invalid());
        }
        if i + 1 == segments.len() {
            path.push(format!("{segment}.json"));
        } else {
            path.push(segment);
        }
    }

    Ok((path, entry.to_string()))
}

/// Load a group file. A missing or empty file is an empty group.
pub(crate) async fn load_group(path: &Path) -> Result<HashMap<String, String>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(HashMap::new());
    }

    serde_json::from_str(&contents).map_err(|source| StoreError::CorruptGroup {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a group file, creating its directory if needed.
///
/// The file is written next to its destination and renamed into place. An
/// empty group removes the file instead.
pub(crate) async fn save_group(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if data.is_empty() {
        return match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_err(e)),
        };
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let contents = serde_json::to_string_pretty(data).map_err(|source| StoreError::Serialize {
        key: path.display().to_string(),
        source,
    })?;

    let staging = path.with_extension("json.tmp");
    fs::write(&staging, contents).await.map_err(write_err)?;
    fs::rename(&staging, path).await.map_err(write_err)?;

    Ok(())
}

/// Load a group, let `modifier` change it and save it back.
///
/// The modifier returns whether it changed anything; unchanged groups are
/// not rewritten. Returns the modifier's answer.
///
/// A corrupt group file is moved aside to `<group>.json.corrupt` and the
/// modifier starts from an empty group, so writes keep working.
pub(crate) async fn modify_group<F>(path: &Path, modifier: F) -> Result<bool>
where
    F: FnOnce(&mut HashMap<String, String>) -> bool,
{
    let mut data = match load_group(path).await {
        Ok(data) => data,
        Err(StoreError::CorruptGroup { source, .. }) => {
            let quarantine = quarantine_path(path);
            warn!(
                path = %path.display(),
                moved_to = %quarantine.display(),
                error = %source,
                "corrupt group file, starting over"
            );
            fs::rename(path, &quarantine)
                .await
                .map_err(|source| StoreError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            HashMap::new()
        }
        Err(e) => return Err(e),
    };
    let modified = modifier(&mut data);

    if modified {
        save_group(path, &data).await?;
    }

    Ok(modified)
}

pub(crate) fn quarantine_path(path: &Path) -> PathBuf {
    path.with_extension("json.corrupt")
}
