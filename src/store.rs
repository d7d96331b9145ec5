//! # Page Storage
//!
//! Pages are persisted as one JSON blob per user in a flat key-value store.
//! The key is `pageMemoryData_<userId>`, or plain `pageMemoryData` for the
//! anonymous page.
//!
//! Two stores are provided: [`MemoryStore`] for tests and embedding, and
//! [`FileStore`], which keeps each key as `<dir>/<key>.json`.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::model::{Page, PageData, GRID_COLUMNS, MAX_GRID_ROWS};

/// Base key for stored pages.
pub const STORAGE_KEY: &str = "pageMemoryData";

/// Storage key for a user's page.
pub fn storage_key(user_id: Option<&str>) -> String {
    match user_id {
        Some(id) if !id.is_empty() => format!("{STORAGE_KEY}_{id}"),
        _ => STORAGE_KEY.to_string(),
    }
}

/// A string-to-string store, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(&path, value).map_err(io_err)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote store entry");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Serialize and write a page under the user's key.
pub fn save_page<S: KeyValueStore + ?Sized>(
    store: &mut S,
    user_id: Option<&str>,
    page: &Page,
) -> Result<PageData, StoreError> {
    let key = storage_key(user_id);
    let data = PageData::from_page(page, user_id);
    let json = serde_json::to_string(&data).map_err(StoreError::Serialize)?;
    store.set(&key, &json)?;
    info!(key = %key, blocks = data.blocks.len(), "saved page");
    Ok(data)
}

/// Read a user's page. `None` when nothing has been saved yet.
pub fn load_page<S: KeyValueStore + ?Sized>(
    store: &S,
    user_id: Option<&str>,
) -> Result<Option<PageData>, StoreError> {
    let key = storage_key(user_id);
    let Some(json) = store.get(&key)? else {
        debug!(key = %key, "no stored page");
        return Ok(None);
    };
    let data = parse_page(&key, &json)?;
    info!(key = %key, blocks = data.blocks.len(), "loaded page");
    Ok(Some(data))
}

/// Parse a page blob and check that every block lies inside the grid.
/// `key` names the blob in errors.
pub fn parse_page(key: &str, json: &str) -> Result<PageData, StoreError> {
    let data: PageData = serde_json::from_str(json).map_err(|e| StoreError::parse(key, e))?;
    if let Some(block) = data
        .blocks
        .iter()
        .find(|b| b.right() > GRID_COLUMNS || b.bottom() > MAX_GRID_ROWS)
    {
        return Err(StoreError::OutOfGrid {
            key: key.to_string(),
            block: block.id.clone(),
        });
    }
    Ok(data)
}
