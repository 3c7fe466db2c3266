use serde_json::{Map, Value};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::data::HISTORY_KEY;
use crate::error::StoreError;

pub const MAX_RECENT: usize = 6;

/// Most-recent-first list of distinct names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentSearches {
    entries: Vec<String>,
}

impl RecentSearches {
    /// Build from stored entries, dropping duplicates and anything past the cap.
    pub fn from_entries(entries: Vec<String>) -> Self {
        let mut recent = Self::default();
        for entry in entries.into_iter().rev() {
            recent.insert(&entry);
        }
        recent
    }

    pub fn insert(&mut self, name: &str) {
        self.entries.retain(|existing| existing != name);
        self.entries.insert(0, name.to_string());
        self.entries.truncate(MAX_RECENT);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persistence for the recent-search list. Callers treat every failure as
/// non-fatal.
pub trait HistoryStore {
    fn load(&self) -> Result<Vec<String>, StoreError>;
    fn save(&self, entries: &[String]) -> Result<(), StoreError>;
}

/// Key/value JSON file standing in for browser local storage.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            key: HISTORY_KEY.to_string(),
        }
    }

    fn path(&self) -> Result<&Path, StoreError> {
        self.path.as_deref().ok_or(StoreError::Unavailable)
    }

    fn read_map(&self, path: &Path) -> Result<Map<String, Value>, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        let path = self.path()?;
        let map = self.read_map(path)?;

        // Values are JSON text, the way browser storage keeps them.
        match map.get(&self.key) {
            Some(Value::String(encoded)) => Ok(serde_json::from_str(encoded)?),
            Some(other) => Ok(serde_json::from_value(other.clone())?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[String]) -> Result<(), StoreError> {
        let path = self.path()?;
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        // An unreadable file is replaced rather than blocking the save.
        let mut map = self.read_map(path).unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable storage file: {}", e);
            Map::new()
        });
        map.insert(self.key.clone(), Value::String(serde_json::to_string(entries)?));

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(write_err)?;

        let temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, &map)?;
            writer.flush().map_err(write_err)?;
        }
        temp_file.persist(path).map_err(|e| write_err(e.error))?;

        tracing::debug!(entries = entries.len(), "saved recent searches");
        Ok(())
    }
}
