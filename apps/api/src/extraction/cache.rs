//! Content-addressed on-disk cache of extracted rule sets.
//!
//! One JSON file per guideline text, named by the SHA-256 of that text.
//! Entries never expire. Writes go through a temp file in the same directory
//! and are renamed into place, so readers never observe a partial file;
//! concurrent writers for the same key produce identical content.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

use crate::rules::RuleSet;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to move cache entry into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub rules: RuleSet,
    pub created_at: DateTime<Utc>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct RuleCache {
    dir: PathBuf,
}

impl RuleCache {
    /// Opens (creating if needed) the cache directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a guideline text.
    pub fn key_for(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Reads the raw entry for `key`, if one exists.
    pub fn load_entry(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Cached rules for `key`. Unreadable entries count as misses.
    pub fn get(&self, key: &str) -> Option<RuleSet> {
        match self.load_entry(key) {
            Ok(entry) => entry.map(|e| e.rules),
            Err(e) => {
                warn!("Ignoring unreadable cache entry {key}: {e}");
                None
            }
        }
    }

    /// Number of stored entries. Temp files from in-flight writes are not counted.
    pub fn entry_count(&self) -> Result<usize, CacheError> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn put(&self, key: &str, rules: &RuleSet, model: &str) -> Result<(), CacheError> {
        let entry = CacheEntry {
            key: key.to_string(),
            rules: rules.clone(),
            created_at: Utc::now(),
            model: model.to_string(),
        };

        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(&serde_json::to_vec_pretty(&entry)?)?;
        file.persist(self.entry_path(key))?;
        Ok(())
    }
}
