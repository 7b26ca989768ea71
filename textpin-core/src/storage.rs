use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// One captured clipboard snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: u64,
    pub content: String,
    /// Sha256 of the content — dedupe key
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub char_count: usize,
    pub word_count: usize,
    #[serde(default)]
    pub favorite: bool,
}

/// Storage abstraction for the clipboard snippet history.
pub trait SnippetStore {
    /// Record a snippet. Blank content is ignored (returns None). Content
    /// already in the store gets its timestamp refreshed instead of a
    /// duplicate row. Returns the entry's id.
    fn add(&mut self, content: &str) -> Result<Option<u64>>;

    /// Most recent entries, newest first.
    fn recent(&self, limit: usize, favorites_only: bool) -> Result<Vec<Snippet>>;

    fn find_by_id(&self, id: u64) -> Result<Option<Snippet>>;

    /// Substring search over content, newest first.
    fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Snippet>>;

    /// Flip an entry's favorite flag. Returns the new state.
    fn toggle_favorite(&mut self, id: u64) -> Result<bool>;

    /// Returns whether anything was deleted.
    fn delete(&mut self, id: u64) -> Result<bool>;

    /// Drop history entries, optionally sparing favorites. Returns how many
    /// entries were removed.
    fn clear(&mut self, keep_favorites: bool) -> Result<usize>;
}

/// File-based store: the whole history lives in one JSON file, rewritten
/// on every mutation. Clipboard history is small (tens of entries), so the
/// full rewrite is cheaper than it looks.
pub struct FileStore {
    path: PathBuf,
    max_entries: usize,
    entries: Vec<Snippet>,
    next_id: u64,
}

impl FileStore {
    pub fn new(path: &Path, max_entries: usize) -> Result<Self> {
        let entries: Vec<Snippet> = if path.exists() {
            let json = fs::read_to_string(path)?;
            serde_json::from_str(&json)
                .map_err(|e| anyhow!("Failed to read history file {}: {}", path.display(), e))?
        } else {
            Vec::new()
        };

        let next_id = entries.iter().map(|s| s.id).max().unwrap_or(0) + 1;

        Ok(Self {
            path: path.to_path_buf(),
            max_entries,
            entries,
            next_id,
        })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| anyhow!("Failed to serialize history: {}", e))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Drop oldest non-favorite entries until capacity holds. Favorites are
    /// never trimmed.
    fn enforce_capacity(&mut self) {
        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.favorite)
                .min_by_key(|(_, s)| s.created_at)
                .map(|(i, _)| i);
            match oldest {
                Some(index) => {
                    self.entries.remove(index);
                }
                None => break, // every entry is a favorite
            }
        }
    }

    fn sorted_desc(&self) -> Vec<Snippet> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries
    }
}

impl SnippetStore for FileStore {
    fn add(&mut self, content: &str) -> Result<Option<u64>> {
        if content.trim().is_empty() {
            return Ok(None);
        }

        let hash = content_hash(content);

        if let Some(existing) = self.entries.iter_mut().find(|s| s.content_hash == hash) {
            existing.created_at = Utc::now();
            let id = existing.id;
            self.persist()?;
            return Ok(Some(id));
        }

        let snippet = Snippet {
            id: self.next_id,
            content: content.to_string(),
            content_hash: hash,
            created_at: Utc::now(),
            char_count: content.chars().count(),
            word_count: word_count(content),
            favorite: false,
        };
        self.next_id += 1;
        self.entries.push(snippet);
        self.enforce_capacity();
        self.persist()?;
        Ok(Some(self.next_id - 1))
    }

    fn recent(&self, limit: usize, favorites_only: bool) -> Result<Vec<Snippet>> {
        Ok(self
            .sorted_desc()
            .into_iter()
            .filter(|s| !favorites_only || s.favorite)
            .take(limit)
            .collect())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Snippet>> {
        Ok(self.entries.iter().find(|s| s.id == id).cloned())
    }

    fn search(&self, keyword: &str, limit: usize) -> Result<Vec<Snippet>> {
        Ok(self
            .sorted_desc()
            .into_iter()
            .filter(|s| s.content.contains(keyword))
            .take(limit)
            .collect())
    }

    fn toggle_favorite(&mut self, id: u64) -> Result<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow!("No history entry with id {}", id))?;
        entry.favorite = !entry.favorite;
        let state = entry.favorite;
        self.persist()?;
        Ok(state)
    }

    fn delete(&mut self, id: u64) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    fn clear(&mut self, keep_favorites: bool) -> Result<usize> {
        let before = self.entries.len();
        if keep_favorites {
            self.entries.retain(|s| s.favorite);
        } else {
            self.entries.clear();
        }
        let removed = before - self.entries.len();
        self.persist()?;
        Ok(removed)
    }
}

/// No-op store for callers that run with history disabled.
#[derive(Debug, Default)]
pub struct NoOpStore;

impl NoOpStore {
    pub fn new() -> Self {
        Self
    }
}

impl SnippetStore for NoOpStore {
    fn add(&mut self, _content: &str) -> Result<Option<u64>> {
        Ok(None)
    }

    fn recent(&self, _limit: usize, _favorites_only: bool) -> Result<Vec<Snippet>> {
        Ok(Vec::new())
    }

    fn find_by_id(&self, _id: u64) -> Result<Option<Snippet>> {
        Ok(None)
    }

    fn search(&self, _keyword: &str, _limit: usize) -> Result<Vec<Snippet>> {
        Ok(Vec::new())
    }

    fn toggle_favorite(&mut self, id: u64) -> Result<bool> {
        Err(anyhow!("No history entry with id {}", id))
    }

    fn delete(&mut self, _id: u64) -> Result<bool> {
        Ok(false)
    }

    fn clear(&mut self, _keep_favorites: bool) -> Result<usize> {
        Ok(0)
    }
}

/// Sha256 hex digest of snippet content.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(max: usize) -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(&dir.path().join("history.json"), max).unwrap();
        (dir, store)
    }

    #[test]
    fn test_content_hash_consistency() {
        let hash1 = content_hash("clipboard text");
        let hash2 = content_hash("clipboard text");
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, content_hash("other text"));
    }

    #[test]
    fn test_add_ignores_blank_content() {
        let (_dir, mut store) = temp_store(50);
        assert_eq!(store.add("").unwrap(), None);
        assert_eq!(store.add("   \n  ").unwrap(), None);
        assert!(store.recent(10, false).unwrap().is_empty());
    }

    #[test]
    fn test_add_dedupes_on_content() {
        let (_dir, mut store) = temp_store(50);
        let first = store.add("hello").unwrap().unwrap();
        store.add("world").unwrap();
        let again = store.add("hello").unwrap().unwrap();

        assert_eq!(first, again);
        let recent = store.recent(10, false).unwrap();
        assert_eq!(recent.len(), 2);
        // Re-adding refreshed the timestamp, so "hello" is newest again
        assert_eq!(recent[0].content, "hello");
    }

    #[test]
    fn test_capacity_trims_oldest_non_favorites() {
        let (_dir, mut store) = temp_store(3);
        let first = store.add("one").unwrap().unwrap();
        store.toggle_favorite(first).unwrap();
        store.add("two").unwrap();
        store.add("three").unwrap();
        store.add("four").unwrap();

        let recent = store.recent(10, false).unwrap();
        assert_eq!(recent.len(), 3);
        // "two" was the oldest non-favorite
        assert!(recent.iter().all(|s| s.content != "two"));
        assert!(recent.iter().any(|s| s.content == "one"));
    }

    #[test]
    fn test_search_and_favorites() {
        let (_dir, mut store) = temp_store(50);
        store.add("alpha beta").unwrap();
        let id = store.add("beta gamma").unwrap().unwrap();
        store.add("delta").unwrap();

        let hits = store.search("beta", 10).unwrap();
        assert_eq!(hits.len(), 2);

        assert!(store.toggle_favorite(id).unwrap());
        let favorites = store.recent(10, true).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].content, "beta gamma");
    }

    #[test]
    fn test_clear_keeps_favorites() {
        let (_dir, mut store) = temp_store(50);
        let id = store.add("keep me").unwrap().unwrap();
        store.toggle_favorite(id).unwrap();
        store.add("drop me").unwrap();

        let removed = store.clear(true).unwrap();
        assert_eq!(removed, 1);
        let remaining = store.recent(10, false).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].content, "keep me");
    }

    #[test]
    fn test_noop_store_records_nothing() {
        let mut store = NoOpStore::new();
        assert_eq!(store.add("anything").unwrap(), None);
        assert!(store.recent(10, false).unwrap().is_empty());
        assert!(store.search("any", 10).unwrap().is_empty());
        assert!(!store.delete(1).unwrap());
        assert!(store.toggle_favorite(1).is_err());
    }

    #[test]
    fn test_store_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let id = {
            let mut store = FileStore::new(&path, 50).unwrap();
            store.add("persisted").unwrap().unwrap()
        };

        let store = FileStore::new(&path, 50).unwrap();
        let found = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.content, "persisted");
        assert_eq!(found.word_count, 1);

        // Ids keep increasing after reload
        let mut store = store;
        let next = store.add("new entry").unwrap().unwrap();
        assert!(next > id);
    }
}
