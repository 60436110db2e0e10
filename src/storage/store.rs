use crate::storage::error::StoreError;
use crate::storage::problem::Problem;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Key under which the whole problem list lives.
pub const PROBLEMS_KEY: &str = "problems";

/// An opaque string-to-string medium. Writes to a single key replace the
/// previous value as a whole.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.key_path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process medium. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Serializes the problem list to and from the medium. Holds no cached state.
pub struct ProblemStore<S> {
    medium: S,
}

impl<S: KeyValueStore> ProblemStore<S> {
    pub fn new(medium: S) -> Self {
        ProblemStore { medium }
    }

    pub fn medium(&self) -> &S {
        &self.medium
    }

    pub fn load(&self) -> Result<Vec<Problem>, StoreError> {
        let Some(raw) = self.medium.get(PROBLEMS_KEY)? else {
            return Ok(Vec::new());
        };

        let problems: Vec<Problem> = serde_json::from_str(&raw).map_err(|source| {
            log::warn!("stored problem list is corrupt: {}", source);
            StoreError::Corrupt {
                key: PROBLEMS_KEY.to_string(),
                source,
            }
        })?;
        log::debug!("loaded {} problems", problems.len());
        Ok(problems)
    }

    pub fn save(&self, problems: &[Problem]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(problems).map_err(StoreError::Encode)?;
        self.medium.set(PROBLEMS_KEY, &raw)?;
        log::debug!("saved {} problems", problems.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn problem(id: &str, difficulty: &str) -> Problem {
        Problem {
            id: id.to_string(),
            title: format!("title {}", id),
            topic: "Arrays".to_string(),
            difficulty: difficulty.to_string(),
            code: "fn main() {\n\tprintln!(\"hi\");\n}\n".to_string(),
            date: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn load_of_missing_key_is_empty() {
        let store = ProblemStore::new(MemoryStore::new());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_of_loaded_list_leaves_content_unchanged() {
        let store = ProblemStore::new(MemoryStore::new());
        store
            .save(&[problem("1", "Easy"), problem("2", "Hard")])
            .unwrap();
        let before = store.medium().get(PROBLEMS_KEY).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();

        assert_eq!(store.medium().get(PROBLEMS_KEY).unwrap(), before);
    }

    #[test]
    fn corrupt_value_is_reported() {
        let medium = MemoryStore::new();
        medium.set(PROBLEMS_KEY, "{not json").unwrap();
        let store = ProblemStore::new(medium);

        match store.load() {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, PROBLEMS_KEY),
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn record_missing_a_field_is_corrupt() {
        let medium = MemoryStore::new();
        medium.set(PROBLEMS_KEY, r#"[{"id":"1","title":"t"}]"#).unwrap();
        let store = ProblemStore::new(medium);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let store = ProblemStore::new(FileStore::new(dir.path().join("nested")));
        assert!(store.load().unwrap().is_empty());

        let problems = vec![problem("1", "Easy")];
        store.save(&problems).unwrap();

        assert!(dir.path().join("nested").join("problems.json").exists());
        assert_eq!(store.load().unwrap(), problems);
    }

    #[test]
    fn file_store_set_replaces_whole_value() {
        let dir = tempdir().unwrap();
        let medium = FileStore::new(dir.path());
        medium.set("problems", "a much longer first value").unwrap();
        medium.set("problems", "[]").unwrap();

        assert_eq!(medium.get("problems").unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join(".problems.json.tmp").exists());
    }

    #[test]
    fn concurrent_read_modify_write_keeps_last_writer() {
        // Two instances sharing one medium, each doing load -> mutate -> save.
        let tab_a = ProblemStore::new(MemoryStore::new());
        let tab_b = ProblemStore::new(tab_a.medium().clone());

        let mut seen_by_a = tab_a.load().unwrap();
        let mut seen_by_b = tab_b.load().unwrap();

        seen_by_a.push(problem("a", "Easy"));
        tab_a.save(&seen_by_a).unwrap();

        seen_by_b.push(problem("b", "Hard"));
        tab_b.save(&seen_by_b).unwrap();

        let ids: Vec<String> = tab_a.load().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }
}
