use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Service settings, toggled through the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub internal_review_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            internal_review_enabled: false,
        }
    }
}

/// A single submitted review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub author: String,
    pub text: String,
    pub internal: bool,
    pub created_at: String,
}

/// Everything the service persists, serialized as one JSON document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreData {
    pub settings: Settings,
    pub reviews: Vec<Review>,
}

/// File-backed store for settings and reviews.
///
/// Every operation rewrites or rereads the whole file. The internal mutex
/// is the single global critical section: no two store operations overlap
/// their file access, and `update` keeps load-mutate-save atomic so review
/// ids computed from the current count cannot race.
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Load-then-save once so the file exists and is normalized before
    /// the server starts accepting requests.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let data = self.read_locked()?;
        self.write_locked(&data)
    }

    /// Read the current store contents, normalizing malformed data.
    pub fn load(&self) -> Result<StoreData> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_locked()
    }

    /// Overwrite the store file with the given contents.
    pub fn save(&self, data: &StoreData) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_locked(data)
    }

    /// Load, mutate, and save under one lock acquisition.
    pub fn update<T>(&self, f: impl FnOnce(&mut StoreData) -> T) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut data = self.read_locked()?;
        let out = f(&mut data);
        self.write_locked(&data)?;
        Ok(out)
    }

    fn read_locked(&self) -> Result<StoreData> {
        if !self.path.exists() {
            let data = StoreData::default();
            self.write_locked(&data)?;
            return Ok(data);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file {:?}", self.path))?;

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                // Corrupt file: self-heal by resetting to defaults
                warn!(path = ?self.path, %err, "Store file is not valid JSON, resetting");
                let data = StoreData::default();
                self.write_locked(&data)?;
                return Ok(data);
            }
        };

        Ok(normalize(value))
    }

    fn write_locked(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create store directory {parent:?}"))?;
            }
        }
        let raw = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write store file {:?}", self.path))
    }
}

/// Coerce any well-formed JSON document into a usable `StoreData`.
///
/// A non-object document falls back to defaults in memory only; within an
/// object, a non-object `settings` or non-array `reviews` is replaced, and
/// review entries that do not parse are dropped.
fn normalize(value: Value) -> StoreData {
    let Value::Object(mut map) = value else {
        return StoreData::default();
    };

    let settings = match map.remove("settings") {
        Some(Value::Object(settings)) => Settings {
            internal_review_enabled: settings
                .get("internal_review_enabled")
                .is_some_and(truthy),
        },
        _ => Settings::default(),
    };

    let reviews = match map.remove("reviews") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    };

    StoreData { settings, reviews }
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects
/// are false, everything else is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_none_or(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(entries) => !entries.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("data.json"))
    }

    fn sample_review(id: u64) -> Review {
        Review {
            id,
            author: "Alex".to_string(),
            text: "Great app".to_string(),
            internal: false,
            created_at: "2026-08-29T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let data = store.load().unwrap();
        assert_eq!(data, StoreData::default());
        assert!(dir.path().join("data.json").exists());
    }

    #[test]
    fn corrupt_file_is_reset_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "not json {{{").unwrap();

        let store = store_in(&dir);
        let data = store.load().unwrap();
        assert_eq!(data, StoreData::default());

        // The file itself was rewritten
        let raw = fs::read_to_string(&path).unwrap();
        let reloaded: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded["settings"]["internal_review_enabled"], json!(false));
        assert_eq!(reloaded["reviews"], json!([]));
    }

    #[test]
    fn non_object_document_defaults_without_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = store_in(&dir);
        let data = store.load().unwrap();
        assert_eq!(data, StoreData::default());

        // Valid JSON of the wrong shape is left on disk as-is
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn malformed_sections_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"settings": "nope", "reviews": 42}"#).unwrap();

        let data = store_in(&dir).load().unwrap();
        assert_eq!(data, StoreData::default());
    }

    #[test]
    fn stored_flag_is_coerced_to_bool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"settings": {"internal_review_enabled": 1}, "reviews": []}"#,
        )
        .unwrap();

        let data = store_in(&dir).load().unwrap();
        assert!(data.settings.internal_review_enabled);
    }

    #[test]
    fn unparseable_review_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let raw = json!({
            "settings": {"internal_review_enabled": false},
            "reviews": [sample_review(1), "garbage", {"id": 3}],
        });
        fs::write(&path, raw.to_string()).unwrap();

        let data = store_in(&dir).load().unwrap();
        assert_eq!(data.reviews, vec![sample_review(1)]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut data = StoreData::default();
        data.settings.internal_review_enabled = true;
        data.reviews.push(sample_review(1));
        store.save(&data).unwrap();

        let first = store.load().unwrap();
        assert_eq!(first, data);

        // Idempotence: saving what was loaded changes nothing observable
        store.save(&first).unwrap();
        assert_eq!(store.load().unwrap(), first);
    }

    #[test]
    fn update_keeps_id_assignment_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        for expected in 1..=3u64 {
            let id = store
                .update(|data| {
                    let id = data.reviews.len() as u64 + 1;
                    data.reviews.push(Review { id, ..sample_review(0) });
                    id
                })
                .unwrap();
            assert_eq!(id, expected);
        }

        let ids: Vec<u64> = store.load().unwrap().reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn truthiness_matches_loose_coercion() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(!truthy(&falsy), "{falsy} should be falsy");
        }
        for true_ish in [json!(true), json!(1), json!(-2.5), json!("yes"), json!([0]), json!({"a": 1})] {
            assert!(truthy(&true_ish), "{true_ish} should be truthy");
        }
    }
}
