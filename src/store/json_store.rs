use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::bookmark::set::BookmarkSet;
use crate::store::schema::MasteryData;

const BOOKMARKS_FILE: &str = "bookmarks.json";
const MASTERY_FILE: &str = "mastery.json";

pub struct JsonStore {
    base_dir: PathBuf,
    // Serializes writers so two saves can never interleave on the same .tmp file.
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data directory {}", base_dir.display()))?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing, unreadable and unparsable files all yield `T::default()`.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            debug!(path = %path.display(), "no saved data yet");
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "ignoring unparsable data file");
                T::default()
            }),
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable data file");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.file_path(name);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(data)?;
        let written = (|| -> Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp_path, &path)?;
            Ok(())
        })();

        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written.with_context(|| format!("writing {}", path.display()))
    }

    pub fn load_bookmarks(&self) -> BookmarkSet {
        self.load(BOOKMARKS_FILE)
    }

    pub fn save_bookmarks(&self, bookmarks: &BookmarkSet) -> Result<()> {
        self.save(BOOKMARKS_FILE, bookmarks)?;
        debug!(count = bookmarks.len(), "saved bookmarks");
        Ok(())
    }

    /// A file from another schema version is discarded.
    pub fn load_mastery(&self) -> MasteryData {
        let data: MasteryData = self.load(MASTERY_FILE);
        if data.needs_reset() {
            warn!(
                found = data.schema_version,
                "mastery data has a stale schema version, starting fresh"
            );
            return MasteryData::default();
        }
        data
    }

    pub fn save_mastery(&self, data: &MasteryData) -> Result<()> {
        self.save(MASTERY_FILE, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::key::{Category, Selection, VerbSlice, encode};
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn greek_set() -> BookmarkSet {
        [
            Selection::table(Category::Noun, "First Declension (μουσα)"),
            Selection::verb(
                "Release (λύω)",
                &VerbSlice::new("Active", "Present", "Indicative"),
            ),
            Selection::table(Category::Pronoun, "Article (ὁ, ἡ, τό)"),
        ]
        .iter()
        .map(|s| encode(s).unwrap())
        .collect()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = make_test_store();
        assert!(store.load_bookmarks().is_empty());
    }

    #[test]
    fn test_bookmarks_round_trip_unicode() {
        let (_dir, store) = make_test_store();
        let set = greek_set();
        store.save_bookmarks(&set).unwrap();
        assert_eq!(store.load_bookmarks(), set);
    }

    #[test]
    fn test_file_is_plain_json_array() {
        let (_dir, store) = make_test_store();
        store.save_bookmarks(&greek_set()).unwrap();
        let raw = fs::read_to_string(store.file_path(BOOKMARKS_FILE)).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0], "Noun:First Declension (μουσα)");
        assert!(raw.contains("λύω"), "Greek is written unescaped");
    }

    #[test]
    fn test_corrupt_or_wrong_shape_loads_empty() {
        let (_dir, store) = make_test_store();
        for content in ["{not json", r#"{"a": 1}"#, "[1, 2, 3]", r#""Noun:a""#] {
            fs::write(store.file_path(BOOKMARKS_FILE), content).unwrap();
            assert!(store.load_bookmarks().is_empty(), "{content} should load empty");
        }
    }

    #[test]
    fn test_failed_save_leaves_previous_file_intact() {
        let (dir, store) = make_test_store();
        store.save_bookmarks(&greek_set()).unwrap();
        let before = fs::read_to_string(store.file_path(BOOKMARKS_FILE)).unwrap();

        let bad_store = JsonStore {
            base_dir: dir.path().join("missing_subdir"),
            write_lock: Mutex::new(()),
        };
        assert!(bad_store.save_bookmarks(&BookmarkSet::new()).is_err());

        let after = fs::read_to_string(store.file_path(BOOKMARKS_FILE)).unwrap();
        assert_eq!(before, after);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "no residual .tmp files");
    }

    #[test]
    fn test_stale_mastery_schema_resets() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(MASTERY_FILE),
            r#"{"schema_version": 99, "stats": {"tables": {}}}"#,
        )
        .unwrap();
        assert_eq!(store.load_mastery(), MasteryData::default());
    }

    #[test]
    fn test_concurrent_saves_never_tear_the_file() {
        let (_dir, store) = make_test_store();
        let store = std::sync::Arc::new(store);
        let candidates: Vec<BookmarkSet> = (0..8)
            .map(|i| {
                (0..=i)
                    .map(|j| encode(&Selection::table(Category::Noun, &format!("Table {i}-{j}"))).unwrap())
                    .collect()
            })
            .collect();

        let handles: Vec<_> = candidates
            .iter()
            .cloned()
            .map(|set| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        store.save_bookmarks(&set).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let raw = fs::read_to_string(store.file_path(BOOKMARKS_FILE)).unwrap();
        let on_disk: BookmarkSet = serde_json::from_str(&raw).unwrap();
        assert!(candidates.contains(&on_disk));
        assert!(!store.file_path("bookmarks.json.tmp").exists());
    }
}
