use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

use super::error::CreateDataDirSnafu;
use super::error::DecodeSnafu;
use super::error::EncodeSnafu;
use super::error::QuotaExceededSnafu;
use super::error::ReadSnafu;
use super::error::StoreResult;
use super::error::WriteSnafu;

/// The four independently stored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKey {
    Messages,
    GeneratedTexts,
    Tasks,
    Habits,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 4] = [
        CollectionKey::Messages,
        CollectionKey::GeneratedTexts,
        CollectionKey::Tasks,
        CollectionKey::Habits,
    ];

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Messages => "ai-assistant-messages",
            Self::GeneratedTexts => "ai-assistant-texts",
            Self::Tasks => "ai-assistant-tasks",
            Self::Habits => "ai-assistant-habits",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::GeneratedTexts => "generated texts",
            Self::Tasks => "tasks",
            Self::Habits => "habits",
        }
    }
}

/// Raw keyed document storage behind a [`DurableStore`].
pub trait StorageMedium {
    fn read(&self, key: &'static str) -> StoreResult<Option<String>>;
    fn write(&self, key: &'static str, payload: &str) -> StoreResult<()>;
}

/// One `<key>.json` file per collection inside a data directory.
#[derive(Debug, Clone)]
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).context(CreateDataDirSnafu {
            path: root.display().to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageMedium for FileMedium {
    fn read(&self, key: &'static str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .context(ReadSnafu {
                key,
                path: path.display().to_string(),
            })
    }

    fn write(&self, key: &'static str, payload: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        write_private(&tmp, payload.as_bytes())
            .and_then(|()| std::fs::rename(&tmp, &path))
            .context(WriteSnafu {
                key,
                path: path.display().to_string(),
            })
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut opts = OpenOptions::new();
    opts.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

/// In-process storage with an optional total byte quota.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: RefCell<BTreeMap<&'static str, String>>,
    quota: Option<usize>,
    writes: RefCell<Vec<&'static str>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Keys in the order they were successfully written.
    pub fn write_log(&self) -> Vec<&'static str> {
        self.writes.borrow().clone()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &'static str, payload: impl Into<String>) {
        self.entries.borrow_mut().insert(key, payload.into());
    }
}

impl StorageMedium for MemoryMedium {
    fn read(&self, key: &'static str) -> StoreResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &'static str, payload: &str) -> StoreResult<()> {
        if let Some(quota) = self.quota {
            let others: usize = self
                .entries
                .borrow()
                .iter()
                .filter(|(k, _)| **k != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + payload.len();
            if needed > quota {
                return QuotaExceededSnafu { key, needed, quota }.fail();
            }
        }
        self.entries.borrow_mut().insert(key, payload.to_string());
        self.writes.borrow_mut().push(key);
        Ok(())
    }
}

/// Whole-collection load/save over a [`StorageMedium`].
#[derive(Debug)]
pub struct DurableStore<M> {
    medium: M,
}

impl<M: StorageMedium> DurableStore<M> {
    pub fn new(medium: M) -> Self {
        Self { medium }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// A key that was never written loads as an empty collection.
    pub fn load<T: DeserializeOwned>(&self, key: CollectionKey) -> StoreResult<Vec<T>> {
        let storage_key = key.storage_key();
        match self.medium.read(storage_key)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).context(DecodeSnafu { key: storage_key }),
        }
    }

    pub fn save<T: Serialize>(&self, key: CollectionKey, items: &[T]) -> StoreResult<()> {
        let storage_key = key.storage_key();
        let payload = serde_json::to_string(items).context(EncodeSnafu { key: storage_key })?;
        self.medium.write(storage_key, &payload)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::error::StoreError;
    use crate::state::GeneratedText;
    use crate::state::Habit;
    use crate::state::Message;
    use crate::state::Priority;
    use crate::state::RecordId;
    use crate::state::Role;
    use crate::state::Task;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("date")
    }

    fn messages() -> Vec<Message> {
        vec![
            Message {
                id: RecordId::from("1"),
                role: Role::User,
                content: "hello".to_string(),
                timestamp: 1_700_000_000_000,
                favorite: false,
            },
            Message {
                id: RecordId::from("2"),
                role: Role::Assistant,
                content: "hi there\nhow can I help?".to_string(),
                timestamp: 1_700_000_000_500,
                favorite: true,
            },
        ]
    }

    fn texts() -> Vec<GeneratedText> {
        vec![GeneratedText {
            id: RecordId::from("3"),
            prompt: "haiku about rust".to_string(),
            result: "borrowed, not owned".to_string(),
            timestamp: 1_700_000_001_000,
            favorite: false,
        }]
    }

    fn tasks() -> Vec<Task> {
        vec![Task {
            id: RecordId::from("4"),
            title: "Pay rent".to_string(),
            date: day("2024-03-01"),
            time: NaiveTime::from_hms_opt(18, 45, 0).expect("time"),
            completed: true,
            priority: Priority::High,
        }]
    }

    fn habits() -> Vec<Habit> {
        vec![Habit {
            id: RecordId::from("5"),
            name: "Read".to_string(),
            goal: "10 pages".to_string(),
            streak: 2,
            last_completed: Some(day("2024-01-02")),
            completed_dates: BTreeSet::from([day("2024-01-01"), day("2024-01-02")]),
        }]
    }

    #[test]
    fn never_written_key_loads_empty() {
        let store = DurableStore::new(MemoryMedium::new());
        let loaded: Vec<Task> = store.load(CollectionKey::Tasks).expect("load");
        assert!(loaded.is_empty());
    }

    #[test]
    fn every_collection_round_trips_through_files() {
        let dir = tempdir().expect("tmpdir");
        let store = DurableStore::new(FileMedium::open(dir.path().join("data")).expect("open"));

        store.save(CollectionKey::Messages, &messages()).expect("save");
        store.save(CollectionKey::GeneratedTexts, &texts()).expect("save");
        store.save(CollectionKey::Tasks, &tasks()).expect("save");
        store.save(CollectionKey::Habits, &habits()).expect("save");

        let reopened = DurableStore::new(FileMedium::open(dir.path().join("data")).expect("open"));
        let loaded: Vec<Message> = reopened.load(CollectionKey::Messages).expect("load");
        assert_eq!(loaded, messages());
        let loaded: Vec<GeneratedText> = reopened.load(CollectionKey::GeneratedTexts).expect("load");
        assert_eq!(loaded, texts());
        let loaded: Vec<Task> = reopened.load(CollectionKey::Tasks).expect("load");
        assert_eq!(loaded, tasks());
        let loaded: Vec<Habit> = reopened.load(CollectionKey::Habits).expect("load");
        assert_eq!(loaded, habits());
    }

    #[test]
    fn file_medium_uses_one_file_per_key() {
        let dir = tempdir().expect("tmpdir");
        let medium = FileMedium::open(dir.path()).expect("open");
        let store = DurableStore::new(medium.clone());
        store.save(CollectionKey::Habits, &habits()).expect("save");

        assert!(medium.path_for("ai-assistant-habits").exists());
        assert!(!medium.path_for("ai-assistant-tasks").exists());
        assert!(!dir.path().join(".ai-assistant-habits.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn files_are_private_to_the_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("tmpdir");
        let medium = FileMedium::open(dir.path()).expect("open");
        DurableStore::new(medium.clone())
            .save(CollectionKey::Tasks, &tasks())
            .expect("save");
        let mode = std::fs::metadata(medium.path_for("ai-assistant-tasks"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn later_save_replaces_whole_collection() {
        let store = DurableStore::new(MemoryMedium::new());
        store.save(CollectionKey::Tasks, &tasks()).expect("save");
        store.save::<Task>(CollectionKey::Tasks, &[]).expect("save");
        let loaded: Vec<Task> = store.load(CollectionKey::Tasks).expect("load");
        assert!(loaded.is_empty());
        assert_eq!(store.medium().raw("ai-assistant-tasks").as_deref(), Some("[]"));
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let store = DurableStore::new(MemoryMedium::with_quota(64));
        store.save::<Task>(CollectionKey::Tasks, &[]).expect("save");

        let err = store
            .save(CollectionKey::Messages, &messages())
            .expect_err("over quota");
        assert!(matches!(err, StoreError::QuotaExceeded { key: "ai-assistant-messages", .. }));
        assert_eq!(store.medium().raw("ai-assistant-messages"), None);
        assert_eq!(store.medium().write_log(), vec!["ai-assistant-tasks"]);
    }

    #[test]
    fn corrupt_document_is_a_decode_error() {
        let medium = MemoryMedium::new();
        medium.insert_raw("ai-assistant-habits", "{not json");
        let store = DurableStore::new(medium);
        let err = store
            .load::<Habit>(CollectionKey::Habits)
            .expect_err("corrupt");
        assert!(matches!(err, StoreError::Decode { key: "ai-assistant-habits", .. }));
    }

    #[test]
    fn reads_documents_in_the_web_client_layout() {
        let medium = MemoryMedium::new();
        medium.insert_raw(
            "ai-assistant-habits",
            r#"[{"id":"1704067200000","name":"Read","goal":"10 pages","streak":1,
                "lastCompleted":"2024-01-01","completedDates":["2024-01-01"]}]"#,
        );
        let store = DurableStore::new(medium);
        let loaded: Vec<Habit> = store.load(CollectionKey::Habits).expect("load");
        assert_eq!(loaded[0].last_completed, Some(day("2024-01-01")));
        assert_eq!(loaded[0].id.as_millis(), Some(1_704_067_200_000));
    }
}
