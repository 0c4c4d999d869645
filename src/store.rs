//! JSON save file with rolling backups, import/export and reset

use crate::constants::{BACKUP_DIR, SAVE_FILE, SAVE_FORMAT_VERSION};
use crate::engine::SaveState;
use crate::error::{StoreError, StoreResult};
use crate::utils::version_greater_than;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BACKUP_PREFIX: &str = "backup_";
const PRE_RESET_PREFIX: &str = "pre_reset_backup_";
/// Length of `%Y%m%d_%H%M%S`
const STAMP_LEN: usize = 15;
const IMPORT_REQUIRED_KEYS: [&str; 4] = ["user_data", "tasks", "exported_at", "version"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub pre_reset: bool,
}

impl BackupInfo {
    /// `(timestamp, counter)` from `<prefix><stamp>[_<counter>].json`.
    /// The bare name is the first backup of its second.
    fn sort_key(&self) -> (&str, u32) {
        let rest = self
            .name
            .strip_prefix(PRE_RESET_PREFIX)
            .or_else(|| self.name.strip_prefix(BACKUP_PREFIX))
            .unwrap_or(&self.name);
        let rest = rest.strip_suffix(".json").unwrap_or(rest);
        match (rest.get(..STAMP_LEN), rest.get(STAMP_LEN..)) {
            (Some(stamp), Some(tail)) => {
                let counter = tail
                    .strip_prefix('_')
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                (stamp, counter)
            }
            _ => (rest, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Main,
    /// Main file was missing or unreadable; carries the backup file name
    Backup(String),
    Fresh,
}

pub struct DataStore {
    data_dir: PathBuf,
    backup_dir: PathBuf,
    save_path: PathBuf,
    max_backups: usize,
}

impl DataStore {
    pub fn open(data_dir: &Path, max_backups: usize) -> StoreResult<Self> {
        let backup_dir = data_dir.join(BACKUP_DIR);
        fs::create_dir_all(&backup_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            save_path: data_dir.join(SAVE_FILE),
            backup_dir,
            max_backups: max_backups.max(1),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn set_max_backups(&mut self, max: usize) {
        self.max_backups = max.max(1);
    }

    /// Write the main file plus a timestamped backup, then prune old backups.
    /// Returns the backup path.
    pub fn save(&self, state: &SaveState, now: NaiveDateTime) -> StoreResult<PathBuf> {
        let mut state = state.clone();
        state.saved_at = now;
        state.exported_at = None;

        write_json(&self.save_path, &state)?;
        let backup = self.next_backup_path(BACKUP_PREFIX, now)?;
        write_json(&backup, &state)?;
        let removed = self.prune_backups()?;
        debug!(backup = %backup.display(), removed, "state saved");
        Ok(backup)
    }

    /// Main file, then the newest backup, then a fresh state
    pub fn load(&self, now: NaiveDateTime) -> (SaveState, LoadSource) {
        if self.save_path.exists() {
            match read_state(&self.save_path) {
                Ok(state) => return (state, LoadSource::Main),
                Err(e) => warn!(error = %e, "main save file unreadable, trying backups"),
            }
        }

        let backups = self.list_backups().unwrap_or_else(|e| {
            warn!(error = %e, "could not list backups");
            Vec::new()
        });
        for backup in backups.iter().filter(|b| !b.pre_reset) {
            match read_state(&backup.path) {
                Ok(state) => {
                    warn!(backup = %backup.name, "loaded state from backup");
                    return (state, LoadSource::Backup(backup.name.clone()));
                }
                Err(e) => warn!(backup = %backup.name, error = %e, "backup unreadable"),
            }
        }

        info!("no save found, starting fresh");
        (SaveState::new(now), LoadSource::Fresh)
    }

    /// Backups newest first
    pub fn list_backups(&self) -> StoreResult<Vec<BackupInfo>> {
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".json") {
                continue;
            }
            let pre_reset = name.starts_with(PRE_RESET_PREFIX);
            if !pre_reset && !name.starts_with(BACKUP_PREFIX) {
                continue;
            }
            backups.push(BackupInfo {
                path: entry.path(),
                name,
                pre_reset,
            });
        }
        backups.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()).then_with(|| b.name.cmp(&a.name)));
        Ok(backups)
    }

    fn prune_backups(&self) -> StoreResult<usize> {
        let regular: Vec<_> = self
            .list_backups()?
            .into_iter()
            .filter(|b| !b.pre_reset)
            .collect();
        let mut removed = 0;
        for old in regular.iter().skip(self.max_backups) {
            fs::remove_file(&old.path)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Same-second backups get a counter past the highest one on disk, so a
    /// pruned name is never reused for a newer backup.
    fn next_backup_path(&self, prefix: &str, now: NaiveDateTime) -> StoreResult<PathBuf> {
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        let pre_reset = prefix == PRE_RESET_PREFIX;
        let taken = self
            .list_backups()?
            .iter()
            .filter(|b| b.pre_reset == pre_reset)
            .filter_map(|b| {
                let (s, counter) = b.sort_key();
                (s == stamp).then_some(counter)
            })
            .max();
        let name = match taken {
            None => format!("{prefix}{stamp}.json"),
            Some(counter) => format!("{prefix}{stamp}_{}.json", counter + 1),
        };
        Ok(self.backup_dir.join(name))
    }

    /// Portable copy of the state stamped with `exported_at`
    pub fn export(state: &SaveState, now: NaiveDateTime) -> SaveState {
        let mut export = state.clone();
        export.saved_at = now;
        export.exported_at = Some(now);
        export
    }

    pub fn export_to(&self, path: &Path, state: &SaveState, now: NaiveDateTime) -> StoreResult<()> {
        write_json(path, &Self::export(state, now))?;
        info!(path = %path.display(), "progress exported");
        Ok(())
    }

    /// Validate an exported document
    pub fn parse_import(json: &str) -> StoreResult<SaveState> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| StoreError::InvalidFormat("expected a JSON object".into()))?;
        if let Some(missing) = IMPORT_REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(StoreError::InvalidFormat(format!("missing key `{missing}`")));
        }
        let mut state: SaveState = serde_json::from_value(value)?;
        if version_greater_than(&state.version, SAVE_FORMAT_VERSION) {
            return Err(StoreError::InvalidFormat(format!(
                "written by a newer version ({})",
                state.version
            )));
        }
        state.exported_at = None;
        state.normalize();
        Ok(state)
    }

    /// Back up `current`, then replace it with the file's contents
    pub fn import_from(
        &self,
        path: &Path,
        current: &SaveState,
        now: NaiveDateTime,
    ) -> StoreResult<SaveState> {
        let state = Self::parse_import(&fs::read_to_string(path)?)?;
        self.save(current, now)?;
        self.save(&state, now)?;
        info!(path = %path.display(), "progress imported");
        Ok(state)
    }

    /// Write a pre-reset backup and start over
    pub fn reset(&self, current: &SaveState, now: NaiveDateTime) -> StoreResult<SaveState> {
        let backup = self.next_backup_path(PRE_RESET_PREFIX, now)?;
        write_json(&backup, &Self::export(current, now))?;
        let fresh = SaveState::new(now);
        self.save(&fresh, now)?;
        info!(backup = %backup.display(), "progress reset");
        Ok(fresh)
    }

    /// Backups are trusted documents and skip the export checks.
    pub fn restore_backup(
        &self,
        name: &str,
        current: &SaveState,
        now: NaiveDateTime,
    ) -> StoreResult<SaveState> {
        let backup = self
            .list_backups()?
            .into_iter()
            .find(|b| b.name == name)
            .ok_or_else(|| StoreError::InvalidFormat(format!("no backup named `{name}`")))?;
        let mut state = read_state(&backup.path)?;
        state.exported_at = None;
        self.save(current, now)?;
        self.save(&state, now)?;
        info!(backup = %name, "backup restored");
        Ok(state)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_state(path: &Path) -> StoreResult<SaveState> {
    let text = fs::read_to_string(path)?;
    let mut state: SaveState = serde_json::from_str(&text)?;
    state.normalize();
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::at;
    use crate::types::Attribute;
    use chrono::Duration;
    use tempfile::tempdir;

    fn state_with_health(points: f64) -> SaveState {
        let mut state = SaveState::new(at(2024, 5, 10, 9));
        state.user_data.attributes.set(Attribute::Health, points);
        state
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let now = at(2024, 5, 10, 9);
        let backup = store.save(&state_with_health(7.0), now).unwrap();
        assert!(backup.ends_with("backup_20240510_090000.json"));

        let (state, source) = store.load(now);
        assert_eq!(source, LoadSource::Main);
        assert_eq!(state.user_data.attributes.get(Attribute::Health), 7.0);
        assert_eq!(state.saved_at, now);
    }

    #[test]
    fn test_missing_files_start_fresh() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let (state, source) = store.load(at(2024, 5, 10, 9));
        assert_eq!(source, LoadSource::Fresh);
        assert_eq!(state.user_data.attributes.total(), 0.0);
    }

    #[test]
    fn test_corrupt_main_falls_back_to_newest_backup() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let now = at(2024, 5, 10, 9);
        store.save(&state_with_health(1.0), now).unwrap();
        store.save(&state_with_health(2.0), now + Duration::hours(1)).unwrap();
        fs::write(dir.path().join(SAVE_FILE), "{ not json").unwrap();

        let (state, source) = store.load(now);
        assert_eq!(source, LoadSource::Backup("backup_20240510_100000.json".into()));
        assert_eq!(state.user_data.attributes.get(Attribute::Health), 2.0);
    }

    #[test]
    fn test_backups_are_pruned() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let start = at(2024, 5, 10, 9);
        for i in 0..13 {
            store.save(&state_with_health(i as f64), start + Duration::minutes(i)).unwrap();
        }
        let backups = store.list_backups().unwrap();
        assert_eq!(backups.len(), 10);
        assert_eq!(backups[0].name, "backup_20240510_091200.json");
        assert_eq!(backups[9].name, "backup_20240510_090300.json");
    }

    #[test]
    fn test_same_second_saves_get_distinct_backups() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let now = at(2024, 5, 10, 9);
        store.save(&state_with_health(1.0), now).unwrap();
        let second = store.save(&state_with_health(2.0), now).unwrap();
        assert!(second.ends_with("backup_20240510_090000_1.json"));
        assert_eq!(store.list_backups().unwrap()[0].path, second);
    }

    #[test]
    fn test_many_same_second_saves_prune_oldest() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let now = at(2024, 5, 10, 9);
        let last = (0..12)
            .map(|i| store.save(&state_with_health(i as f64), now).unwrap())
            .last()
            .unwrap();
        assert!(last.ends_with("backup_20240510_090000_11.json"));

        let backups = store.list_backups().unwrap();
        assert_eq!(backups.len(), 10);
        assert_eq!(backups[0].path, last);
        assert_eq!(backups[1].name, "backup_20240510_090000_10.json");
        assert_eq!(backups[9].name, "backup_20240510_090000_2.json");

        // The pruned bare name is not handed out again
        let next = store.save(&state_with_health(12.0), now).unwrap();
        assert!(next.ends_with("backup_20240510_090000_12.json"));
        assert_eq!(store.list_backups().unwrap()[0].path, next);
    }

    #[test]
    fn test_import_requires_export_keys() {
        let plain = serde_json::to_string(&state_with_health(3.0)).unwrap();
        assert!(matches!(
            DataStore::parse_import(&plain),
            Err(StoreError::InvalidFormat(_))
        ));
        assert!(matches!(DataStore::parse_import("[]"), Err(StoreError::InvalidFormat(_))));

        let now = at(2024, 5, 11, 9);
        let exported = serde_json::to_string(&DataStore::export(&state_with_health(3.0), now)).unwrap();
        let state = DataStore::parse_import(&exported).unwrap();
        assert_eq!(state.user_data.attributes.get(Attribute::Health), 3.0);
        assert_eq!(state.exported_at, None);

        let mut newer = DataStore::export(&state_with_health(3.0), now);
        newer.version = "2.0".into();
        let newer = serde_json::to_string(&newer).unwrap();
        assert!(matches!(
            DataStore::parse_import(&newer),
            Err(StoreError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_import_through_files() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let now = at(2024, 5, 10, 9);
        let file = dir.path().join("export.json");
        store.export_to(&file, &state_with_health(9.0), now).unwrap();

        let imported = store
            .import_from(&file, &state_with_health(1.0), now + Duration::hours(1))
            .unwrap();
        assert_eq!(imported.user_data.attributes.get(Attribute::Health), 9.0);
        // previous state backed up, then the imported one
        assert_eq!(store.list_backups().unwrap().len(), 2);
        let (loaded, _) = store.load(now);
        assert_eq!(loaded.user_data.attributes.get(Attribute::Health), 9.0);
    }

    #[test]
    fn test_reset_keeps_pre_reset_backup() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 1).unwrap();
        let now = at(2024, 5, 10, 9);
        let fresh = store.reset(&state_with_health(5.0), now).unwrap();
        assert_eq!(fresh.user_data.attributes.total(), 0.0);

        store.save(&fresh, now + Duration::minutes(1)).unwrap();
        let backups = store.list_backups().unwrap();
        let pre_reset: Vec<_> = backups.iter().filter(|b| b.pre_reset).collect();
        assert_eq!(pre_reset.len(), 1);
        assert_eq!(backups.iter().filter(|b| !b.pre_reset).count(), 1);
    }

    #[test]
    fn test_restore_backup_skips_export_check() {
        let dir = tempdir().unwrap();
        let store = DataStore::open(dir.path(), 10).unwrap();
        let now = at(2024, 5, 10, 9);
        let first = store.save(&state_with_health(4.0), now).unwrap();
        let name = first.file_name().unwrap().to_string_lossy().into_owned();

        let later = now + Duration::hours(2);
        let restored = store
            .restore_backup(&name, &state_with_health(8.0), later)
            .unwrap();
        assert_eq!(restored.user_data.attributes.get(Attribute::Health), 4.0);
        assert!(store.restore_backup("../settings.json", &restored, later).is_err());
    }
}
