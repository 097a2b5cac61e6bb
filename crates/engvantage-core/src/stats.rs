//! Durable persistence for the user-progress record.
//!
//! An explicit repository over a single JSON file. Loading is infallible:
//! absent or malformed data yields the default record, and records written
//! by older versions load with missing fields back-filled via the serde
//! defaults on `UserStats`. Saving rewrites the whole record atomically.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::model::UserStats;

const STATS_FILE: &str = "stats.json";

/// Repository for the persisted `UserStats` record.
pub struct StatsStore {
    base_dir: PathBuf,
}

impl StatsStore {
    /// Open the store at the platform data directory
    /// (`<data_dir>/engvantage/stats.json`).
    pub fn open() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("engvantage");
        Self::with_base_dir(base_dir)
    }

    /// Open the store at an explicit directory. Used by tests.
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create stats dir: {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(STATS_FILE)
    }

    /// Load the stats record, falling back to the default on absence or
    /// corruption. Never an error.
    pub fn load(&self) -> UserStats {
        let path = self.file_path();
        if !path.exists() {
            return UserStats::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "malformed stats record, using defaults");
                UserStats::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read stats record, using defaults");
                UserStats::default()
            }
        }
    }

    /// Overwrite the stored record with the current in-memory value.
    ///
    /// Writes to a temp file and renames into place so a crash mid-write
    /// never leaves a truncated record.
    pub fn save(&self, stats: &UserStats) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(stats)?;
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;

        debug!(path = %path.display(), "stats saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StudentLevel, TargetLanguage};
    use tempfile::TempDir;

    fn store() -> (TempDir, StatsStore) {
        let dir = TempDir::new().unwrap();
        let store = StatsStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_loads_default() {
        let (_dir, store) = store();
        assert_eq!(store.load(), UserStats::default());
    }

    #[test]
    fn malformed_record_loads_default() {
        let (dir, store) = store();
        fs::write(dir.path().join(STATS_FILE), "not json at all {").unwrap();
        assert_eq!(store.load(), UserStats::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let mut stats = UserStats::default();
        stats.total_words_learned = 12;
        stats.current_streak = 4;
        stats.last_study_date = "2024-03-02".into();
        stats.level = StudentLevel::SeniorHigh;
        stats.target_language = TargetLanguage::Japanese;

        store.save(&stats).unwrap();
        assert_eq!(store.load(), stats);
    }

    #[test]
    fn legacy_record_on_disk_backfills_language() {
        let (dir, store) = store();
        fs::write(
            dir.path().join(STATS_FILE),
            r#"{"totalWordsLearned": 3, "currentStreak": 1, "lastStudyDate": "2024-01-05", "level": "Junior High"}"#,
        )
        .unwrap();

        let stats = store.load();
        assert_eq!(stats.total_words_learned, 3);
        assert_eq!(stats.target_language, TargetLanguage::TraditionalChinese);
    }

    #[test]
    fn save_leaves_no_tmp_file() {
        let (dir, store) = store();
        store.save(&UserStats::default()).unwrap();
        assert!(dir.path().join(STATS_FILE).exists());
        assert!(!dir.path().join("stats.tmp").exists());
    }
}
