use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{CompanionError, Result};
use crate::types::MoodRecord;

/// JSON array of [`MoodRecord`]s, rewritten as a whole on every append.
pub(crate) struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the new log is written to before it replaces the old one.
    fn tmp_path(&self) -> PathBuf {
        let tmp_name = format!(
            ".{}.tmp-{}",
            self.path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("mood_log.json"),
            std::process::id()
        );
        self.path
            .parent()
            .map(|p| p.join(&tmp_name))
            .unwrap_or_else(|| PathBuf::from(&tmp_name))
    }

    /// A missing file is an empty log. A file that does not parse is
    /// [`CompanionError::LogCorrupt`].
    pub(crate) fn read_all(&self) -> Result<Vec<MoodRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| CompanionError::LogCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Refuses to overwrite a corrupt log.
    pub(crate) fn append(&self, record: MoodRecord) -> Result<()> {
        let mut records = self.read_all()?;
        records.push(record);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, serde_json::to_string_pretty(&records)?)?;
        std::fs::rename(&tmp_path, &self.path)?;
        tracing::info!(path = ?self.path, total = records.len(), "mood record appended");
        Ok(())
    }

    /// The last `n` records, oldest first.
    pub(crate) fn recent(&self, n: usize) -> Result<Vec<MoodRecord>> {
        let mut records = self.read_all()?;
        let skip = records.len().saturating_sub(n);
        records.drain(..skip);
        Ok(records)
    }

    pub(crate) fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.read_all()?;
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["timestamp", "entry", "mood", "polarity"])?;
        for record in &records {
            let polarity = record.polarity.to_string();
            csv.write_record([
                record.timestamp.as_str(),
                record.text.as_str(),
                record.mood.as_str(),
                polarity.as_str(),
            ])?;
        }
        csv.flush()?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::types::Mood;

    fn record(text: &str, mood: Mood, polarity: f64) -> MoodRecord {
        MoodRecord {
            text: text.to_string(),
            mood,
            polarity,
            timestamp: "2024-04-01 09:30:00".to_string(),
        }
    }

    fn store(dir: &TempDir) -> LogStore {
        LogStore::new(dir.path().join("nested").join("mood_log.json"))
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).read_all().unwrap().is_empty());
    }

    #[test]
    fn append_then_read_preserves_fields() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(record("first", Mood::Neutral, 0.0)).unwrap();
        let last = MoodRecord::now("I feel terrible".to_string(), Mood::Negative, -0.88);
        store.append(last.clone()).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "first");
        assert_eq!(records.last(), Some(&last));
    }

    #[test]
    fn file_is_a_json_array_with_entry_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(record("sunny", Mood::Positive, 0.95)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["entry"], "sunny");
        assert_eq!(entries[0]["mood"], "Positive");
        assert_eq!(entries[0]["polarity"], 0.95);
    }

    #[test]
    fn corrupt_file_is_reported_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mood_log.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = LogStore::new(path.clone());

        assert!(matches!(store.read_all(), Err(CompanionError::LogCorrupt { .. })));
        assert!(matches!(
            store.append(record("x", Mood::Neutral, 0.0)),
            Err(CompanionError::LogCorrupt { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn recent_keeps_last_entries_in_order() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for i in 0..12 {
            store.append(record(&format!("entry {i}"), Mood::Neutral, 0.0)).unwrap();
        }
        let recent = store.recent(10).unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].text, "entry 2");
        assert_eq!(recent[9].text, "entry 11");
        assert_eq!(store.recent(50).unwrap().len(), 12);
        assert!(store.recent(0).unwrap().is_empty());
    }

    #[test]
    fn recent_reports_corrupt_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mood_log.json");
        std::fs::write(&path, "[{\"entry\": ").unwrap();
        assert!(matches!(
            LogStore::new(path).recent(10),
            Err(CompanionError::LogCorrupt { .. })
        ));
    }

    #[test]
    fn append_replaces_log_through_sibling_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(record("one", Mood::Neutral, 0.0)).unwrap();

        // a half-written sibling from an interrupted run must not affect the log
        std::fs::write(store.tmp_path(), "[{\"entry\": \"tru").unwrap();
        store.append(record("two", Mood::Positive, 0.8)).unwrap();

        assert!(!store.tmp_path().exists());
        let texts: Vec<_> = store.read_all().unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["one", "two"]);
        let names: Vec<_> = std::fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("mood_log.json")]);
    }

    #[test]
    fn csv_export_has_expected_columns() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(record("sunny, warm", Mood::Positive, 0.95)).unwrap();

        let mut out = Vec::new();
        assert_eq!(store.export_csv(&mut out).unwrap(), 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("timestamp,entry,mood,polarity"));
        assert_eq!(
            lines.next(),
            Some("2024-04-01 09:30:00,\"sunny, warm\",Positive,0.95")
        );
    }
}
