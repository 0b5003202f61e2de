//! Session record store for retry and replay.
//!
//! Keeps per-session metadata (recorded WAV, synthesized speech, target
//! language) as JSON files so a recording can be re-translated or its speech
//! replayed later. Only the 10 most recent sessions are kept; older ones are
//! pruned together with their audio files.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_RECORDS: usize = 10;

/// Metadata for one completed recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier for this session
    pub id: String,
    /// Path to the recorded WAV
    pub audio_path: PathBuf,
    /// Path to the synthesized speech, once a translation succeeded
    pub speech_path: Option<PathBuf>,
    /// Target language code the session used
    pub target_lang: String,
    /// When the recording was made
    pub created_at: DateTime<Local>,
}

impl SessionRecord {
    /// Creates a record for a fresh recording, stamped with the current time.
    /// The WAV path is derived from the generated session id.
    pub fn new(recordings_dir: &Path, target_lang: &str) -> Self {
        let now = Local::now();
        let id = now.timestamp_millis().to_string();
        Self {
            audio_path: recordings_dir.join(format!("{id}.wav")),
            id,
            speech_path: None,
            target_lang: target_lang.to_string(),
            created_at: now,
        }
    }
}

/// JSON-file store of recent session records.
pub struct SessionStore {
    store_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Result<Self> {
        let store_dir = data_dir.join("sessions");
        fs::create_dir_all(&store_dir)?;
        Ok(Self { store_dir })
    }

    /// Saves a new session record, pruning the oldest once the cap is hit.
    pub fn save(&self, record: &SessionRecord) -> Result<()> {
        self.prune()?;
        self.write(record)?;
        tracing::info!("Session record saved with ID: {}", record.id);
        Ok(())
    }

    /// Rewrites an existing record (e.g. to attach the speech path after the
    /// translation finished).
    pub fn update(&self, record: &SessionRecord) -> Result<()> {
        self.write(record)
    }

    fn write(&self, record: &SessionRecord) -> Result<()> {
        let path = self.store_dir.join(format!("{}.json", record.id));
        fs::write(path, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }

    /// All records, most recent first.
    pub fn all(&self) -> Result<Vec<SessionRecord>> {
        let mut records: Vec<SessionRecord> = fs::read_dir(&self.store_dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().map(|ext| ext == "json").unwrap_or(false) {
                    let content = fs::read_to_string(&path).ok()?;
                    serde_json::from_str(&content).ok()
                } else {
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> Result<Option<SessionRecord>> {
        Ok(self.all()?.into_iter().next())
    }

    /// Removes the oldest record (and its audio files) while at the cap.
    fn prune(&self) -> Result<()> {
        let mut records = self.all()?;
        while records.len() >= MAX_RECORDS {
            // all() sorts newest first
            let Some(oldest) = records.pop() else {
                break;
            };

            for audio in std::iter::once(&oldest.audio_path).chain(oldest.speech_path.iter()) {
                if audio.exists() {
                    if let Err(e) = fs::remove_file(audio) {
                        tracing::warn!("Failed to delete old session audio: {}", e);
                    }
                }
            }

            let metadata_path = self.store_dir.join(format!("{}.json", oldest.id));
            if let Err(e) = fs::remove_file(&metadata_path) {
                tracing::warn!("Failed to delete old session record: {}", e);
            } else {
                tracing::debug!("Pruned session record {}", oldest.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_at(id: &str, seconds_ago: i64) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            audio_path: PathBuf::from(format!("/nonexistent/{id}.wav")),
            speech_path: None,
            target_lang: "es".to_string(),
            created_at: Local::now() - Duration::seconds(seconds_ago),
        }
    }

    #[test]
    fn records_come_back_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        store.save(&record_at("older", 60)).unwrap();
        store.save(&record_at("newer", 10)).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "newer");
        assert_eq!(store.latest().unwrap().unwrap().id, "newer");
    }

    #[test]
    fn update_attaches_speech_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        let mut record = record_at("one", 10);
        store.save(&record).unwrap();

        record.speech_path = Some(PathBuf::from("/nonexistent/one.mp3"));
        store.update(&record).unwrap();

        let loaded = store.latest().unwrap().unwrap();
        assert!(loaded.speech_path.is_some());
    }

    #[test]
    fn prunes_oldest_beyond_cap() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path()).unwrap();

        for i in 0..MAX_RECORDS {
            store
                .save(&record_at(&format!("r{i}"), (MAX_RECORDS - i) as i64 * 10))
                .unwrap();
        }
        store.save(&record_at("latest", 1)).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), MAX_RECORDS);
        assert!(all.iter().all(|r| r.id != "r0"));
        assert_eq!(all[0].id, "latest");
    }
}
