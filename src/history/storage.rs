//! Translation history storage using SQLite.
//!
//! Every successful translation is appended with its language and timestamp;
//! the history viewer reads them back most recent first.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// One completed translation in the history.
#[derive(Debug, Clone)]
pub struct TranslationEntry {
    pub id: i64,
    /// Recognized source text
    pub original_text: String,
    /// Translated text
    pub translated_text: String,
    /// Target language code used
    pub target_lang: String,
    pub created_at: DateTime<Local>,
}

/// Manages the translation history database.
pub struct HistoryManager {
    database_path: PathBuf,
    /// Lazy-loaded connection
    connection: Option<Connection>,
}

impl HistoryManager {
    /// Creates a history manager storing its database under `data_dir`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            database_path: data_dir.join("translation_history.db"),
            connection: None,
        })
    }

    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS translations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    original_text TEXT NOT NULL,
                    translated_text TEXT NOT NULL,
                    target_lang TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Appends a completed translation.
    ///
    /// # Errors
    /// - If the database cannot be opened or the insert fails
    pub fn save_translation(
        &mut self,
        original_text: &str,
        translated_text: &str,
        target_lang: &str,
    ) -> Result<()> {
        let connection = self.get_connection()?;
        let timestamp = Local::now().to_rfc3339();

        connection.execute(
            "INSERT INTO translations (original_text, translated_text, target_lang, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![original_text, translated_text, target_lang, timestamp],
        )?;

        tracing::debug!("Translation saved to history");
        Ok(())
    }

    /// All translations, most recent first.
    ///
    /// # Errors
    /// - If the database cannot be opened or the query fails
    pub fn get_all_translations(&mut self) -> Result<Vec<TranslationEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, original_text, translated_text, target_lang, created_at
             FROM translations ORDER BY created_at DESC, id DESC",
        )?;

        let entries = statement
            .query_map([], |row| {
                let timestamp_str = row.get::<_, String>(4)?;
                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(TranslationEntry {
                    id: row.get(0)?,
                    original_text: row.get(1)?,
                    translated_text: row.get(2)?,
                    target_lang: row.get(3)?,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_translations_come_back_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = HistoryManager::new(dir.path()).unwrap();

        manager.save_translation("Hola", "Hello", "en").unwrap();
        manager
            .save_translation("Bonjour", "Good morning", "en")
            .unwrap();

        let entries = manager.get_all_translations().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].original_text, "Bonjour");
        assert_eq!(entries[1].translated_text, "Hello");
        assert_eq!(entries[0].target_lang, "en");
    }

    #[test]
    fn empty_history_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = HistoryManager::new(dir.path()).unwrap();
        assert!(manager.get_all_translations().unwrap().is_empty());
    }
}
