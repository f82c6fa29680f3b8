use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::generation::GenerationRecord;

/// SQLite-backed store for generation records.
pub struct PromptStore {
    conn: Mutex<Connection>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl PromptStore {
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        // Parse sqlite: prefix if present
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        // Create parent directories if needed
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                prompt_text TEXT NOT NULL,
                image_url TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_prompts_timestamp ON prompts(timestamp)",
            [],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!("Prompt store initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn insert(&self, record: &GenerationRecord) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO prompts (id, prompt_text, image_url, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.prompt_text,
                record.image_url,
                record.timestamp.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!("Stored prompt: {}", record.id);
        Ok(())
    }

    /// All records, newest first. Insertion order breaks timestamp ties.
    pub fn list(&self) -> Result<Vec<GenerationRecord>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, prompt_text, image_url, timestamp FROM prompts
                 ORDER BY timestamp DESC, rowid DESC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let records = stmt
            .query_map([], row_to_record)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<Option<GenerationRecord>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.query_row(
            "SELECT id, prompt_text, image_url, timestamp FROM prompts WHERE id = ?1",
            params![id],
            row_to_record,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Remove one record. Returns false when the id is unknown.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let deleted = tx
            .execute("DELETE FROM prompts WHERE id = ?1", params![id])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    /// Remove every record, returning the exact count removed.
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let deleted = tx
            .execute("DELETE FROM prompts", [])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(deleted)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<GenerationRecord> {
    let timestamp: String = row.get(3)?;
    Ok(GenerationRecord {
        id: row.get(0)?,
        prompt_text: row.get(1)?,
        image_url: row.get(2)?,
        timestamp: chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record_at(prompt: &str, offset_secs: i64) -> GenerationRecord {
        let mut record = GenerationRecord::new(
            prompt.to_string(),
            format!("static/{}.png", uuid::Uuid::new_v4().simple()),
        );
        record.timestamp = Utc::now() + Duration::seconds(offset_secs);
        record
    }

    #[test]
    fn test_insert_and_get() {
        let store = PromptStore::new(":memory:").unwrap();
        let record = record_at("a red bicycle", 0);

        store.insert(&record).unwrap();

        let fetched = store.get(&record.id).unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.prompt_text, "a red bicycle");
        assert_eq!(fetched.image_url, record.image_url);
    }

    #[test]
    fn test_get_unknown_id() {
        let store = PromptStore::new(":memory:").unwrap();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let store = PromptStore::new(":memory:").unwrap();
        store.insert(&record_at("oldest", -20)).unwrap();
        store.insert(&record_at("newest", 20)).unwrap();
        store.insert(&record_at("middle", 0)).unwrap();

        let prompts: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.prompt_text)
            .collect();
        assert_eq!(prompts, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_list_breaks_timestamp_ties_by_insertion() {
        let store = PromptStore::new(":memory:").unwrap();
        let now = Utc::now();
        for prompt in ["first", "second", "third"] {
            let mut record = record_at(prompt, 0);
            record.timestamp = now;
            store.insert(&record).unwrap();
        }

        let prompts: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.prompt_text)
            .collect();
        assert_eq!(prompts, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_delete() {
        let store = PromptStore::new(":memory:").unwrap();
        let record = record_at("to delete", 0);
        store.insert(&record).unwrap();

        assert!(store.delete(&record.id).unwrap());
        assert!(store.get(&record.id).unwrap().is_none());
        assert!(!store.delete(&record.id).unwrap());
    }

    #[test]
    fn test_delete_all_reports_count() {
        let store = PromptStore::new(":memory:").unwrap();
        for i in 0..3 {
            store.insert(&record_at("p", i)).unwrap();
        }

        assert_eq!(store.delete_all().unwrap(), 3);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.delete_all().unwrap(), 0);
    }
}
