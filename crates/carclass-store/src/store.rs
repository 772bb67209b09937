//! SQLite-backed prediction record store.

use crate::error::{StoreError, StoreResult};
use crate::record::{NewPrediction, Prediction};
use crate::stats::{aggregate, Stats};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Table schema for prediction records.
///
/// `all_predictions` is a JSON-encoded object mapping label -> probability;
/// SQLite has no structured map column, so the encoding is part of the schema
/// contract. `created_at` is RFC 3339 UTC text.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS predictions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    image_path      TEXT NOT NULL,
    predicted_class TEXT NOT NULL,
    confidence      REAL NOT NULL,
    all_predictions TEXT NOT NULL,
    created_at      TEXT NOT NULL
)";

const SELECT_COLUMNS: &str =
    "id, image_path, predicted_class, confidence, all_predictions, created_at";

/// Store for prediction records.
///
/// Wraps a single SQLite connection behind a mutex: statement execution is
/// serialized, and id uniqueness under concurrent writers is the database's
/// AUTOINCREMENT guarantee. Each create/delete is a single-row implicit
/// transaction.
///
/// Cloning is cheap and shares the underlying connection.
#[derive(Clone)]
pub struct PredictionStore {
    conn: Arc<Mutex<Connection>>,
}

impl PredictionStore {
    /// Open (creating if necessary) a store at the given database path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        info!("Opening prediction store at {:?}", path);
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store. Used by tests and throwaway tooling.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new record, assigning its id and creation timestamp.
    pub fn create(&self, new: NewPrediction) -> StoreResult<Prediction> {
        let created_at = Utc::now();
        let distribution = serde_json::to_string(&new.all_predictions)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO predictions \
             (image_path, predicted_class, confidence, all_predictions, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.image_path,
                new.predicted_class,
                new.confidence,
                distribution,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Created prediction record {}", id);

        Ok(Prediction {
            id,
            image_path: new.image_path,
            predicted_class: new.predicted_class,
            confidence: new.confidence,
            all_predictions: new.all_predictions,
            created_at,
        })
    }

    /// Fetch a single record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has the given id.
    pub fn get(&self, id: i64) -> StoreResult<Prediction> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM predictions WHERE id = ?1"),
            params![id],
            row_to_prediction,
        )
        .optional()?
        .ok_or(StoreError::NotFound(id))
    }

    /// List records in insertion (ascending id) order.
    ///
    /// `offset` and `limit` bound the window; no upper bound is enforced on
    /// `limit` here.
    pub fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<Prediction>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM predictions ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], row_to_prediction)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Hard-delete a record by id. The stored image file is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has the given id.
    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM predictions WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!("Deleted prediction record {}", id);
        Ok(())
    }

    /// Return every record in insertion order.
    ///
    /// Unpaginated full scan; cost is O(n). Used by aggregation.
    pub fn scan_all(&self) -> StoreResult<Vec<Prediction>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM predictions ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_prediction)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Count all records.
    pub fn count(&self) -> StoreResult<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM predictions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Compute aggregate statistics over the full record set.
    pub fn stats(&self) -> StoreResult<Stats> {
        Ok(aggregate(&self.scan_all()?))
    }
}

impl std::fmt::Debug for PredictionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionStore").finish_non_exhaustive()
    }
}

fn row_to_prediction(row: &Row<'_>) -> rusqlite::Result<Prediction> {
    let distribution: String = row.get(4)?;
    let all_predictions: HashMap<String, f64> = serde_json::from_str(&distribution)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let created_at: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(Prediction {
        id: row.get(0)?,
        image_path: row.get(1)?,
        predicted_class: row.get(2)?,
        confidence: row.get(3)?,
        all_predictions,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_prediction(class: &str, confidence: f64) -> NewPrediction {
        let mut all_predictions = HashMap::new();
        all_predictions.insert(class.to_string(), confidence);
        all_predictions.insert("other".to_string(), 1.0 - confidence);
        NewPrediction {
            image_path: format!("uploads/{class}.png"),
            predicted_class: class.to_string(),
            confidence,
            all_predictions,
        }
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let store = PredictionStore::open_in_memory().unwrap();
        let created = store.create(new_prediction("Audi", 0.9)).unwrap();

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched, created);
        assert!(fetched.is_consistent());
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let store = PredictionStore::open_in_memory().unwrap();
        let err = store.get(99).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
    }

    #[test]
    fn test_ids_are_monotonic() {
        let store = PredictionStore::open_in_memory().unwrap();
        let a = store.create(new_prediction("Audi", 0.9)).unwrap();
        let b = store.create(new_prediction("Swift", 0.6)).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_list_windows_are_disjoint_and_ordered() {
        let store = PredictionStore::open_in_memory().unwrap();
        for i in 0..6 {
            store
                .create(new_prediction(&format!("class-{i}"), 0.5))
                .unwrap();
        }

        let first = store.list(0, 3).unwrap();
        let second = store.list(3, 3).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);

        // Concatenation reproduces the first 2N records in creation order.
        let all = store.list(0, 6).unwrap();
        let concatenated: Vec<_> = first.iter().chain(second.iter()).cloned().collect();
        assert_eq!(concatenated, all);

        let first_ids: Vec<_> = first.iter().map(|p| p.id).collect();
        let second_ids: Vec<_> = second.iter().map(|p| p.id).collect();
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    }

    #[test]
    fn test_list_offset_past_end_is_empty() {
        let store = PredictionStore::open_in_memory().unwrap();
        store.create(new_prediction("Audi", 0.9)).unwrap();
        assert!(store.list(5, 10).unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_record() {
        let store = PredictionStore::open_in_memory().unwrap();
        let created = store.create(new_prediction("Audi", 0.9)).unwrap();

        store.delete(created.id).unwrap();
        assert!(store.get(created.id).unwrap_err().is_not_found());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_leaves_store_unchanged() {
        let store = PredictionStore::open_in_memory().unwrap();
        store.create(new_prediction("Audi", 0.9)).unwrap();

        let err = store.delete(12345).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_scan_all_returns_insertion_order() {
        let store = PredictionStore::open_in_memory().unwrap();
        store.create(new_prediction("Audi", 0.9)).unwrap();
        store.create(new_prediction("Swift", 0.6)).unwrap();

        let all = store.scan_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].predicted_class, "Audi");
        assert_eq!(all[1].predicted_class, "Swift");
    }

    #[test]
    fn test_distribution_survives_roundtrip() {
        let store = PredictionStore::open_in_memory().unwrap();
        let mut all_predictions = HashMap::new();
        all_predictions.insert("Audi".to_string(), 0.55);
        all_predictions.insert("Swift".to_string(), 0.25);
        all_predictions.insert("Rolls Royce".to_string(), 0.20);

        let created = store
            .create(NewPrediction {
                image_path: "uploads/a.png".to_string(),
                predicted_class: "Audi".to_string(),
                confidence: 0.55,
                all_predictions: all_predictions.clone(),
            })
            .unwrap();

        let fetched = store.get(created.id).unwrap();
        assert_eq!(fetched.all_predictions, all_predictions);
    }
}
