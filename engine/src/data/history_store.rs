// Append-only local history of completed fraud checks, kept in SQLite.
use crate::error::{EngineError, EngineResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use shared::models::{HistoryItem, NewHistoryItem};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const SCHEMA_VERSION: i64 = 1;

const CREATE_SCHEMA: &str = "
    BEGIN;
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        checked_at INTEGER NOT NULL,
        amt REAL NOT NULL,
        is_fraud INTEGER NOT NULL,
        fraud_probability REAL,
        category TEXT,
        gender TEXT,
        transaction_time TEXT,
        transaction_day INTEGER,
        city TEXT,
        age INTEGER,
        risk_level TEXT
    );
    PRAGMA user_version = 1;
    COMMIT;
";

const SELECT_COLUMNS: &str = "id, checked_at, amt, is_fraud, fraud_probability, category, gender, \
     transaction_time, transaction_day, city, age, risk_level";

/// Handle on the history database.
///
/// The handle only remembers where the database lives. Every operation opens
/// its own connection and drops it before returning, whatever the outcome, so
/// no file handle outlives a call. Calls block; run them off any
/// latency-sensitive thread.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Opens (or creates) the database at `path` and makes sure the schema is
    /// at [`SCHEMA_VERSION`].
    pub fn open(path: impl Into<PathBuf>) -> EngineResult<Self> {
        let store = HistoryStore { path: path.into() };
        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = store.connect()?;
        ensure_schema(&conn)?;
        info!(path = %store.path.display(), "Opened history store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and returns the id the database assigned to it.
    pub fn insert(&self, item: &NewHistoryItem) -> EngineResult<i64> {
        validate_record(item)?;

        let id = self.write_record(item).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to record fraud check");
            e
        })?;

        info!(
            id,
            checked_at = item.checked_at,
            is_fraud = item.is_fraud,
            "Recorded fraud check"
        );
        Ok(id)
    }

    fn write_record(&self, item: &NewHistoryItem) -> EngineResult<i64> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO history (
                checked_at, amt, is_fraud, fraud_probability, category, gender,
                transaction_time, transaction_day, city, age, risk_level
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item.checked_at,
                item.amount,
                item.is_fraud,
                item.fraud_probability,
                item.category,
                item.gender,
                item.transaction_time,
                item.transaction_day,
                item.city,
                item.age,
                item.risk_level,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Every stored record, most recent `checked_at` first.
    pub fn list_descending(&self) -> EngineResult<Vec<HistoryItem>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM history ORDER BY checked_at DESC, id DESC",
            SELECT_COLUMNS
        ))?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn connect(&self) -> EngineResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }
}

fn ensure_schema(conn: &Connection) -> EngineResult<()> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    match version {
        0 => {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        }
        SCHEMA_VERSION => Ok(()),
        found => Err(EngineError::SchemaVersion {
            found,
            expected: SCHEMA_VERSION,
        }),
    }
}

fn validate_record(item: &NewHistoryItem) -> EngineResult<()> {
    if !item.amount.is_finite() {
        return Err(EngineError::InvalidRecord(format!("amount must be finite, got {}", item.amount)));
    }
    if !(0.0..=1.0).contains(&item.fraud_probability) {
        return Err(EngineError::InvalidRecord(format!(
            "fraud_probability must be within [0, 1], got {}",
            item.fraud_probability
        )));
    }
    if let Some(day) = item.transaction_day {
        if day > 6 {
            return Err(EngineError::InvalidRecord(format!("transaction_day must be 0-6, got {}", day)));
        }
    }
    Ok(())
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<HistoryItem> {
    Ok(HistoryItem {
        id: row.get(0)?,
        checked_at: row.get(1)?,
        amount: row.get(2)?,
        is_fraud: row.get(3)?,
        // NULL here means the row was written outside this store; fails the read
        fraud_probability: row.get(4)?,
        category: row.get(5)?,
        gender: row.get(6)?,
        transaction_time: row.get(7)?,
        transaction_day: row.get(8)?,
        city: row.get(9)?,
        age: row.get(10)?,
        risk_level: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("fraud_history.db")).unwrap();
        (dir, store)
    }

    fn sample_item(checked_at: i64, amount: f64) -> NewHistoryItem {
        NewHistoryItem {
            checked_at,
            amount,
            is_fraud: false,
            fraud_probability: 0.12,
            category: Some("shopping_net".to_string()),
            gender: Some("Nam".to_string()),
            transaction_time: Some("13:05:02".to_string()),
            transaction_day: Some(5),
            city: Some("ha noi".to_string()),
            age: Some(28),
            risk_level: Some("low".to_string()),
        }
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_dir, store) = create_test_store();
        assert!(store.list_descending().unwrap().is_empty());
    }

    #[test]
    fn test_list_is_newest_first() {
        let (_dir, store) = create_test_store();
        let first = sample_item(1_700_000_000_000, 100.0);
        let second = sample_item(1_700_000_060_000, 200.0);
        let id1 = store.insert(&first).unwrap();
        let id2 = store.insert(&second).unwrap();

        let items = store.list_descending().unwrap();
        assert_eq!(items, vec![second.with_id(id2), first.with_id(id1)]);
    }

    #[test]
    fn test_order_follows_checked_at_not_insertion() {
        let (_dir, store) = create_test_store();
        store.insert(&sample_item(3_000, 3.0)).unwrap();
        store.insert(&sample_item(1_000, 1.0)).unwrap();
        store.insert(&sample_item(2_000, 2.0)).unwrap();

        let stamps: Vec<i64> = store.list_descending().unwrap().iter().map(|i| i.checked_at).collect();
        assert_eq!(stamps, vec![3_000, 2_000, 1_000]);
    }

    #[test]
    fn test_n_inserts_give_n_distinct_ids() {
        let (_dir, store) = create_test_store();
        let n = 25;
        for i in 0..n {
            store.insert(&sample_item(i as i64, i as f64)).unwrap();
        }
        let items = store.list_descending().unwrap();
        assert_eq!(items.len(), n);
        let ids: HashSet<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn test_ids_increase() {
        let (_dir, store) = create_test_store();
        let a = store.insert(&sample_item(10, 1.0)).unwrap();
        let b = store.insert(&sample_item(5, 1.0)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_optional_columns_round_trip_as_null() {
        let (_dir, store) = create_test_store();
        let item = NewHistoryItem {
            checked_at: 42,
            amount: -12.34,
            is_fraud: true,
            fraud_probability: 0.91,
            category: None,
            gender: None,
            transaction_time: None,
            transaction_day: None,
            city: None,
            age: None,
            risk_level: None,
        };
        let id = store.insert(&item).unwrap();
        assert_eq!(store.list_descending().unwrap(), vec![item.with_id(id)]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let (dir, store) = create_test_store();
        let id = store.insert(&sample_item(1, 500000.0)).unwrap();
        drop(store);

        let reopened = HistoryStore::open(dir.path().join("fraud_history.db")).unwrap();
        let items = reopened.list_descending().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].amount, 500000.0);
    }

    #[test]
    fn test_two_handles_see_each_others_writes() {
        let (dir, store) = create_test_store();
        let other = HistoryStore::open(dir.path().join("fraud_history.db")).unwrap();
        store.insert(&sample_item(1, 1.0)).unwrap();
        assert_eq!(other.list_descending().unwrap().len(), 1);
    }

    #[test]
    fn test_rejected_record_is_not_stored() {
        let (_dir, store) = create_test_store();
        store.insert(&sample_item(1, 1.0)).unwrap();

        let mut bad = sample_item(2, 1.0);
        bad.fraud_probability = 1.5;
        assert!(matches!(store.insert(&bad), Err(EngineError::InvalidRecord(_))));

        let bad = sample_item(3, f64::NAN);
        assert!(store.insert(&bad).is_err());

        let mut bad = sample_item(4, 1.0);
        bad.transaction_day = Some(7);
        assert!(store.insert(&bad).is_err());

        assert_eq!(store.list_descending().unwrap().len(), 1);
    }

    #[test]
    fn test_open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("history.db");
        let store = HistoryStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn test_open_rejects_unknown_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", 7).unwrap();
        }
        match HistoryStore::open(&path) {
            Err(EngineError::SchemaVersion { found, expected }) => {
                assert_eq!(found, 7);
                assert_eq!(expected, SCHEMA_VERSION);
            }
            other => panic!("expected schema version error, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_fault_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as a database file
        assert!(HistoryStore::open(dir.path()).is_err());
    }

    #[test]
    fn test_missing_probability_is_a_read_error() {
        let (dir, store) = create_test_store();
        {
            let conn = Connection::open(dir.path().join("fraud_history.db")).unwrap();
            conn.execute(
                "INSERT INTO history (checked_at, amt, is_fraud, fraud_probability) VALUES (1, 10.0, 0, NULL)",
                [],
            )
            .unwrap();
        }
        let err = store.list_descending().unwrap_err();
        assert!(matches!(err, EngineError::Storage { .. }));
    }

    #[test]
    fn test_insert_after_database_removed_fails_cleanly() {
        let (dir, store) = create_test_store();
        std::fs::remove_file(dir.path().join("fraud_history.db")).unwrap();
        // a fresh empty file has no history table
        let err = store.insert(&sample_item(1, 1.0)).unwrap_err();
        assert!(matches!(err, EngineError::Storage { .. }));
    }
}
