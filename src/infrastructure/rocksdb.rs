use crate::domain::point::{PointHistory, TransactionType, UserPoint, now_millis};
use crate::domain::ports::{BalanceStore, HistoryStore};
use crate::error::{PointError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing current balances.
pub const CF_BALANCES: &str = "balances";
/// Column Family for storing the append-only point history.
pub const CF_HISTORY: &str = "history";
/// Column Family for store bookkeeping such as the history id sequence.
pub const CF_META: &str = "meta";

const HISTORY_SEQUENCE_KEY: &[u8] = b"history_sequence";

/// A persistent store implementation using RocksDB.
///
/// Balances are keyed by the big-endian user id. History entries are keyed by
/// `user_id ++ entry_id` (both big-endian), so a prefix scan returns one user's
/// entries in insertion order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    sequence: Arc<Mutex<u64>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist and loads the last issued
    /// history id from the meta column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_balances = ColumnFamilyDescriptor::new(CF_BALANCES, Options::default());
        let cf_history = ColumnFamilyDescriptor::new(CF_HISTORY, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_balances, cf_history, cf_meta])?;
        let last_id = Self::load_sequence(&db)?;

        Ok(Self {
            db: Arc::new(db),
            sequence: Arc::new(Mutex::new(last_id)),
        })
    }

    fn load_sequence(db: &DB) -> Result<u64> {
        let cf = column_family(db, CF_META)?;
        match db.get_cf(cf, HISTORY_SEQUENCE_KEY)? {
            Some(bytes) => bytes
                .as_slice()
                .try_into()
                .map(u64::from_be_bytes)
                .map_err(|_| PointError::StorageError("Malformed history sequence".to_string())),
            None => Ok(0),
        }
    }
}

fn column_family<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name).ok_or_else(|| {
        PointError::InternalError(Box::new(std::io::Error::other(format!(
            "{} column family not found",
            name
        ))))
    })
}

fn history_key(user_id: i64, entry_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&user_id.to_be_bytes());
    key[8..].copy_from_slice(&entry_id.to_be_bytes());
    key
}

#[async_trait]
impl BalanceStore for RocksDBStore {
    async fn select_by_id(&self, user_id: i64) -> Result<UserPoint> {
        let cf = column_family(&self.db, CF_BALANCES)?;

        match self.db.get_cf(cf, user_id.to_be_bytes())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(UserPoint::empty(user_id)),
        }
    }

    async fn insert_or_update(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        let cf = column_family(&self.db, CF_BALANCES)?;

        let point = UserPoint::new(user_id, amount, now_millis());
        let value = serde_json::to_vec(&point)?;
        self.db.put_cf(cf, user_id.to_be_bytes(), value)?;

        Ok(point)
    }
}

#[async_trait]
impl HistoryStore for RocksDBStore {
    async fn insert(
        &self,
        user_id: i64,
        amount: i64,
        kind: TransactionType,
        timestamp_millis: i64,
    ) -> Result<PointHistory> {
        let cf = column_family(&self.db, CF_HISTORY)?;
        let cf_meta = column_family(&self.db, CF_META)?;
        let mut sequence = self
            .sequence
            .lock()
            .map_err(|e| PointError::StorageError(format!("History sequence poisoned: {}", e)))?;

        let entry = PointHistory {
            id: *sequence + 1,
            user_id,
            amount,
            kind,
            timestamp_millis,
        };
        let value = serde_json::to_vec(&entry)?;
        // The sequence is persisted first: a failed entry write only skips an id.
        self.db
            .put_cf(cf_meta, HISTORY_SEQUENCE_KEY, entry.id.to_be_bytes())?;
        *sequence = entry.id;
        self.db.put_cf(cf, history_key(user_id, entry.id), value)?;

        Ok(entry)
    }

    async fn select_all_by_user_id(&self, user_id: i64) -> Result<Vec<PointHistory>> {
        let cf = column_family(&self.db, CF_HISTORY)?;

        let prefix = user_id.to_be_bytes();
        let start = history_key(user_id, 0);
        let mut entries = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start[..], Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            entries.push(serde_json::from_slice(&value)?);
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_BALANCES).is_some());
        assert!(store.db.cf_handle(CF_HISTORY).is_some());
        assert!(store.db.cf_handle(CF_META).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_balance_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let stored = store.insert_or_update(1, 100).await.unwrap();
        let retrieved = store.select_by_id(1).await.unwrap();
        assert_eq!(retrieved, stored);

        let unknown = store.select_by_id(2).await.unwrap();
        assert_eq!(unknown.amount, 0);
    }

    #[tokio::test]
    async fn test_rocksdb_history_store_scopes_by_user() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        store.insert(1, 10, TransactionType::Charge, 1).await.unwrap();
        store.insert(2, 20, TransactionType::Charge, 2).await.unwrap();
        store.insert(1, 5, TransactionType::Use, 3).await.unwrap();

        let history = store.select_all_by_user_id(1).await.unwrap();
        let ids: Vec<u64> = history.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(history[1].kind, TransactionType::Use);

        assert!(store.select_all_by_user_id(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rocksdb_sequence_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store.insert(1, 10, TransactionType::Charge, 1).await.unwrap();
            store.insert(1, 10, TransactionType::Charge, 2).await.unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        let entry = store.insert(1, 3, TransactionType::Use, 3).await.unwrap();
        assert_eq!(entry.id, 3);
        assert_eq!(store.select_all_by_user_id(1).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rocksdb_sequence_read_from_meta_key() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            let cf = store.db.cf_handle(CF_META).unwrap();
            store
                .db
                .put_cf(cf, HISTORY_SEQUENCE_KEY, 41u64.to_be_bytes())
                .unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        let entry = store.insert(5, 1, TransactionType::Charge, 1).await.unwrap();
        assert_eq!(entry.id, 42);
    }
}
