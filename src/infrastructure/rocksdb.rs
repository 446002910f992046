use crate::domain::ports::BalanceStore;
use crate::domain::subscriber::SubscriberClass;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Column Family holding the cached balance document.
pub const CF_BALANCE: &str = "balance";
/// Key of the cached balance within [`CF_BALANCE`].
pub const BALANCE_KEY: &str = "account-balance";

/// A persistent store implementation using RocksDB.
///
/// The balance lives in its own Column Family; each subscriber class gets one
/// Column Family named after its collection, with one entry per registration.
/// Entries are keyed by UUIDv7 so iteration follows registration order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut families = vec![ColumnFamilyDescriptor::new(CF_BALANCE, Options::default())];
        for class in SubscriberClass::ALL {
            families.push(ColumnFamilyDescriptor::new(
                class.collection(),
                Options::default(),
            ));
        }

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| RelayError::StorageError(format!("column family {} not found", name)))
    }
}

#[async_trait]
impl BalanceStore for RocksDBStore {
    async fn get_balance(&self) -> Result<String> {
        let cf = self.cf(CF_BALANCE)?;
        let bytes = self
            .db
            .get_cf(cf, BALANCE_KEY)?
            .ok_or_else(|| RelayError::StorageError("balance has not been recorded".to_string()))?;

        String::from_utf8(bytes)
            .map_err(|e| RelayError::StorageError(format!("balance is not valid UTF-8: {}", e)))
    }

    async fn set_balance(&self, value: &str) -> Result<()> {
        let cf = self.cf(CF_BALANCE)?;
        self.db.put_cf(cf, BALANCE_KEY, value.as_bytes())?;
        Ok(())
    }

    async fn list_subscriber_uris(&self, class: SubscriberClass) -> Result<Vec<String>> {
        let cf = self.cf(class.collection())?;

        let mut uris = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (key, value) = item?;
            match String::from_utf8(value.into_vec()) {
                Ok(uri) => uris.push(uri),
                // One bad document should not hide the other subscribers.
                Err(e) => tracing::warn!(
                    %class,
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "skipping unreadable subscriber uri"
                ),
            }
        }

        Ok(uris)
    }

    async fn add_subscriber_uri(&self, class: SubscriberClass, uri: &str) -> Result<()> {
        let cf = self.cf(class.collection())?;
        let key = Uuid::now_v7();
        self.db.put_cf(cf, key.as_bytes(), uri.as_bytes())?;
        Ok(())
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

        assert!(store.db.cf_handle(CF_BALANCE).is_some());
        assert!(store.db.cf_handle("webhooks").is_some());
        assert!(store.db.cf_handle("raw-webhooks").is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_balance_overwrite() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        assert!(store.get_balance().await.is_err());
        store.set_balance("100.00").await.unwrap();
        store.set_balance("42.10").await.unwrap();
        assert_eq!(store.get_balance().await.unwrap(), "42.10");
    }

    #[tokio::test]
    async fn test_rocksdb_subscribers_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            for uri in ["http://a.test", "http://b.test", "http://a.test"] {
                store
                    .add_subscriber_uri(SubscriberClass::Formatted, uri)
                    .await
                    .unwrap();
            }
            store
                .add_subscriber_uri(SubscriberClass::Raw, "http://raw.test")
                .await
                .unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(
            store
                .list_subscriber_uris(SubscriberClass::Formatted)
                .await
                .unwrap(),
            vec!["http://a.test", "http://b.test", "http://a.test"]
        );
        assert_eq!(
            store.list_subscriber_uris(SubscriberClass::Raw).await.unwrap(),
            vec!["http://raw.test"]
        );
    }
}
