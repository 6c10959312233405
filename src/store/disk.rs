use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Collection backed by a fjall partition. Writes are synced before
/// returning so a short-lived CLI process does not lose them.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }

    fn sync(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
                None
            }
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.partition.insert(key, value)?;
        self.sync()?;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> Result<()> {
        self.partition.remove(key)?;
        self.sync()?;
        debug!("Cache REMOVE for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .map(|k| k.map(|k| k.to_vec()))
            .collect::<Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        self.sync()?;
        debug!("Cache CLEAR");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::{Config, PartitionCreateOptions};
    use tempfile::tempdir;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = Arc::new(Config::new(path).open().unwrap());
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(keyspace, partition)
    }

    #[tokio::test]
    async fn test_disk_collection_get_put_remove() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        assert!(collection.get(b"key1").await.is_none());

        collection.put(b"key1", b"123").await.unwrap();
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));

        collection.remove(b"key1").await.unwrap();
        assert!(collection.get(b"key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_collection_clear() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection.put(b"key1", b"1").await.unwrap();
        collection.put(b"key2", b"2").await.unwrap();
        collection.clear().await.unwrap();

        assert!(collection.get(b"key1").await.is_none());
        assert!(collection.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_collection_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let collection = open(dir.path());
            collection.put(b"token", b"abc").await.unwrap();
        }
        let collection = open(dir.path());
        assert_eq!(collection.get(b"token").await, Some(b"abc".to_vec()));
    }
}
