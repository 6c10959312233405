use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Collection that lives for the lifetime of the process.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let entries = self.inner.lock().await;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
        } else {
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
        }
        value
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut entries = self.inner.lock().await;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> Result<()> {
        let mut entries = self.inner.lock().await;
        entries.remove(key);
        debug!("Cache REMOVE for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.inner.lock().await;
        entries.clear();
        debug!("Cache CLEAR");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collection_get_put() {
        let collection = MemoryCollection::new();

        // Initially, collection is empty
        assert!(collection.get(b"key1").await.is_none());

        collection.put(b"key1", b"123").await.unwrap();
        assert_eq!(collection.get(b"key1").await, Some(b"123".to_vec()));

        // Overwrite keeps only the last value
        collection.put(b"key1", b"456").await.unwrap();
        assert_eq!(collection.get(b"key1").await, Some(b"456".to_vec()));

        assert!(collection.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_collection_remove_and_clear() {
        let collection = MemoryCollection::new();
        collection.put(b"key1", b"1").await.unwrap();
        collection.put(b"key2", b"2").await.unwrap();

        collection.remove(b"key1").await.unwrap();
        assert!(collection.get(b"key1").await.is_none());
        assert!(collection.get(b"key2").await.is_some());

        collection.clear().await.unwrap();
        assert!(collection.get(b"key2").await.is_none());
    }
}
