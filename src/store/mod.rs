pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::warn;

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens the durable keyspace under `data_path/store`. If that fails the
    /// store keeps working with in-memory collections only.
    pub fn open(data_path: &Path) -> Self {
        let keyspace = match fjall::Config::new(data_path.join("store")).open() {
            Ok(keyspace) => Some(Arc::new(keyspace)),
            Err(e) => {
                warn!(
                    "Could not open store at {}: {}. Falling back to memory",
                    data_path.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.keyspace.is_some()
    }

    fn create_collection(&self, name: &str) -> Arc<dyn KeyValueCollection> {
        if let Some(ks) = &self.keyspace {
            match ks.open_partition(name, PartitionCreateOptions::default()) {
                Ok(partition) => {
                    return Arc::new(DiskCollection::new(Arc::clone(ks), partition));
                }
                Err(e) => warn!("Could not open partition {}: {}. Using memory", name, e),
            }
        }
        Arc::new(MemoryCollection::new())
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str) -> Arc<dyn KeyValueCollection> {
        if let Some(collection) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Arc::clone(collection);
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| self.create_collection(name));
        Arc::clone(collection)
    }
}
