//! Durable key-value storage abstractions.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A named bucket of byte keys and values.
///
/// Reads never fail: a backend error is logged and reported as a miss.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    async fn remove(&self, key: &[u8]) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

pub trait Store: Send + Sync {
    /// Returns the collection called `name`, creating it on first use. It
    /// survives restarts when the backing keyspace could be opened.
    fn get_collection(&self, name: &str) -> Arc<dyn KeyValueCollection>;
}
