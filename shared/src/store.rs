use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to check for object {key}: {reason}")]
    Lookup { key: String, reason: String },
    #[error("failed to upload object {key}: {reason}")]
    Upload { key: String, reason: String },
}

/// Write-once artifact storage shared by every invocation
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Whether an object is already stored under `key`
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Store `bytes` under `key`. Writing the same key twice is allowed.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// In-process store for local runs and tests
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: Mutex<usize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Number of uploads performed, including overwrites
    pub fn put_count(&self) -> usize {
        *self.puts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), bytes);
        *self.puts.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}
