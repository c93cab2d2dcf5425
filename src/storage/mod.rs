//! Durable key-value backends for persisted history.
//!
//! Values are opaque strings; callers decide the encoding.

mod file;
mod memory;

use crate::error::StorageError;

pub use file::FileStore;
pub use memory::MemoryStore;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}
