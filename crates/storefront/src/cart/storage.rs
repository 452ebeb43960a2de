//! Durable storage slot for the cart.
//!
//! The cart is mirrored into a single key-value slot after every mutation.
//! The slot is not versioned: whatever was written last is what the next
//! process start reads back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shopfront_core::CartItem;
use thiserror::Error;

/// Errors reading or writing the persisted cart.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persisted data is not a valid cart.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The slot is unavailable (lock poisoned, storage disabled).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A durable slot holding the serialized cart.
pub trait CartStorage {
    /// Read the persisted cart.
    ///
    /// Returns `Ok(None)` when nothing has been persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or does not parse.
    fn read_cart(&self) -> Result<Option<Vec<CartItem>>, StorageError>;

    /// Replace the persisted cart with `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn write_cart(&self, items: &[CartItem]) -> Result<(), StorageError>;

    /// Remove the persisted cart entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be removed.
    fn clear_cart(&self) -> Result<(), StorageError>;
}

// =============================================================================
// File storage
// =============================================================================

/// Cart persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    path: PathBuf,
}

impl FileCartStorage {
    /// Create a storage slot at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cart file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileCartStorage {
    fn read_cart(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn write_cart(&self, items: &[CartItem]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash mid-write never leaves a truncated cart
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear_cart(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// In-memory storage
// =============================================================================

/// Cart persisted in memory, serialized the same way as on disk.
///
/// Used by tests and by callers that want a cart without a file.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    slot: Mutex<Option<String>>,
    fail_writes: bool,
}

impl MemoryCartStorage {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-filled with raw data, which need not be valid JSON.
    #[must_use]
    pub fn with_raw(data: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(data.into())),
            fail_writes: false,
        }
    }

    /// A slot that rejects every write and clear.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            slot: Mutex::new(None),
            fail_writes: true,
        }
    }

    /// Raw contents of the slot.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StorageError> {
        self.slot
            .lock()
            .map_err(|_| StorageError::Unavailable("Lock poisoned".to_string()))
    }
}

impl CartStorage for MemoryCartStorage {
    fn read_cart(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        let guard = self.lock()?;
        guard
            .as_deref()
            .map(serde_json::from_str::<Vec<CartItem>>)
            .transpose()
            .map_err(StorageError::from)
    }

    fn write_cart(&self, items: &[CartItem]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        let data = serde_json::to_string(items)?;
        *self.lock()? = Some(data);
        Ok(())
    }

    fn clear_cart(&self) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        *self.lock()? = None;
        Ok(())
    }
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn read_cart(&self) -> Result<Option<Vec<CartItem>>, StorageError> {
        (**self).read_cart()
    }

    fn write_cart(&self, items: &[CartItem]) -> Result<(), StorageError> {
        (**self).write_cart(items)
    }

    fn clear_cart(&self) -> Result<(), StorageError> {
        (**self).clear_cart()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{Price, ProductId};

    use super::*;

    fn item(id: i32, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(999),
            image: format!("https://img.example.com/{id}.jpg"),
            category: "electronics".to_string(),
            quantity,
        }
    }

    fn temp_cart_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("shopfront-test-{}", uuid::Uuid::new_v4()))
            .join("cart.json")
    }

    #[test]
    fn test_file_missing_reads_as_absent() {
        let storage = FileCartStorage::new(temp_cart_path());
        assert!(storage.read_cart().unwrap().is_none());
    }

    #[test]
    fn test_file_roundtrip_preserves_order() {
        let path = temp_cart_path();
        let storage = FileCartStorage::new(&path);
        let cart = vec![item(3, 1), item(1, 2), item(2, 5)];

        storage.write_cart(&cart).unwrap();
        assert_eq!(storage.read_cart().unwrap(), Some(cart));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_file_clear_removes_record() {
        let path = temp_cart_path();
        let storage = FileCartStorage::new(&path);
        storage.write_cart(&[item(1, 1)]).unwrap();

        storage.clear_cart().unwrap();
        assert!(!path.exists());
        assert!(storage.read_cart().unwrap().is_none());

        // Clearing twice is fine
        storage.clear_cart().unwrap();
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_file_garbage_is_a_parse_error() {
        let path = temp_cart_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let storage = FileCartStorage::new(&path);
        assert!(matches!(storage.read_cart(), Err(StorageError::Json(_))));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_memory_roundtrip() {
        let storage = MemoryCartStorage::new();
        let cart = vec![item(2, 1), item(9, 4)];
        storage.write_cart(&cart).unwrap();
        assert_eq!(storage.read_cart().unwrap(), Some(cart));
    }

    #[test]
    fn test_memory_failing_rejects_writes() {
        let storage = MemoryCartStorage::failing();
        assert!(storage.write_cart(&[item(1, 1)]).is_err());
        assert!(storage.clear_cart().is_err());
        assert!(storage.read_cart().unwrap().is_none());
    }
}
