//! Catalog item records and the storage seam.
//!
//! Persistence mechanics live behind [`CatalogStore`]; this crate only
//! requires create/read/update/delete plus predicate scans. The bundled
//! [`MemoryCatalog`] backend is used by tests and small deployments.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum location tag length in characters
pub const MAX_LOCATION_LEN: usize = 100;

/// A catalog item. `vector` holds the codec-encoded embedding text and is
/// the only durable artifact this crate owns; `"[]"` or `""` means no
/// embedding is available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,

    pub title: String,
    pub description: String,
    /// Shelf location tag, may be empty
    pub location: String,

    /// Encoded embedding (JSON float array text)
    pub vector: String,
}

/// Draft for item creation. The store assigns the id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub vector: String,
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("item not found")]
    NotFound,

    #[error("title is required")]
    EmptyTitle,

    #[error("{field} exceeds maximum length of {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

/// Narrow interface to the external catalog store.
///
/// Implementations must assign stable identifiers on insert. An item and
/// its vector are one record, so deletion removes both as a unit.
pub trait CatalogStore: Send + Sync {
    /// Insert a new item, assigning its id.
    fn insert(&self, draft: NewItem) -> Result<Item, CatalogError>;

    /// Fetch an item by id.
    fn get(&self, id: u64) -> Result<Option<Item>, CatalogError>;

    /// Overwrite an existing item (matched by id).
    fn update(&self, item: &Item) -> Result<(), CatalogError>;

    /// Delete an item by id. Returns false if it did not exist.
    fn delete(&self, id: u64) -> Result<bool, CatalogError>;

    /// All items in insertion order.
    fn all(&self) -> Result<Vec<Item>, CatalogError>;

    /// Items matching a predicate, in insertion order.
    fn find(&self, pred: &dyn Fn(&Item) -> bool) -> Result<Vec<Item>, CatalogError>;
}

/// In-memory catalog backend with monotonically increasing ids.
///
/// Individual operations are serialized through an `RwLock`; there is no
/// cross-call transaction, so concurrent updates to the same item are
/// last-write-wins.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<MemoryCatalogInner>,
}

#[derive(Default)]
struct MemoryCatalogInner {
    items: Vec<Item>,
    next_id: u64,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryCatalogInner>, CatalogError> {
        self.inner
            .read()
            .map_err(|e| CatalogError::Storage(format!("lock poisoned: {e}")))
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, MemoryCatalogInner>, CatalogError> {
        self.inner
            .write()
            .map_err(|e| CatalogError::Storage(format!("lock poisoned: {e}")))
    }
}

impl CatalogStore for MemoryCatalog {
    fn insert(&self, draft: NewItem) -> Result<Item, CatalogError> {
        let mut inner = self.write_lock()?;
        inner.next_id += 1;
        let item = Item {
            id: inner.next_id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            vector: draft.vector,
        };
        inner.items.push(item.clone());
        Ok(item)
    }

    fn get(&self, id: u64) -> Result<Option<Item>, CatalogError> {
        let inner = self.read_lock()?;
        Ok(inner.items.iter().find(|i| i.id == id).cloned())
    }

    fn update(&self, item: &Item) -> Result<(), CatalogError> {
        let mut inner = self.write_lock()?;
        match inner.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(())
            }
            None => Err(CatalogError::NotFound),
        }
    }

    fn delete(&self, id: u64) -> Result<bool, CatalogError> {
        let mut inner = self.write_lock()?;
        let before = inner.items.len();
        inner.items.retain(|i| i.id != id);
        Ok(inner.items.len() < before)
    }

    fn all(&self) -> Result<Vec<Item>, CatalogError> {
        let inner = self.read_lock()?;
        Ok(inner.items.clone())
    }

    fn find(&self, pred: &dyn Fn(&Item) -> bool) -> Result<Vec<Item>, CatalogError> {
        let inner = self.read_lock()?;
        Ok(inner.items.iter().filter(|i| pred(i)).cloned().collect())
    }
}
