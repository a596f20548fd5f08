//! Object-store capability consumed by the services and analyzers.
//!
//! The core never knows where records live. Anything that can list, look
//! up, save and delete records by numeric id can back it: the SQLite
//! database in `wl-db`, or the [`MemoryStore`] below.
//!
//! # Identity
//!
//! Unsaved records carry no id. [`Store::save`] assigns one and returns a
//! new value with it filled in; saving a record that already has an id
//! overwrites the stored record with that id.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::error::Error as StdError;

use thiserror::Error;

use crate::types::RecordId;

/// A value with server-assigned identity.
pub trait Record: Clone {
    /// Human-readable record kind, used in error messages.
    const KIND: &'static str;

    /// The assigned id, `None` until saved.
    fn id(&self) -> Option<RecordId>;

    /// Returns a copy of the record carrying `id`.
    #[must_use]
    fn with_id(self, id: RecordId) -> Self;
}

/// Failure reported by a store backend.
#[derive(Debug, Error)]
#[error("store failure: {0}")]
pub struct StoreError(#[source] Box<dyn StdError + Send + Sync>);

impl StoreError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

/// Persistence for one record type.
pub trait Store<T: Record> {
    /// Every stored record, in no particular order.
    fn store_all(&self) -> Result<Vec<T>, StoreError>;

    fn find_by_id(&self, id: RecordId) -> Result<Option<T>, StoreError>;

    /// Inserts or overwrites `record` and returns it with its id.
    fn save(&self, record: T) -> Result<T, StoreError>;

    /// Deletes the record with `id`; missing ids are ignored.
    fn delete_by_id(&self, id: RecordId) -> Result<(), StoreError>;
}

/// Single-threaded in-memory store.
///
/// Ids are assigned from 1 upward. Records saved with an explicit id bump
/// the counter past it so later inserts never collide.
#[derive(Debug)]
pub struct MemoryStore<T> {
    records: RefCell<BTreeMap<RecordId, T>>,
    next_id: Cell<i64>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            records: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(1),
        }
    }
}

impl<T: Record> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl<T: Record> Store<T> for MemoryStore<T> {
    fn store_all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.records.borrow().values().cloned().collect())
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        Ok(self.records.borrow().get(&id).cloned())
    }

    fn save(&self, record: T) -> Result<T, StoreError> {
        let record = match record.id() {
            Some(id) => {
                if id.value() >= self.next_id.get() {
                    self.next_id.set(id.value() + 1);
                }
                record
            }
            None => {
                let id = RecordId::new(self.next_id.get());
                self.next_id.set(id.value() + 1);
                record.with_id(id)
            }
        };
        let id = record.id().ok_or_else(|| StoreError::new("record id missing after assignment"))?;
        self.records.borrow_mut().insert(id, record.clone());
        tracing::trace!(kind = T::KIND, %id, "saved record");
        Ok(record)
    }

    fn delete_by_id(&self, id: RecordId) -> Result<(), StoreError> {
        self.records.borrow_mut().remove(&id);
        Ok(())
    }
}
