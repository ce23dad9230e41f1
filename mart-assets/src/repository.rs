use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mart_blob::AssetKey;
use parking_lot::RwLock;

use crate::{AssetSlot, RepositoryError};

/// A record that owns asset slots
pub trait AssetHolder: Clone + Send + Sync + 'static {
    /// Slots this record type carries
    const SLOTS: &'static [AssetSlot];

    fn supports(slot: AssetSlot) -> bool {
        Self::SLOTS.contains(&slot)
    }

    /// Current keys in `slot`, unset entries included as empty keys
    fn slot_keys(&self, slot: AssetSlot) -> Vec<AssetKey>;

    /// Replace the contents of `slot`
    fn set_slot_keys(&mut self, slot: AssetSlot, keys: Vec<AssetKey>);
}

/// Storage for owner records.
///
/// `update` must apply as one atomic write; callers take no locks.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    type Record: AssetHolder;

    async fn get(&self, owner_id: u64) -> Result<Self::Record, RepositoryError>;

    async fn update(&self, owner_id: u64, record: Self::Record) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<T> EntityRepository for Arc<T>
where
    T: EntityRepository + ?Sized,
{
    type Record = T::Record;

    async fn get(&self, owner_id: u64) -> Result<Self::Record, RepositoryError> {
        (**self).get(owner_id).await
    }

    async fn update(&self, owner_id: u64, record: Self::Record) -> Result<(), RepositoryError> {
        (**self).update(owner_id, record).await
    }
}

/// In-process repository behind a single lock.
///
/// Clones share the same records.
#[derive(Debug)]
pub struct MemoryRepository<R> {
    records: Arc<RwLock<HashMap<u64, R>>>,
}

impl<R> Clone for MemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<R: AssetHolder> MemoryRepository<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a record
    pub fn insert(&self, owner_id: u64, record: R) {
        self.records.write().insert(owner_id, record);
    }

    /// Snapshot of a record
    pub fn record(&self, owner_id: u64) -> Option<R> {
        self.records.read().get(&owner_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl<R: AssetHolder> EntityRepository for MemoryRepository<R> {
    type Record = R;

    async fn get(&self, owner_id: u64) -> Result<R, RepositoryError> {
        self.record(owner_id)
            .ok_or(RepositoryError::NotFound { owner_id })
    }

    async fn update(&self, owner_id: u64, record: R) -> Result<(), RepositoryError> {
        let mut records = self.records.write();
        match records.get_mut(&owner_id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound { owner_id }),
        }
    }
}
