// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory record store.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tokio::sync::{broadcast, RwLock};

use super::{DataAccessError, DataAccessService, DataChange, Entity, Result};

/// Capacity of the change feed; slow subscribers see `Lagged`.
const CHANGE_FEED_CAPACITY: usize = 256;

/// Insertion-ordered store with ids assigned from 1 upward.
pub struct InMemoryDataAccess<T> {
    entities: RwLock<IndexMap<u64, T>>,
    next_id: AtomicU64,
    changes: broadcast::Sender<DataChange>,
}

impl<T: Entity> InMemoryDataAccess<T> {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            entities: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            changes,
        }
    }

    fn publish(&self, change: DataChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
        tracing::debug!(id = change.id(), ?change, "data changed");
    }
}

impl<T: Entity> Default for InMemoryDataAccess<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> DataAccessService<T> for InMemoryDataAccess<T> {
    async fn create_new_entity(&self, mut entity: T) -> Result<T> {
        let mut entities = self.entities.write().await;

        let id = match entity.id() {
            Some(id) if entities.contains_key(&id) => return Err(DataAccessError::Conflict(id)),
            Some(id) => {
                // u64::MAX would leave no id to generate next.
                let next = id.checked_add(1).ok_or(DataAccessError::IdOutOfRange(id))?;
                self.next_id.fetch_max(next, Ordering::SeqCst);
                id
            }
            None => {
                let id = self
                    .next_id
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| next.checked_add(1))
                    .map_err(DataAccessError::IdOutOfRange)?;
                entity.set_id(id);
                id
            }
        };

        entities.insert(id, entity.clone());
        drop(entities);

        self.publish(DataChange::Created(id));
        Ok(entity)
    }

    async fn get_all_entities(&self) -> Result<Vec<T>> {
        Ok(self.entities.read().await.values().cloned().collect())
    }

    async fn get_entity_by_id(&self, id: u64) -> Result<Option<T>> {
        Ok(self.entities.read().await.get(&id).cloned())
    }

    async fn update_entity(&self, entity: T) -> Result<T> {
        let id = entity.id().ok_or(DataAccessError::MissingId)?;

        let mut entities = self.entities.write().await;
        let slot = entities.get_mut(&id).ok_or(DataAccessError::NotFound(id))?;
        *slot = entity.clone();
        drop(entities);

        self.publish(DataChange::Updated(id));
        Ok(entity)
    }

    async fn delete_entity(&self, id: u64) -> Result<()> {
        // shift_remove keeps the remaining records in insertion order
        let removed = self.entities.write().await.shift_remove(&id);
        if removed.is_none() {
            return Err(DataAccessError::NotFound(id));
        }

        self.publish(DataChange::Deleted(id));
        Ok(())
    }

    fn data_changed(&self) -> broadcast::Receiver<DataChange> {
        self.changes.subscribe()
    }
}
