// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Data-access contract for shop-floor records.
//!
//! The storage backend is pluggable behind [`DataAccessService`]. This crate
//! ships an in-memory implementation; a database-backed one implements the
//! same trait. [`GatedCollection`] puts the admin session and the validator
//! registry in front of any backend.

pub mod gated;
pub mod memory;

pub use gated::{GatedCollection, ServiceError};
pub use memory::InMemoryDataAccess;

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::types::{InfoUpdate, Machine, Part, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    #[error("entity {0} not found")]
    NotFound(u64),

    #[error("entity has no id")]
    MissingId,

    #[error("entity {0} already exists")]
    Conflict(u64),

    #[error("entity id {0} is out of range")]
    IdOutOfRange(u64),
}

pub type Result<T> = std::result::Result<T, DataAccessError>;

/// A record with a store-assigned id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<u64>;

    fn set_id(&mut self, id: u64);
}

macro_rules! impl_entity {
    ($($ty:ty),+) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> Option<u64> {
                    self.id
                }

                fn set_id(&mut self, id: u64) {
                    self.id = Some(id);
                }
            }
        )+
    };
}

impl_entity!(Machine, Part, User, InfoUpdate);

/// Change notification published after every successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataChange {
    Created(u64),
    Updated(u64),
    Deleted(u64),
}

impl DataChange {
    pub fn id(&self) -> u64 {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Deleted(id) => *id,
        }
    }
}

/// CRUD over one record type plus a change feed.
pub trait DataAccessService<T: Entity>: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    fn create_new_entity(&self, entity: T) -> impl Future<Output = Result<T>> + Send;

    fn get_all_entities(&self) -> impl Future<Output = Result<Vec<T>>> + Send;

    fn get_entity_by_id(&self, id: u64) -> impl Future<Output = Result<Option<T>>> + Send;

    fn update_entity(&self, entity: T) -> impl Future<Output = Result<T>> + Send;

    fn delete_entity(&self, id: u64) -> impl Future<Output = Result<()>> + Send;

    /// Subscribe to [`DataChange`] notifications.
    fn data_changed(&self) -> broadcast::Receiver<DataChange>;
}
