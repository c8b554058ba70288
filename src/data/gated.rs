// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Privileged, validated access to a record store.
//!
//! Writes need an elevated admin session and, for create/update, a record that
//! passes its validator. Reads are open to everyone on the floor.

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

use super::{DataAccessError, DataAccessService, DataChange, Entity};
use crate::security::SessionAuthority;
use crate::validation::{RegistryError, ValidatorRegistry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("an admin session is required for this change")]
    NotAuthorized,

    /// The record broke a business rule; the message is operator-facing.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Data(#[from] DataAccessError),
}

pub struct GatedCollection<T, S, A> {
    store: Arc<S>,
    authority: Arc<A>,
    registry: Arc<ValidatorRegistry>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, S, A> GatedCollection<T, S, A>
where
    T: Entity,
    S: DataAccessService<T>,
    A: SessionAuthority,
{
    pub fn new(store: Arc<S>, authority: Arc<A>, registry: Arc<ValidatorRegistry>) -> Self {
        Self {
            store,
            authority,
            registry,
            _entity: PhantomData,
        }
    }

    pub async fn create(&self, entity: T) -> Result<T, ServiceError> {
        self.require_admin("create")?;
        self.check(&entity)?;
        Ok(self.store.create_new_entity(entity).await?)
    }

    pub async fn update(&self, entity: T) -> Result<T, ServiceError> {
        self.require_admin("update")?;
        self.check(&entity)?;
        Ok(self.store.update_entity(entity).await?)
    }

    pub async fn delete(&self, id: u64) -> Result<(), ServiceError> {
        self.require_admin("delete")?;
        Ok(self.store.delete_entity(id).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<T>, ServiceError> {
        Ok(self.store.get_all_entities().await?)
    }

    pub async fn get(&self, id: u64) -> Result<Option<T>, ServiceError> {
        Ok(self.store.get_entity_by_id(id).await?)
    }

    pub fn data_changed(&self) -> broadcast::Receiver<DataChange> {
        self.store.data_changed()
    }

    fn require_admin(&self, operation: &'static str) -> Result<(), ServiceError> {
        if self.authority.is_authorized() {
            return Ok(());
        }
        tracing::warn!(
            operation,
            entity = std::any::type_name::<T>(),
            "write refused without admin session"
        );
        Err(ServiceError::NotAuthorized)
    }

    fn check(&self, entity: &T) -> Result<(), ServiceError> {
        let result = self.registry.validate(Some(entity))?;
        if result.is_valid {
            Ok(())
        } else {
            Err(ServiceError::Rejected(result.error_message))
        }
    }
}
