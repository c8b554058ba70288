// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Type-keyed validator registry.
//!
//! One validator per record type, looked up by `TypeId`. Registering twice for
//! a type replaces the first validator. Asking for a type nobody registered is
//! a setup mistake and comes back as [`RegistryError::NotRegistered`], which
//! is distinct from a record that merely fails its rules.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::rules::{InfoUpdateValidator, MachineValidator, PartValidator, UserValidator};
use super::{ValidationResult, Validator};
use crate::security::locks::{resilient_read, resilient_write};
use crate::types::{InfoUpdate, Machine, Part, User};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no validator registered for {type_name}")]
    NotRegistered { type_name: &'static str },
}

/// Stored as `Arc<dyn Validator<T>>` behind `dyn Any` so every `T` fits in
/// one map.
type ErasedValidator = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ValidatorRegistry {
    validators: RwLock<HashMap<TypeId, ErasedValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the machine, part, user and info-update
    /// validators.
    pub fn with_shop_floor_defaults() -> Self {
        let registry = Self::new();
        registry.register_validator::<Machine>(MachineValidator);
        registry.register_validator::<Part>(PartValidator);
        registry.register_validator::<User>(UserValidator);
        registry.register_validator::<InfoUpdate>(InfoUpdateValidator);
        registry
    }

    /// Store `validator` for `T`, replacing any earlier one.
    pub fn register_validator<T: 'static>(&self, validator: impl Validator<T> + 'static) {
        let validator: Arc<dyn Validator<T>> = Arc::new(validator);
        let replaced = resilient_write(&self.validators)
            .insert(TypeId::of::<T>(), Box::new(validator))
            .is_some();

        tracing::debug!(
            type_name = type_name::<T>(),
            replaced,
            "validator registered"
        );
    }

    /// Run the validator registered for `T`.
    pub fn validate<T: 'static>(&self, item: Option<&T>) -> Result<ValidationResult, RegistryError> {
        let validator = self.lookup::<T>().ok_or_else(|| {
            tracing::error!(type_name = type_name::<T>(), "validation requested for unregistered type");
            RegistryError::NotRegistered {
                type_name: type_name::<T>(),
            }
        })?;

        // Lock is already released; a slow rule never blocks registration.
        Ok(validator.validate(item))
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        resilient_read(&self.validators).contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        resilient_read(&self.validators).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<T: 'static>(&self) -> Option<Arc<dyn Validator<T>>> {
        let validators = resilient_read(&self.validators);
        validators
            .get(&TypeId::of::<T>())
            .and_then(|erased| erased.downcast_ref::<Arc<dyn Validator<T>>>())
            .cloned()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.len())
            .finish()
    }
}
