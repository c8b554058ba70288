// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! shopfloor - record-keeping core for a manufacturing floor
//!
//! Machines, parts, users and floor notices are kept behind two gates:
//!
//! **Admin session** -> **Validator registry** -> **Data store**
//!
//! # Core Modules
//!
//! - [`security`] - Admin credential check and the timed elevated session
//! - [`validation`] - Per-record rule chains and the type-keyed registry
//! - [`data`] - Data-access contract, in-memory store, gated collections
//! - [`types`] - Shop-floor record types
//! - [`config`] - `~/.shopfloor/config.json`

pub mod colors;
pub mod config;
pub mod data;
pub mod security;
pub mod types;
pub mod validation;

pub use config::{load_config, save_config, Config};

pub use data::{
    DataAccessError, DataAccessService, DataChange, Entity, GatedCollection, InMemoryDataAccess,
    ServiceError,
};

pub use security::{CredentialCheck, GuardConfig, GuardError, SessionAuthority, SessionGuard};

pub use types::{Department, InfoUpdate, Machine, Part, Shift, User};

pub use validation::{RegistryError, ValidationResult, Validator, ValidatorRegistry};
