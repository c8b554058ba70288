// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Business-rule validation for shop-floor records.
//!
//! Each record type has one [`Validator`]: an ordered rule chain that stops at
//! the first broken rule, so the operator always sees the most basic problem
//! first. Services do not pick validators themselves; they ask a
//! [`ValidatorRegistry`] to validate a value and the registry finds the
//! validator for its type.
//!
//! ```
//! use shopfloor::types::{Department, Machine};
//! use shopfloor::validation::ValidatorRegistry;
//!
//! let registry = ValidatorRegistry::with_shop_floor_defaults();
//! let machine = Machine {
//!     machine_number: "12".into(),
//!     ..Default::default()
//! };
//! let result = registry.validate(Some(&machine)).unwrap();
//! assert!(!result.is_valid);
//! assert_eq!(result.error_message, "Machine ID must be exactly 3 digits");
//! ```

pub mod registry;
pub mod rules;

pub use registry::{RegistryError, ValidatorRegistry};
pub use rules::{InfoUpdateValidator, MachineValidator, PartValidator, UserValidator};

use serde::Serialize;

/// Verdict of one validation call.
///
/// `error_message` is empty exactly when `is_valid` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        let mut error_message = message.into();
        if error_message.trim().is_empty() {
            error_message = "Validation failed".to_string();
        }
        Self {
            is_valid: false,
            error_message,
        }
    }
}

/// Rule chain for one record type. `None` stands for a missing record.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, item: Option<&T>) -> ValidationResult;
}

/// Plain closures work as validators, mostly handy in tests.
impl<T, F> Validator<T> for F
where
    F: Fn(Option<&T>) -> ValidationResult + Send + Sync,
{
    fn validate(&self, item: Option<&T>) -> ValidationResult {
        self(item)
    }
}
