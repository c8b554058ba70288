// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Poison-tolerant lock acquisition.
//!
//! A std lock becomes poisoned when a thread panics while holding it. The
//! session guard and the validator registry must keep working after such a
//! panic (a shift cannot stop because one callback blew up), so these helpers
//! log the poisoning and hand back the guard anyway.
//!
//! ```no_run
//! use std::sync::{Mutex, RwLock};
//! use shopfloor::security::locks::{resilient_lock, resilient_read};
//!
//! let table = RwLock::new(vec![1, 2, 3]);
//! assert_eq!(resilient_read(&table).len(), 3);
//!
//! let counter = Mutex::new(0);
//! *resilient_lock(&counter) += 1;
//! ```

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

/// Acquire a read lock, recovering from poisoning.
#[inline]
pub fn resilient_read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!(
                target: "security::locks",
                event = "LOCK_POISONED_READ",
                "RwLock was poisoned during read acquisition. Recovering data."
            );
            poisoned.into_inner()
        }
    }
}

/// Acquire a write lock, recovering from poisoning.
#[inline]
pub fn resilient_write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!(
                target: "security::locks",
                event = "LOCK_POISONED_WRITE",
                "RwLock was poisoned during write acquisition. Recovering data."
            );
            poisoned.into_inner()
        }
    }
}

/// Acquire a mutex, recovering from poisoning.
#[inline]
pub fn resilient_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!(
                target: "security::locks",
                event = "LOCK_POISONED_MUTEX",
                "Mutex was poisoned during acquisition. Recovering data."
            );
            poisoned.into_inner()
        }
    }
}

/// Try to acquire a mutex without blocking.
///
/// Returns `None` if another thread currently holds it. Poisoning is
/// recovered the same way as [`resilient_lock`].
#[inline]
pub fn try_resilient_lock<T>(lock: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match lock.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => {
            tracing::error!(
                target: "security::locks",
                event = "LOCK_POISONED_TRY_MUTEX",
                "Mutex was poisoned during try_lock. Recovering data."
            );
            Some(poisoned.into_inner())
        }
        Err(TryLockError::WouldBlock) => None,
    }
}
