// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Admin session security.
//!
//! Configuration screens (machines, users, notices) are privileged. An
//! operator unlocks them with the admin credentials, which grants a short
//! elevated session that lapses after 30 seconds without renewal.
//!
//! ## Usage
//!
//! ```no_run
//! use shopfloor::security::{GuardConfig, SessionGuard};
//!
//! # async fn demo() -> Result<(), shopfloor::security::GuardError> {
//! let guard = SessionGuard::from_current(GuardConfig::new("admin", "secret"))?;
//!
//! let check = guard.authenticate("admin", "secret");
//! if check.is_successful() {
//!     assert!(guard.is_authorized());
//! } else {
//!     for message in check.errors() {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! guard.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod locks;
pub mod session_guard;

pub use credentials::{check_credentials, CredentialCheck};
pub use locks::{resilient_lock, resilient_read, resilient_write, try_resilient_lock};
pub use session_guard::{
    GuardConfig, GuardError, GuardEvent, SessionAuthority, SessionGuard,
    DEFAULT_DISPOSE_TIMEOUT_SECS, DEFAULT_SESSION_WINDOW_SECS,
};
