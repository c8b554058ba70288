// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Time-boxed admin session.
//!
//! A successful credential check grants an elevated session and arms a
//! countdown. When the countdown elapses without renewal the grant is revoked
//! on its own. Re-authenticating while armed cancels the old countdown and
//! schedules a fresh one; it never stacks.
//!
//! ```text
//! Unauthenticated --authenticate(ok)--> Authorized(armed)
//! Authorized --authenticate(ok)--> Authorized(re-armed)
//! Authorized --elapse | revoke | dispose | authenticate(bad)--> Unauthenticated
//! ```
//!
//! All arm/disarm/elapse transitions go through one mutex. The elapse path
//! only *tries* the lock: if a re-arm, revoke or dispose holds it, that caller
//! is already deciding the outcome and the elapse does nothing.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::credentials::{check_credentials, CredentialCheck, SESSION_UNAVAILABLE};
use super::locks::{resilient_lock, try_resilient_lock};

/// Idle window of an elevated session: 30 seconds.
pub const DEFAULT_SESSION_WINDOW_SECS: u64 = 30;

/// Ceiling on how long `dispose` waits for an in-flight countdown: 60 seconds.
pub const DEFAULT_DISPOSE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("session guard requires a running Tokio runtime")]
    NoRuntime,
}

/// Security events, one audit line each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GuardEvent {
    Granted {
        username: String,
        timestamp: DateTime<Utc>,
        window_secs: u64,
    },
    Renewed {
        username: String,
        timestamp: DateTime<Utc>,
        window_secs: u64,
    },
    Rejected {
        username: String,
        timestamp: DateTime<Utc>,
        error_count: usize,
    },
    Expired {
        timestamp: DateTime<Utc>,
        generation: u64,
    },
    Revoked {
        timestamp: DateTime<Utc>,
        reason: String,
    },
    Disposed {
        timestamp: DateTime<Utc>,
    },
}

impl GuardEvent {
    /// Format event for audit log
    pub fn to_audit_string(&self) -> String {
        match self {
            GuardEvent::Granted { username, timestamp, window_secs } => format!(
                "{} | ADMIN_GRANTED | user={} window={}s",
                fmt_ts(timestamp),
                username,
                window_secs
            ),
            GuardEvent::Renewed { username, timestamp, window_secs } => format!(
                "{} | ADMIN_RENEWED | user={} window={}s",
                fmt_ts(timestamp),
                username,
                window_secs
            ),
            GuardEvent::Rejected { username, timestamp, error_count } => format!(
                "{} | ADMIN_REJECTED | user={} errors={}",
                fmt_ts(timestamp),
                username,
                error_count
            ),
            GuardEvent::Expired { timestamp, generation } => {
                format!("{} | ADMIN_EXPIRED | generation={}", fmt_ts(timestamp), generation)
            }
            GuardEvent::Revoked { timestamp, reason } => {
                format!("{} | ADMIN_REVOKED | reason={}", fmt_ts(timestamp), reason)
            }
            GuardEvent::Disposed { timestamp } => {
                format!("{} | GUARD_DISPOSED", fmt_ts(timestamp))
            }
        }
    }
}

fn fmt_ts(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Guard configuration
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// The single admin identity
    pub admin_username: String,

    /// Secret paired with the admin identity
    pub admin_secret: String,

    /// Idle window before an elevated session is revoked
    pub window: Duration,

    /// How long `dispose` waits for the countdown task to stop
    pub dispose_timeout: Duration,
}

impl GuardConfig {
    pub fn new(admin_username: impl Into<String>, admin_secret: impl Into<String>) -> Self {
        Self {
            admin_username: admin_username.into(),
            admin_secret: admin_secret.into(),
            window: Duration::from_secs(DEFAULT_SESSION_WINDOW_SECS),
            dispose_timeout: Duration::from_secs(DEFAULT_DISPOSE_TIMEOUT_SECS),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_dispose_timeout(mut self, timeout: Duration) -> Self {
        self.dispose_timeout = timeout;
        self
    }
}

/// Capability handed to services that gate privileged work.
pub trait SessionAuthority: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> CredentialCheck;

    fn is_authorized(&self) -> bool;

    fn dispose(&self) -> impl Future<Output = ()> + Send;
}

struct Countdown {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct GuardState {
    countdown: Option<Countdown>,
    generation: u64,
}

impl GuardState {
    /// Cancel the armed countdown, if any. Does not wait for it.
    fn disarm(&mut self) -> Option<Countdown> {
        let countdown = self.countdown.take();
        if let Some(ref c) = countdown {
            c.token.cancel();
        }
        countdown
    }
}

struct Shared {
    state: Mutex<GuardState>,
    authorized: watch::Sender<bool>,
}

impl Shared {
    /// Countdown elapse handler.
    fn expire(&self, generation: u64) {
        let Some(mut state) = try_resilient_lock(&self.state) else {
            tracing::debug!(generation, "countdown elapsed while guard was busy; skipping");
            return;
        };

        // A superseded countdown must not revoke a newer grant.
        match state.countdown {
            Some(ref c) if c.generation == generation => {}
            _ => return,
        }

        state.countdown = None;
        self.authorized.send_replace(false);

        let event = GuardEvent::Expired {
            timestamp: Utc::now(),
            generation,
        };
        tracing::info!("{}", event.to_audit_string());
    }
}

async fn run_countdown(shared: Arc<Shared>, generation: u64, token: CancellationToken, window: Duration) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(window) => shared.expire(generation),
    }
}

/// Grants and times out the elevated admin session.
pub struct SessionGuard {
    config: GuardConfig,
    shared: Arc<Shared>,
    runtime: Handle,
}

impl SessionGuard {
    /// Create a guard whose countdowns run on `runtime`.
    pub fn new(config: GuardConfig, runtime: Handle) -> Self {
        let (authorized, _) = watch::channel(false);
        Self {
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(GuardState::default()),
                authorized,
            }),
            runtime,
        }
    }

    /// Create a guard on the runtime the caller is running in.
    pub fn from_current(config: GuardConfig) -> Result<Self, GuardError> {
        let runtime = Handle::try_current().map_err(|_| GuardError::NoRuntime)?;
        Ok(Self::new(config, runtime))
    }

    /// Check credentials and grant or revoke the elevated session.
    ///
    /// Never fails: bad input is reported through the returned check.
    pub fn authenticate(&self, username: &str, password: &str) -> CredentialCheck {
        let mut check = check_credentials(
            username,
            password,
            &self.config.admin_username,
            &self.config.admin_secret,
        );

        let mut state = resilient_lock(&self.shared.state);

        if !check.is_successful() {
            state.disarm();
            self.shared.authorized.send_replace(false);
            let event = GuardEvent::Rejected {
                username: username.to_string(),
                timestamp: Utc::now(),
                error_count: check.errors().len(),
            };
            tracing::warn!("{}", event.to_audit_string());
            return check;
        }

        let renewed = state.disarm().is_some();
        state.generation += 1;
        let generation = state.generation;
        let token = CancellationToken::new();
        let handle = self.runtime.spawn(run_countdown(
            Arc::clone(&self.shared),
            generation,
            token.clone(),
            self.config.window,
        ));

        // A runtime that has shut down cancels the task on spawn. Without a
        // countdown nothing would ever revoke the grant.
        if handle.is_finished() {
            self.shared.authorized.send_replace(false);
            drop(state);
            tracing::error!(
                user = username,
                generation,
                "countdown could not be scheduled; runtime is shut down, grant refused"
            );
            check.push_error(SESSION_UNAVAILABLE);
            return check;
        }

        state.countdown = Some(Countdown {
            generation,
            token,
            handle,
        });
        self.shared.authorized.send_replace(true);

        let username = username.to_string();
        let timestamp = Utc::now();
        let window_secs = self.config.window.as_secs();
        let event = if renewed {
            GuardEvent::Renewed { username, timestamp, window_secs }
        } else {
            GuardEvent::Granted { username, timestamp, window_secs }
        };
        tracing::info!("{}", event.to_audit_string());

        check
    }

    pub fn is_authorized(&self) -> bool {
        *self.shared.authorized.borrow()
    }

    /// Observe grant/revoke transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shared.authorized.subscribe()
    }

    /// End the elevated session early (sign-out).
    pub fn revoke(&self, reason: &str) {
        let mut state = resilient_lock(&self.shared.state);
        let was_armed = state.disarm().is_some();
        self.shared.authorized.send_replace(false);
        drop(state);

        if was_armed {
            let event = GuardEvent::Revoked {
                timestamp: Utc::now(),
                reason: reason.to_string(),
            };
            tracing::info!("{}", event.to_audit_string());
        }
    }

    /// Stop the countdown and wait (bounded) for it to finish.
    ///
    /// Safe to call any number of times. Teardown problems are logged, never
    /// returned.
    pub async fn dispose(&self) {
        let countdown = {
            let mut state = resilient_lock(&self.shared.state);
            let countdown = state.disarm();
            self.shared.authorized.send_replace(false);
            countdown
        };

        let Some(countdown) = countdown else {
            return;
        };

        match tokio::time::timeout(self.config.dispose_timeout, countdown.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, generation = countdown.generation, "countdown task ended abnormally");
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.config.dispose_timeout.as_secs(),
                    generation = countdown.generation,
                    "countdown task did not stop in time; continuing"
                );
            }
        }

        let event = GuardEvent::Disposed { timestamp: Utc::now() };
        tracing::info!("{}", event.to_audit_string());
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

impl SessionAuthority for SessionGuard {
    fn authenticate(&self, username: &str, password: &str) -> CredentialCheck {
        SessionGuard::authenticate(self, username, password)
    }

    fn is_authorized(&self) -> bool {
        SessionGuard::is_authorized(self)
    }

    fn dispose(&self) -> impl Future<Output = ()> + Send {
        SessionGuard::dispose(self)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        resilient_lock(&self.shared.state).disarm();
        self.shared.authorized.send_replace(false);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::credentials::{PASSWORD_INCORRECT, USERNAME_INCORRECT};

    fn guard() -> SessionGuard {
        SessionGuard::from_current(GuardConfig::new("admin", "letmein")).unwrap()
    }

    #[test]
    fn test_from_current_without_runtime() {
        let result = SessionGuard::from_current(GuardConfig::new("admin", "letmein"));
        assert!(matches!(result, Err(GuardError::NoRuntime)));
    }

    #[test]
    fn test_shut_down_runtime_never_grants() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let config = GuardConfig::new("admin", "letmein").with_window(Duration::from_millis(50));
        let guard = SessionGuard::new(config, rt.handle().clone());
        drop(rt);

        let check = guard.authenticate("admin", "letmein");
        assert!(!check.is_successful());
        assert_eq!(check.errors(), [SESSION_UNAVAILABLE]);
        assert!(!guard.is_authorized());
        assert!(resilient_lock(&guard.shared.state).countdown.is_none());

        std::thread::sleep(Duration::from_millis(100));
        assert!(!guard.is_authorized());
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_SESSION_WINDOW_SECS, 30);
        assert_eq!(DEFAULT_DISPOSE_TIMEOUT_SECS, 60);
        let config = GuardConfig::new("a", "b");
        assert_eq!(config.window, Duration::from_secs(30));
        assert_eq!(config.dispose_timeout, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_then_expire() {
        let guard = guard();
        assert!(!guard.is_authorized());

        assert!(guard.authenticate("Admin", "LETMEIN").is_successful());
        assert!(guard.is_authorized());

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(guard.is_authorized());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reauth_resets_window() {
        let guard = guard();
        guard.authenticate("admin", "letmein");

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(guard.authenticate("admin", "letmein").is_successful());

        // Past the first grant's deadline, inside the second's.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(guard.is_authorized());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_auth_revokes_existing_grant() {
        let guard = guard();
        guard.authenticate("admin", "letmein");
        assert!(guard.is_authorized());

        let check = guard.authenticate("admin", "wrong");
        assert_eq!(check.errors(), [PASSWORD_INCORRECT]);
        assert!(!guard.is_authorized());

        let check = guard.authenticate("operator", "letmein");
        assert_eq!(check.errors(), [USERNAME_INCORRECT]);
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_countdown_does_not_revoke() {
        let guard = guard();
        guard.authenticate("admin", "letmein");
        let first_generation = resilient_lock(&guard.shared.state).generation;
        guard.authenticate("admin", "letmein");

        // A stale elapse for the first generation is ignored.
        guard.shared.expire(first_generation);
        assert!(guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_skips_when_lock_is_busy() {
        let guard = guard();
        guard.authenticate("admin", "letmein");
        let generation = resilient_lock(&guard.shared.state).generation;

        let held = resilient_lock(&guard.shared.state);
        guard.shared.expire(generation);
        drop(held);
        assert!(guard.is_authorized());

        guard.shared.expire(generation);
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_twice() {
        let guard = guard();
        guard.authenticate("admin", "letmein");

        guard.dispose().await;
        assert!(!guard.is_authorized());
        guard.dispose().await;
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_countdown() {
        let guard = guard();
        guard.authenticate("admin", "letmein");
        let mut rx = guard.subscribe();
        assert!(*rx.borrow_and_update());

        let token = resilient_lock(&guard.shared.state)
            .countdown
            .as_ref()
            .map(|c| c.token.clone())
            .unwrap();
        let shared = Arc::downgrade(&guard.shared);

        drop(guard);
        assert!(token.is_cancelled());
        assert!(!*rx.borrow_and_update());

        // The countdown task held the last reference; it lets go long before
        // the window would have elapsed.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(shared.strong_count(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!*rx.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_accessor() {
        let config = GuardConfig::new("admin", "letmein").with_window(Duration::from_secs(5));
        let guard = SessionGuard::from_current(config).unwrap();
        assert_eq!(guard.config().window, Duration::from_secs(5));
        assert_eq!(guard.config().admin_username, "admin");

        guard.authenticate("admin", "letmein");
        tokio::time::sleep(guard.config().window + Duration::from_secs(1)).await;
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoke() {
        let guard = guard();
        guard.authenticate("admin", "letmein");
        guard.revoke("shift change");
        assert!(!guard.is_authorized());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!guard.is_authorized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_transitions() {
        let guard = guard();
        let mut rx = guard.subscribe();
        assert!(!*rx.borrow());

        guard.authenticate("admin", "letmein");
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }

    #[test]
    fn test_audit_string() {
        let event = GuardEvent::Granted {
            username: "admin".to_string(),
            timestamp: Utc::now(),
            window_secs: 30,
        };
        let line = event.to_audit_string();
        assert!(line.contains("ADMIN_GRANTED"));
        assert!(line.contains("user=admin"));
        assert!(line.contains("window=30s"));
    }
}
