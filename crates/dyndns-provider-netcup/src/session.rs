//! Session cache for the CCP API
//!
//! The session id and its validity deadline are always read and written as
//! one pair under the same lock. Logins are serialized through a separate
//! gate, so a task holding a valid session never waits behind a login and a
//! task that finds a stale session waits for at most one in-flight login.

use chrono::{DateTime, TimeDelta, Utc};
use dyndns_core::Result;
use dyndns_core::mask::mask_value;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// An authenticated API session
#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.id.is_empty() && now < self.expires_at
    }
}

// Session ids stay out of Debug output
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &mask_value(&self.id))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub struct SessionCache {
    current: RwLock<Option<Session>>,
    login_gate: Mutex<()>,
    lifetime: Duration,
    login_count: AtomicUsize,
    first_login: RwLock<Option<DateTime<Utc>>>,
}

impl SessionCache {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            current: RwLock::new(None),
            login_gate: Mutex::new(()),
            lifetime,
            login_count: AtomicUsize::new(0),
            first_login: RwLock::new(None),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn login_count(&self) -> usize {
        self.login_count.load(Ordering::SeqCst)
    }

    /// The cached session if it is still inside its validity window
    pub async fn valid(&self) -> Option<Session> {
        let now = Utc::now();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|session| session.is_valid_at(now))
            .cloned()
    }

    /// The cached session regardless of expiry
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Return a valid session, running `login` only when none is cached
    ///
    /// Double-checked: an uncontended read first, then the login gate, then
    /// a second read so that a task losing the race reuses the session the
    /// winner installed.
    pub async fn get_or_login<F, Fut>(&self, login: F) -> Result<Session>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if let Some(session) = self.valid().await {
            tracing::debug!(
                expires_at = %session.expires_at.format("%H:%M:%S"),
                "netcup: reusing existing session"
            );
            return Ok(session);
        }

        let _gate = self.login_gate.lock().await;

        if let Some(session) = self.valid().await {
            tracing::info!("netcup: session was refreshed by another request, reusing it");
            return Ok(session);
        }

        match self.current().await {
            Some(stale) if !stale.id.is_empty() => tracing::warn!(
                expired_at = %stale.expires_at.format("%H:%M:%S"),
                "netcup: session expired, re-authenticating"
            ),
            _ => tracing::info!("netcup: no active session, authenticating"),
        }

        let id = login().await?;
        let now = Utc::now();
        let session = Session {
            id,
            expires_at: now + TimeDelta::from_std(self.lifetime).unwrap_or_else(|_| TimeDelta::zero()),
        };
        *self.current.write().await = Some(session.clone());

        let count = self.login_count.fetch_add(1, Ordering::SeqCst) + 1;
        let first = *self.first_login.write().await.get_or_insert(now);
        tracing::info!(
            login = count,
            since_first_login_secs = (now - first).num_seconds(),
            session = %mask_value(&session.id),
            valid_until = %session.expires_at.format("%H:%M:%S"),
            "netcup: login successful"
        );

        Ok(session)
    }

    /// Drop the cached session; the next call logs in again
    pub async fn invalidate(&self) {
        self.current.write().await.take();
    }

    /// Drop the cached session only if it is still `id`
    ///
    /// A concurrent task may already have replaced a rejected session with a
    /// fresh one; that one must survive.
    pub async fn invalidate_if_current(&self, id: &str) {
        let mut current = self.current.write().await;
        if current.as_ref().is_some_and(|session| session.id == id) {
            current.take();
        }
    }
}
