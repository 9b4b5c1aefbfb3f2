// crates/pulso-core/src/runtime/session.rs
// ============================================================================
// Module: Pulso Session Management
// Description: Session persistence and login/logout orchestration.
// Purpose: Keep the authenticated session durable across restarts.
// Dependencies: crate::core, crate::interfaces, crate::runtime::queue
// ============================================================================

//! ## Overview
//! The session manager persists the authenticated session in the store's
//! cache namespace so the app survives restarts while offline. Login
//! requires connectivity, exchanges credentials through the transport, and
//! then flushes the submission queue silently: anything captured while
//! delivery was impossible goes out immediately. Logout deletes the cached
//! session and leaves queued records untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::record::CACHE_KEY_CONFIG;
use crate::core::record::CACHE_KEY_SESSION;
use crate::core::record::CacheEntry;
use crate::core::record::Session;
use crate::core::time::Timestamp;
use crate::interfaces::DurableStore;
use crate::interfaces::RemoteConfig;
use crate::interfaces::StoreError;
use crate::interfaces::Transport;
use crate::interfaces::TransportError;
use crate::runtime::queue::SubmissionQueue;
use crate::runtime::queue::SyncMode;
use crate::runtime::queue::SyncReport;

// ============================================================================
// SECTION: Session Errors
// ============================================================================

/// Session management errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Auth failures never affect already-queued pending records.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Transport failure during login or config fetch.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Login was attempted without connectivity.
    #[error("login requires connectivity")]
    Offline,
    /// Cached session payload did not deserialize.
    #[error("cached session is malformed: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Login Outcome
// ============================================================================

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Session issued by the endpoint.
    pub session: Session,
    /// Report of the post-login silent flush, when one ran to completion.
    pub flush: Option<SyncReport>,
}

// ============================================================================
// SECTION: Session Manager
// ============================================================================

/// Persists and refreshes the authenticated session.
///
/// # Invariants
/// - The session lives under the `session` cache key; one entry at most.
pub struct SessionManager {
    /// Durable store holding the cache namespace.
    store: Arc<dyn DurableStore>,
    /// Transport to the remote endpoint.
    transport: Arc<dyn Transport>,
}

impl SessionManager {
    /// Creates a manager over the provided store and transport.
    #[must_use]
    pub fn new(store: Arc<dyn DurableStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            store,
            transport,
        }
    }

    /// Loads the cached session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the read fails and
    /// [`SessionError::Malformed`] when the cached payload does not parse.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let Some(entry) = self.store.get_cache(CACHE_KEY_SESSION)? else {
            return Ok(None);
        };
        let session: Session = serde_json::from_value(entry.value)
            .map_err(|err| SessionError::Malformed(err.to_string()))?;
        Ok(Some(session))
    }

    /// Persists a session under the `session` cache key.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the write fails.
    pub fn persist(&self, session: &Session, saved_at: Timestamp) -> Result<(), SessionError> {
        let value = serde_json::to_value(session)
            .map_err(|err| SessionError::Malformed(err.to_string()))?;
        self.store.put_cache(&CacheEntry {
            key: CACHE_KEY_SESSION.to_string(),
            value,
            saved_at,
        })?;
        Ok(())
    }

    /// Exchanges credentials for a session, persists it, and silently
    /// flushes the submission queue.
    ///
    /// The flush is best-effort: a flush failure (including a pass already
    /// in flight) does not fail the login, and its report is simply absent
    /// from the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Offline`] without side effects when the
    /// transport reports no connectivity, [`SessionError::Transport`] when
    /// the endpoint rejects the credentials or is unreachable, and
    /// [`SessionError::Store`] when the session cannot be persisted.
    pub fn login(
        &self,
        usuario: &str,
        password: &str,
        now: Timestamp,
        queue: &SubmissionQueue,
    ) -> Result<LoginOutcome, SessionError> {
        if !self.transport.is_online() {
            return Err(SessionError::Offline);
        }
        let session = self.transport.login(usuario, password)?;
        self.persist(&session, now)?;
        let flush = queue.sync(SyncMode::Silent, now).ok();
        Ok(LoginOutcome {
            session,
            flush,
        })
    }

    /// Deletes the cached session. Queued records are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the delete fails.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.delete_cache(CACHE_KEY_SESSION)?;
        Ok(())
    }

    /// Fetches the cosmetic remote configuration and caches it verbatim
    /// under the `config` cache key.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] when the fetch fails and
    /// [`SessionError::Store`] when the cache write fails.
    pub fn refresh_remote_config(&self, now: Timestamp) -> Result<RemoteConfig, SessionError> {
        let config = self.transport.fetch_config()?;
        let value = serde_json::to_value(&config)
            .map_err(|err| SessionError::Malformed(err.to_string()))?;
        self.store.put_cache(&CacheEntry {
            key: CACHE_KEY_CONFIG.to_string(),
            value,
            saved_at: now,
        })?;
        Ok(config)
    }

    /// Loads the cached remote configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the read fails and
    /// [`SessionError::Malformed`] when the cached payload does not parse.
    pub fn cached_remote_config(&self) -> Result<Option<RemoteConfig>, SessionError> {
        let Some(entry) = self.store.get_cache(CACHE_KEY_CONFIG)? else {
            return Ok(None);
        };
        let config: RemoteConfig = serde_json::from_value(entry.value)
            .map_err(|err| SessionError::Malformed(err.to_string()))?;
        Ok(Some(config))
    }
}
