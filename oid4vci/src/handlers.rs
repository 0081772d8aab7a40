//! # Handlers
//!
//! Entry points for issuance operations, one per endpoint. Each operation
//! is a method on [`SessionManager`], which owns the injected session
//! store and the issuer configuration.

mod create_offer;
mod credential;
mod credential_offer;
mod token;

use chrono::{TimeDelta, Utc};

use crate::error::Error;
use crate::state::Expire;
use crate::store::SessionStore;
use crate::types::IssuerMetadata;

/// Result type for issuance operations.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Drives issuance sessions from offer creation through credential
/// delivery.
///
/// Constructed at service start with a [`SessionStore`] and destroyed at
/// shutdown; shared between request handlers (all operations take
/// `&self`).
#[derive(Debug)]
pub struct SessionManager {
    pub(crate) store: SessionStore,
    pub(crate) metadata: IssuerMetadata,
    pub(crate) offer_ttl: TimeDelta,
    pub(crate) access_ttl: TimeDelta,
    pub(crate) issued_ttl: TimeDelta,
}

impl SessionManager {
    /// Create a manager over the given store with default TTLs (see
    /// [`Expire`]).
    #[must_use]
    pub fn new(store: SessionStore, metadata: IssuerMetadata) -> Self {
        Self {
            store,
            metadata,
            offer_ttl: Expire::Offered.duration(),
            access_ttl: Expire::Access.duration(),
            issued_ttl: Expire::Issued.duration(),
        }
    }

    /// Create a builder to override TTLs.
    #[must_use]
    pub fn builder(store: SessionStore, metadata: IssuerMetadata) -> SessionManagerBuilder {
        SessionManagerBuilder::new(store, metadata)
    }

    /// The issuer configuration offers are validated against.
    #[must_use]
    pub const fn metadata(&self) -> &IssuerMetadata {
        &self.metadata
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Evict sessions whose TTL has lapsed, in any stage. Returns the
    /// number evicted.
    ///
    /// Expiry is also applied opportunistically on lookup, so sweeping is
    /// a memory bound rather than a correctness requirement. Safe to call
    /// concurrently with any operation.
    pub fn sweep_expired(&self) -> usize {
        let swept = self.store.sweep_expired(Utc::now());
        if swept > 0 {
            tracing::debug!("swept {swept} expired sessions");
        }
        swept
    }
}

/// Build a [`SessionManager`] with non-default TTLs.
#[derive(Debug)]
pub struct SessionManagerBuilder {
    manager: SessionManager,
}

impl SessionManagerBuilder {
    fn new(store: SessionStore, metadata: IssuerMetadata) -> Self {
        Self {
            manager: SessionManager::new(store, metadata),
        }
    }

    /// Override the offer TTL: how long a pre-authorized code remains
    /// exchangeable.
    #[must_use]
    pub const fn offer_ttl(mut self, ttl: TimeDelta) -> Self {
        self.manager.offer_ttl = ttl;
        self
    }

    /// Override the access token TTL.
    #[must_use]
    pub const fn access_ttl(mut self, ttl: TimeDelta) -> Self {
        self.manager.access_ttl = ttl;
        self
    }

    /// Override the grace period an issued session is retained for after
    /// credential delivery.
    #[must_use]
    pub const fn issued_ttl(mut self, ttl: TimeDelta) -> Self {
        self.manager.issued_ttl = ttl;
        self
    }

    /// Build the manager.
    #[must_use]
    pub fn build(self) -> SessionManager {
        self.manager
    }
}
