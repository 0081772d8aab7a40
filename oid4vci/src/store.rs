//! # Session Store
//!
//! An explicit, in-memory store for issuance sessions, constructed at
//! service start and injected into the [`SessionManager`]. Sessions are
//! keyed by pre-authorized code with a secondary index keyed by access
//! token.
//!
//! Every state transition is a check-and-set performed under the map's
//! entry lock: of two concurrent exchanges for the same code, exactly one
//! observes `Offered` and wins. Locks on the session map and the token
//! index are never held at the same time.
//!
//! [`SessionManager`]: crate::SessionManager

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::error::Error;
use crate::handlers::Result;
use crate::state::{Issued, Session, Stage, Token};
use crate::types::CredentialOffer;

/// Default bound on outstanding sessions.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// In-memory issuance session store.
#[derive(Debug)]
pub struct SessionStore {
    /// Live sessions, keyed by pre-authorized code.
    sessions: DashMap<String, Session>,

    /// Access token → pre-authorized code.
    tokens: DashMap<String, String>,

    /// Codes of evicted sessions. A retired code is never accepted again.
    retired: DashSet<String>,

    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store bounded at [`DEFAULT_CAPACITY`] outstanding sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a store bounded at `capacity` outstanding sessions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            tokens: DashMap::new(),
            retired: DashSet::new(),
            capacity,
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Insert a newly offered session.
    ///
    /// The capacity check is made before insertion, so under concurrency the
    /// bound is enforced approximately. Code collisions are rejected rather
    /// than overwritten: a live session is never replaced and a retired code
    /// is never resurrected.
    pub(crate) fn insert(&self, session: Session) -> Result<()> {
        if self.sessions.len() >= self.capacity {
            return Err(Error::CapacityExceeded("session store is full".to_string()));
        }
        if self.retired.contains(&session.code) {
            return Err(Error::ServerError("generated code has already been used".to_string()));
        }
        match self.sessions.entry(session.code.clone()) {
            Entry::Occupied(_) => {
                Err(Error::ServerError("generated code collides with a live session".to_string()))
            }
            Entry::Vacant(entry) => {
                entry.insert(session);
                Ok(())
            }
        }
    }

    /// The offer payload for a live, not-yet-exchanged session.
    pub(crate) fn offer(&self, code: &str, now: DateTime<Utc>) -> Result<CredentialOffer> {
        let Some(session) = self.sessions.get(code) else {
            return Err(Error::UnknownCode("no session for pre-authorized code".to_string()));
        };
        if session.is_expired(now) {
            drop(session);
            self.evict_expired(code, now);
            return Err(Error::UnknownCode("no session for pre-authorized code".to_string()));
        }
        if session.stage != Stage::Offered {
            return Err(Error::UnknownCode("no session for pre-authorized code".to_string()));
        }
        Ok(session.offer.clone())
    }

    /// Exchange a pre-authorized code for the supplied access token,
    /// transitioning `Offered → TokenIssued`.
    ///
    /// The token is not visible to callers until this method returns, so
    /// indexing it after the entry lock is released cannot be observed.
    pub(crate) fn exchange(
        &self, code: &str, token: Token, expires_at: DateTime<Utc>, now: DateTime<Utc>,
    ) -> Result<()> {
        let access_token = token.access_token.clone();
        {
            let Some(mut session) = self.sessions.get_mut(code) else {
                return Err(Error::UnknownCode("no session for pre-authorized code".to_string()));
            };
            if session.is_expired(now) {
                session.stage = Stage::Expired;
                drop(session);
                self.evict_expired(code, now);
                return Err(Error::Expired("pre-authorized code has expired".to_string()));
            }
            match &session.stage {
                Stage::Offered => {
                    session.stage = Stage::TokenIssued(token);
                    session.expires_at = expires_at;
                }
                Stage::TokenIssued(_) | Stage::CredentialIssued(_) => {
                    return Err(Error::AlreadyExchanged(
                        "pre-authorized code has already been exchanged".to_string(),
                    ));
                }
                Stage::Expired => {
                    return Err(Error::Expired("pre-authorized code has expired".to_string()));
                }
            }
        }
        self.tokens.insert(access_token, code.to_string());
        Ok(())
    }

    /// Reserve credential issuance for an access token, transitioning
    /// `TokenIssued → CredentialIssued` and returning a snapshot of the
    /// session as it was before the transition.
    ///
    /// Reserving before signing keeps the signer call outside the entry
    /// lock; [`Self::rollback_issuance`] undoes the reservation if signing
    /// fails.
    pub(crate) fn reserve_issuance(
        &self, access_token: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>,
    ) -> Result<Session> {
        let Some(code) = self.tokens.get(access_token).map(|entry| entry.value().clone()) else {
            return Err(Error::InvalidToken("token does not match an issuance session".to_string()));
        };
        let Some(mut session) = self.sessions.get_mut(&code) else {
            // session evicted between index and map lookups
            return Err(Error::InvalidToken("token does not match an issuance session".to_string()));
        };
        if session.is_expired(now) {
            session.stage = Stage::Expired;
            drop(session);
            self.evict_expired(&code, now);
            return Err(Error::InvalidToken("access token has expired".to_string()));
        }
        match &session.stage {
            Stage::TokenIssued(token) if token.access_token == access_token => {
                let snapshot = session.clone();
                session.stage = Stage::CredentialIssued(Issued {
                    access_token: access_token.to_string(),
                    issued_at: now,
                });
                session.expires_at = expires_at;
                Ok(snapshot)
            }
            Stage::CredentialIssued(_) => Err(Error::AlreadyIssued(
                "credential has already been issued for this token".to_string(),
            )),
            _ => Err(Error::InvalidToken("token does not match an issuance session".to_string())),
        }
    }

    /// Undo an issuance reservation after a signing failure so the wallet
    /// can retry. A concurrent request inside the failure window sees
    /// `AlreadyIssued`; once rolled back, a retry succeeds.
    pub(crate) fn rollback_issuance(&self, snapshot: &Session) {
        let Some(mut session) = self.sessions.get_mut(&snapshot.code) else {
            return;
        };
        if let Stage::CredentialIssued(issued) = &session.stage {
            if Some(issued.access_token.as_str()) == snapshot.access_token() {
                session.stage = snapshot.stage.clone();
                session.expires_at = snapshot.expires_at;
            }
        }
    }

    /// Evict every session whose TTL has lapsed, in any stage. Returns the
    /// number of sessions evicted.
    ///
    /// Eviction re-checks expiry under the entry lock, so a sweep cannot
    /// race destructively with an in-flight transition.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let lapsed: Vec<String> = self
            .sessions
            .iter()
            .filter(|session| session.is_expired(now))
            .map(|session| session.key().clone())
            .collect();
        lapsed.into_iter().filter(|code| self.evict_expired(code, now)).count()
    }

    /// Remove a session if its TTL has lapsed, clean up its token binding,
    /// and retire its code. The predicate runs under the entry lock.
    fn evict_expired(&self, code: &str, now: DateTime<Utc>) -> bool {
        let Some((code, session)) =
            self.sessions.remove_if(code, |_, session| session.is_expired(now))
        else {
            return false;
        };
        if let Some(token) = session.access_token() {
            self.tokens.remove(token);
        }
        self.retired.insert(code);
        true
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeDelta;

    use super::*;
    use crate::types::CredentialOffer;

    fn session(code: &str, expires_at: DateTime<Utc>) -> Session {
        Session {
            code: code.to_string(),
            subject_id: "normal_user".to_string(),
            credential_configuration_ids: vec!["Ticket_JWT".to_string()],
            offer: CredentialOffer::default(),
            created_at: Utc::now(),
            expires_at,
            stage: Stage::Offered,
        }
    }

    fn token(access_token: &str) -> Token {
        Token {
            access_token: access_token.to_string(),
            c_nonce: "nonce".to_string(),
        }
    }

    #[test]
    fn capacity_bound() {
        let store = SessionStore::with_capacity(2);
        let expires = Utc::now() + TimeDelta::try_minutes(5).unwrap_or_default();

        store.insert(session("one", expires)).expect("inserts");
        store.insert(session("two", expires)).expect("inserts");
        let err = store.insert(session("three", expires)).expect_err("store is full");
        assert!(matches!(err, Error::CapacityExceeded(_)));
    }

    #[test]
    fn duplicate_code_rejected() {
        let store = SessionStore::new();
        let expires = Utc::now() + TimeDelta::try_minutes(5).unwrap_or_default();

        store.insert(session("dup", expires)).expect("inserts");
        let err = store.insert(session("dup", expires)).expect_err("code is live");
        assert!(matches!(err, Error::ServerError(_)));
    }

    #[test]
    fn retired_code_never_reused() {
        let store = SessionStore::new();
        let now = Utc::now();

        store.insert(session("spent", now - TimeDelta::try_seconds(1).unwrap_or_default()))
            .expect("inserts");
        assert_eq!(store.sweep_expired(now), 1);

        let expires = now + TimeDelta::try_minutes(5).unwrap_or_default();
        let err = store.insert(session("spent", expires)).expect_err("code is retired");
        assert!(matches!(err, Error::ServerError(_)));
    }

    #[test]
    fn exchange_is_one_shot() {
        let store = SessionStore::new();
        let now = Utc::now();
        let expires = now + TimeDelta::try_minutes(5).unwrap_or_default();

        store.insert(session("code", expires)).expect("inserts");
        store.exchange("code", token("tok"), expires, now).expect("first exchange wins");

        let err = store.exchange("code", token("tok2"), expires, now).expect_err("replay");
        assert!(matches!(err, Error::AlreadyExchanged(_)));
    }

    #[test]
    fn eviction_cleans_token_index() {
        let store = SessionStore::new();
        let now = Utc::now();
        let expires = now + TimeDelta::try_minutes(5).unwrap_or_default();

        store.insert(session("code", expires)).expect("inserts");
        store.exchange("code", token("tok"), expires, now).expect("exchanges");

        // lapse the token stage and sweep
        let later = expires + TimeDelta::try_seconds(1).unwrap_or_default();
        assert_eq!(store.sweep_expired(later), 1);

        let err = store.reserve_issuance("tok", later, later).expect_err("binding removed");
        assert!(matches!(err, Error::InvalidToken(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn rollback_restores_token_stage() {
        let store = SessionStore::new();
        let now = Utc::now();
        let expires = now + TimeDelta::try_minutes(5).unwrap_or_default();

        store.insert(session("code", expires)).expect("inserts");
        store.exchange("code", token("tok"), expires, now).expect("exchanges");

        let snapshot = store.reserve_issuance("tok", expires, now).expect("reserves");
        let err = store.reserve_issuance("tok", expires, now).expect_err("reserved");
        assert!(matches!(err, Error::AlreadyIssued(_)));

        store.rollback_issuance(&snapshot);
        store.reserve_issuance("tok", expires, now).expect("retry succeeds after rollback");
    }
}
