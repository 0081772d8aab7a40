//! State held for each issuance transaction between steps in the
//! pre-authorized flow.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::CredentialOffer;

/// Default TTLs for each session stage.
pub enum Expire {
    /// Offer awaiting token exchange.
    Offered,
    /// Access token awaiting credential retrieval.
    Access,
    /// Issued session retained so retried credential requests are
    /// recognized as replays.
    Issued,
}

impl Expire {
    /// Duration of the stage.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        match self {
            Self::Offered => TimeDelta::try_minutes(5).unwrap_or_default(),
            Self::Access => TimeDelta::try_minutes(15).unwrap_or_default(),
            Self::Issued => TimeDelta::try_minutes(5).unwrap_or_default(),
        }
    }
}

/// A single offer-to-credential transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// The pre-authorized code identifying the session. Never reused, even
    /// after the session expires.
    pub code: String,

    /// The (previously authenticated) holder the offer was created for.
    pub subject_id: String,

    /// Configuration ids offered in this session, in offer order.
    pub credential_configuration_ids: Vec<String>,

    /// The offer payload, fixed at creation and immutable thereafter.
    pub offer: CredentialOffer,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the current stage lapses.
    pub expires_at: DateTime<Utc>,

    /// Current position in the issuance flow.
    pub stage: Stage,
}

impl Session {
    /// Whether the current stage's TTL has lapsed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// The access token bound to this session, if one has been issued.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        match &self.stage {
            Stage::Offered | Stage::Expired => None,
            Stage::TokenIssued(token) => Some(&token.access_token),
            Stage::CredentialIssued(issued) => Some(&issued.access_token),
        }
    }
}

/// Issuance stages. Transitions are monotonic
/// (`Offered → TokenIssued → CredentialIssued`); any stage can lapse to
/// `Expired`, which is terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    /// Offer created, code not yet exchanged.
    #[default]
    Offered,

    /// Code exchanged for an access token.
    TokenIssued(Token),

    /// Credential delivered, or delivery in flight.
    CredentialIssued(Issued),

    /// TTL lapsed before the flow completed.
    Expired,
}

/// Token stage state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Token {
    /// The bearer access token.
    pub access_token: String,

    /// Nonce the wallet binds into its proof of possession when requesting
    /// the credential.
    pub c_nonce: String,
}

/// Post-issuance state, retained until eviction so a retried credential
/// request is answered as a replay rather than an unknown token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Issued {
    /// The access token the credential was issued against.
    pub access_token: String,

    /// When the credential was issued.
    pub issued_at: DateTime<Utc>,
}
