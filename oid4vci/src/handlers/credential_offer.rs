//! # Credential Offer
//!
//! Returns a previously generated Credential Offer by its pre-authorized
//! code, for wallets that receive the offer by reference rather than by
//! value.

use chrono::Utc;

use crate::handlers::{Result, SessionManager};
use crate::types::{CredentialOfferRequest, CredentialOfferResponse};

impl SessionManager {
    /// Retrieve the offer payload for a live, not-yet-exchanged session.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCode` when no open session exists for the code —
    /// never issued, already exchanged, or expired and evicted.
    pub fn credential_offer(
        &self, request: &CredentialOfferRequest,
    ) -> Result<CredentialOfferResponse> {
        tracing::debug!("credential_offer");

        let offer = self.store.offer(&request.code, Utc::now())?;
        Ok(CredentialOfferResponse(offer))
    }
}
