//! # Token
//!
//! The token endpoint issues an access token in exchange for the
//! pre-authorized code obtained from a Credential Offer, as defined in
//! [RFC6749](https://tools.ietf.org/html/rfc6749#section-5.1).
//!
//! Responses containing tokens must be served with
//! `Cache-Control: no-store`.

use chrono::Utc;

use crate::error::Error;
use crate::generate;
use crate::handlers::{Result, SessionManager};
use crate::state::Token;
use crate::types::{TokenRequest, TokenResponse, TokenType};

impl SessionManager {
    /// Exchange a pre-authorized code for an access token, transitioning
    /// the session `Offered → TokenIssued`. A code is redeemable exactly
    /// once: of two concurrent exchanges, one wins and the other observes
    /// `AlreadyExchanged`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCode` when no session exists for the code,
    /// `AlreadyExchanged` when the code has been redeemed, and `Expired`
    /// when the offer TTL lapsed — expiry also evicts the session.
    pub fn token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        tracing::debug!("token");

        if request.pre_authorized_code.is_empty() {
            return Err(Error::UnknownCode("no pre-authorized code supplied".to_string()));
        }

        let token = Token {
            access_token: generate::token(),
            c_nonce: generate::nonce(),
        };

        let now = Utc::now();
        self.store.exchange(
            &request.pre_authorized_code,
            token.clone(),
            now + self.access_ttl,
            now,
        )?;

        Ok(TokenResponse {
            access_token: token.access_token,
            token_type: TokenType::Bearer,
            expires_in: self.access_ttl.num_seconds(),
            c_nonce: token.c_nonce,
            c_nonce_expires_in: self.access_ttl.num_seconds(),
        })
    }
}
