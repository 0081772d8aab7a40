//! # Credential
//!
//! One-shot credential delivery against the bearer token issued by the
//! token endpoint. The session manager owns the state transition and
//! delegates payload construction to the [`Signer`] capability.
//!
//! [`Signer`]: crate::provider::Signer

use anyhow::Context as _;
use chrono::Utc;
use serde_json::Value;

use crate::error::Error;
use crate::handlers::{Result, SessionManager};
use crate::provider::{Provider, Signer, Subject};
use crate::state::{Session, Stage};
use crate::types::{CredentialHeaders, CredentialRequest, CredentialResponse};

impl SessionManager {
    /// Issue the credential bound to an access token, exactly once.
    ///
    /// Issuance is reserved (`TokenIssued → CredentialIssued`) under the
    /// store's transition lock, then the signer is invoked with the lock
    /// released. Any failure after the reservation rolls it back so the
    /// wallet can retry.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` when no authorization credential is supplied,
    /// `InvalidToken` when the token matches no live session,
    /// `AlreadyIssued` on replay, `InvalidCredentialRequest` when the
    /// request names a configuration not in the session's offer,
    /// `InvalidProof` when a supplied proof does not bind the session's
    /// `c_nonce`, and `SigningError` when the signer capability fails.
    pub async fn credential(
        &self, headers: &CredentialHeaders, request: &CredentialRequest,
        provider: &impl Provider,
    ) -> Result<CredentialResponse> {
        tracing::debug!("credential");

        let Some(access_token) =
            headers.authorization.as_deref().filter(|token| !token.is_empty())
        else {
            return Err(Error::MissingToken("no authorization credential supplied".to_string()));
        };

        let now = Utc::now();
        let reserved = self.store.reserve_issuance(access_token, now + self.issued_ttl, now)?;

        match self.issue(&reserved, request, provider).await {
            Ok(credential) => Ok(CredentialResponse { credential }),
            Err(e) => {
                self.store.rollback_issuance(&reserved);
                Err(e)
            }
        }
    }

    /// Validate the request against the reserved session and invoke the
    /// signer. Runs with no store lock held.
    async fn issue(
        &self, session: &Session, request: &CredentialRequest, provider: &impl Provider,
    ) -> Result<Value> {
        let configuration_id = match &request.credential_configuration_id {
            Some(id) => {
                if !session.credential_configuration_ids.contains(id) {
                    return Err(Error::InvalidCredentialRequest(format!(
                        "credential configuration {id} was not offered in this session"
                    )));
                }
                id
            }
            None => session
                .credential_configuration_ids
                .first()
                .context("session has no offered configurations")?,
        };
        let configuration = self
            .metadata
            .credential_configuration(configuration_id)
            .context("offered configuration missing from issuer metadata")?;

        if let Some(proof) = &request.proof {
            let Stage::TokenIssued(token) = &session.stage else {
                return Err(Error::ServerError("reservation lost token state".to_string()));
            };
            if proof.nonce != token.c_nonce {
                return Err(Error::InvalidProof(
                    "proof does not bind the c_nonce issued with the access token".to_string(),
                ));
            }
        }

        let dataset = Subject::dataset(provider, &session.subject_id, configuration_id)
            .await
            .context("resolving subject dataset")?;

        Signer::sign(provider, &dataset, configuration, request.proof.as_ref())
            .await
            .map_err(|e| Error::SigningError(format!("{e}")))
    }
}
