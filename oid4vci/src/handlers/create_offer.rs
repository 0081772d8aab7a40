//! # Create Offer
//!
//! Generates a Credential Offer and opens its issuance session. The offer
//! carries a single-use pre-authorized code which the wallet presents to
//! the token endpoint.
//!
//! See <https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html#name-credential-offer-endpoint>

use chrono::Utc;

use crate::error::Error;
use crate::generate;
use crate::handlers::{Result, SessionManager};
use crate::state::{Session, Stage};
use crate::types::{
    CreateOfferRequest, CreateOfferResponse, CredentialOffer, Grants, IssuerMetadata,
    PreAuthorizedCodeGrant,
};

impl SessionManager {
    /// Generate a Credential Offer and open a session in the `Offered`
    /// stage.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the request is malformed,
    /// `UnsupportedCredentialType` when a requested configuration is not in
    /// the issuer's metadata, and `CapacityExceeded` when the session store
    /// is at its outstanding-session bound.
    pub fn create_offer(&self, request: &CreateOfferRequest) -> Result<CreateOfferResponse> {
        tracing::debug!("create_offer");

        request.verify(&self.metadata)?;

        let code = generate::code();
        let credentials = request
            .credential_configuration_ids
            .iter()
            .filter_map(|id| self.metadata.credential_configuration(id))
            .cloned()
            .collect();

        let credential_offer = CredentialOffer {
            credential_issuer: self.metadata.credential_issuer.clone(),
            credentials,
            grants: Grants {
                pre_authorized_code: PreAuthorizedCodeGrant {
                    pre_authorized_code: code.clone(),
                    user_pin_required: false,
                },
            },
        };

        let now = Utc::now();
        self.store.insert(Session {
            code,
            subject_id: request.subject_id.clone(),
            credential_configuration_ids: request.credential_configuration_ids.clone(),
            offer: credential_offer.clone(),
            created_at: now,
            expires_at: now + self.offer_ttl,
            stage: Stage::Offered,
        })?;

        Ok(CreateOfferResponse { credential_offer })
    }
}

impl CreateOfferRequest {
    fn verify(&self, metadata: &IssuerMetadata) -> Result<()> {
        tracing::debug!("create_offer::verify");

        if self.subject_id.is_empty() {
            return Err(Error::InvalidRequest("no subject_id specified".to_string()));
        }
        if self.credential_configuration_ids.is_empty() {
            return Err(Error::InvalidRequest("no credentials requested".to_string()));
        }
        for id in &self.credential_configuration_ids {
            if metadata.credential_configuration(id).is_none() {
                return Err(Error::UnsupportedCredentialType(format!(
                    "credential configuration {id} is not supported"
                )));
            }
        }

        Ok(())
    }
}
