use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::types::CredentialConfiguration;

/// Request a Credential Offer for a previously authenticated holder.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CreateOfferRequest {
    /// Identifies the (previously authenticated) holder the offer is for,
    /// so the issuer can build credential datasets at issuance time.
    pub subject_id: String,

    /// Keys into the issuer's supported credential configurations.
    pub credential_configuration_ids: Vec<String>,
}

impl CreateOfferRequest {
    /// Create a new `CreateOfferRequestBuilder`.
    #[must_use]
    pub fn builder() -> CreateOfferRequestBuilder {
        CreateOfferRequestBuilder::new()
    }
}

/// Build a Create Offer request.
#[derive(Clone, Debug, Default)]
pub struct CreateOfferRequestBuilder {
    subject_id: String,
    credential_configuration_ids: Vec<String>,
}

impl CreateOfferRequestBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the holder the offer is for.
    #[must_use]
    pub fn subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = subject_id.into();
        self
    }

    /// Add a credential to the offer by its configuration id.
    #[must_use]
    pub fn with_credential(mut self, configuration_id: impl Into<String>) -> Self {
        self.credential_configuration_ids.push(configuration_id.into());
        self
    }

    /// Build the request.
    #[must_use]
    pub fn build(self) -> CreateOfferRequest {
        CreateOfferRequest {
            subject_id: self.subject_id,
            credential_configuration_ids: self.credential_configuration_ids,
        }
    }
}

/// The response to a Create Offer request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateOfferResponse {
    /// The offer to present to the wallet, containing the pre-authorized
    /// code grant.
    pub credential_offer: CredentialOffer,
}

/// A Credential Offer: what can be issued and how to obtain it. Fixed when
/// the issuance session is created and immutable thereafter.
///
/// Presented to the wallet as a QR code or deep link; see
/// [`Self::to_uri`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialOffer {
    /// The URL of the Credential Issuer the wallet obtains the credential
    /// from.
    pub credential_issuer: String,

    /// The credentials offered to the wallet.
    pub credentials: Vec<CredentialConfiguration>,

    /// Grants the issuer will accept for this offer.
    pub grants: Grants,
}

impl CredentialOffer {
    /// The offer's pre-authorized code.
    #[must_use]
    pub fn pre_authorized_code(&self) -> &str {
        &self.grants.pre_authorized_code.pre_authorized_code
    }

    /// Render the offer as an `openid-credential-offer://` URI for a QR
    /// code or deep link.
    ///
    /// # Errors
    ///
    /// Returns an error if the offer cannot be serialized.
    pub fn to_uri(&self) -> anyhow::Result<String> {
        Ok(format!("openid-credential-offer://?{}", self.to_querystring()?))
    }

    /// The offer as a `credential_offer` query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the offer cannot be serialized.
    pub fn to_querystring(&self) -> anyhow::Result<String> {
        let json = serde_json::to_string(self).context("serializing credential offer")?;
        serde_urlencoded::to_string([("credential_offer", json)])
            .context("encoding credential offer")
    }
}

/// Grant parameters carried in a Credential Offer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Grants {
    /// Pre-Authorized Code Grant.
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    pub pre_authorized_code: PreAuthorizedCodeGrant,
}

/// Parameters of the Pre-Authorized Code Grant.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PreAuthorizedCodeGrant {
    /// The issuer's authorization for the wallet to obtain the offered
    /// credentials. Short-lived and single-use: presented in the subsequent
    /// Token Request.
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: String,

    /// Whether the token endpoint additionally requires a user PIN. Always
    /// `false` for this issuer.
    pub user_pin_required: bool,
}

/// Retrieve a previously generated Credential Offer by its pre-authorized
/// code.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialOfferRequest {
    /// The offer's pre-authorized code.
    pub code: String,
}

/// A previously generated Credential Offer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CredentialOfferResponse(pub CredentialOffer);

#[cfg(test)]
mod test {
    use crate::types::Format;

    use super::*;

    fn offer() -> CredentialOffer {
        CredentialOffer {
            credential_issuer: "https://issuer.example.com".to_string(),
            credentials: vec![CredentialConfiguration {
                format: Format::JwtVcJson,
                types: vec!["VerifiableCredential".to_string(), "TicketCredential".to_string()],
            }],
            grants: Grants {
                pre_authorized_code: PreAuthorizedCodeGrant {
                    pre_authorized_code: "oaKazRN8I0IbtZ0C7JuMn5".to_string(),
                    user_pin_required: false,
                },
            },
        }
    }

    #[test]
    fn serialize() {
        let offer = offer();
        let ser = serde_json::to_string(&offer).expect("should serialize to string");
        assert!(ser.contains(r#""urn:ietf:params:oauth:grant-type:pre-authorized_code""#));
        assert!(ser.contains(r#""pre-authorized_code":"oaKazRN8I0IbtZ0C7JuMn5""#));

        let offer2: CredentialOffer =
            serde_json::from_str(&ser).expect("should deserialize from string");
        assert_eq!(offer, offer2);
    }

    #[test]
    fn uri() {
        let uri = offer().to_uri().expect("should serialize");
        assert!(uri.starts_with("openid-credential-offer://?credential_offer="));
        assert!(!uri.contains('{'));
    }
}
