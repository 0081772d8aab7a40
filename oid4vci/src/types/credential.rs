use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire formats for issued credentials.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Format {
    /// W3C Verifiable Credential as a signed JWT, claims not selectively
    /// disclosable.
    #[default]
    #[serde(rename = "jwt_vc_json")]
    JwtVcJson,
}

impl Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtVcJson => write!(f, "jwt_vc_json"),
        }
    }
}

/// A credential the issuer can issue: its wire format and type hierarchy.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialConfiguration {
    /// Credential wire format.
    pub format: Format,

    /// Credential type hierarchy, most general first.
    pub types: Vec<String>,
}

/// A Credential Request, authorized by the access token from the preceding
/// Token Response.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CredentialRequest {
    /// The configuration to issue when the offer contains more than one.
    /// Defaults to the first offered configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_configuration_id: Option<String>,

    /// Proof of possession of the holder's key material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofOfPossession>,
}

/// Evidence that the wallet controls the key the credential will be bound
/// to: the `c_nonce` from the Token Response, countersigned by the holder
/// key.
///
/// The JWS is opaque here; cryptographic verification belongs to the
/// signer capability. The clear-text nonce lets the session core enforce
/// the replay binding without touching key material.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProofOfPossession {
    /// The `c_nonce` the proof was created over.
    pub nonce: String,

    /// Compact JWS over the nonce, signed with the holder's key.
    pub jws: String,
}

/// Headers accompanying a Credential Request.
#[derive(Clone, Debug, Default)]
pub struct CredentialHeaders {
    /// Bearer token from the `Authorization` header, if one was supplied.
    pub authorization: Option<String>,
}

/// A successful Credential Response.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialResponse {
    /// The signed credential payload, in the offer's declared format.
    pub credential: Value,
}
