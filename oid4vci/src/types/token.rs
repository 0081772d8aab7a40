use serde::{Deserialize, Serialize};

/// A Token Request as defined in [RFC6749], restricted to the
/// Pre-Authorized Code extension grant.
///
/// [RFC6749]: https://www.rfc-editor.org/rfc/rfc6749.html
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenRequest {
    /// Authorization grant type.
    pub grant_type: GrantType,

    /// The pre-authorized code received in the Credential Offer.
    #[serde(rename = "pre-authorized_code")]
    pub pre_authorized_code: String,
}

/// Grant types accepted by the token endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum GrantType {
    /// Pre-Authorized Code Flow.
    #[default]
    #[serde(rename = "urn:ietf:params:oauth:grant-type:pre-authorized_code")]
    PreAuthorizedCode,
}

/// A successful Token Response.
///
/// Responses containing tokens must be served with
/// `Cache-Control: no-store`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// The bearer access token. Single-use: redeemable for a credential
    /// exactly once.
    pub access_token: String,

    /// Token type. Always `Bearer`.
    pub token_type: TokenType,

    /// Lifetime in seconds of the access token.
    pub expires_in: i64,

    /// Nonce for the wallet to bind into its proof of possession when
    /// requesting the credential.
    pub c_nonce: String,

    /// Lifetime in seconds of the `c_nonce`.
    pub c_nonce_expires_in: i64,
}

/// Access token types supported by the issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum TokenType {
    /// Bearer token, as defined in [RFC6750].
    ///
    /// [RFC6750]: https://www.rfc-editor.org/rfc/rfc6750.html
    #[default]
    Bearer,
}

#[cfg(test)]
mod test {
    use super::*;

    // The token endpoint receives form-encoded requests.
    #[test]
    fn form_decode() {
        let form = "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Apre-authorized_code\
                    &pre-authorized_code=oaKazRN8I0IbtZ0C7JuMn5";
        let request: TokenRequest = serde_urlencoded::from_str(form).expect("should deserialize");

        assert_eq!(request.grant_type, GrantType::PreAuthorizedCode);
        assert_eq!(request.pre_authorized_code, "oaKazRN8I0IbtZ0C7JuMn5");
    }

    #[test]
    fn unsupported_grant_rejected() {
        let form = "grant_type=authorization_code&pre-authorized_code=abc";
        serde_urlencoded::from_str::<TokenRequest>(form).expect_err("unsupported grant type");
    }
}
