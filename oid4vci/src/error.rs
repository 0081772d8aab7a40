//! # Issuance Errors
//!
//! This module defines errors for the pre-authorized issuance flow. Each
//! failure path has its own variant so an HTTP adapter can map it to the
//! correct status code without parsing descriptions.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for pre-authorized credential issuance.
#[derive(Error, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, or is otherwise malformed.
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidRequest(String),

    /// The requested credential configuration is not supported by this
    /// issuer.
    #[error(r#"{{"error": "unsupported_credential_type", "error_description": "{0}"}}"#)]
    UnsupportedCredentialType(String),

    /// No issuance session exists for the presented pre-authorized code:
    /// the code was never issued, or its session has expired and been
    /// evicted.
    #[error(r#"{{"error": "unknown_code", "error_description": "{0}"}}"#)]
    UnknownCode(String),

    /// The pre-authorized code has already been exchanged for an access
    /// token. A code is redeemable exactly once.
    #[error(r#"{{"error": "already_exchanged", "error_description": "{0}"}}"#)]
    AlreadyExchanged(String),

    /// The issuance session's TTL lapsed before the code was exchanged.
    #[error(r#"{{"error": "expired", "error_description": "{0}"}}"#)]
    Expired(String),

    /// The session store's outstanding-session bound has been reached.
    #[error(r#"{{"error": "capacity_exceeded", "error_description": "{0}"}}"#)]
    CapacityExceeded(String),

    /// No authorization credential was supplied with the credential
    /// request.
    #[error(r#"{{"error": "missing_token", "error_description": "{0}"}}"#)]
    MissingToken(String),

    /// The presented access token does not match a live issuance session.
    #[error(r#"{{"error": "invalid_token", "error_description": "{0}"}}"#)]
    InvalidToken(String),

    /// A credential has already been issued for the presented access token.
    /// A token is redeemable exactly once.
    #[error(r#"{{"error": "already_issued", "error_description": "{0}"}}"#)]
    AlreadyIssued(String),

    /// The supplied proof of possession does not bind the `c_nonce` issued
    /// with the access token.
    #[error(r#"{{"error": "invalid_proof", "error_description": "{0}"}}"#)]
    InvalidProof(String),

    /// The credential request names a configuration that was not offered in
    /// this session.
    #[error(r#"{{"error": "invalid_credential_request", "error_description": "{0}"}}"#)]
    InvalidCredentialRequest(String),

    /// The credential signer capability failed to produce a payload.
    #[error(r#"{{"error": "signing_error", "error_description": "{0}"}}"#)]
    SigningError(String),

    /// An unexpected condition prevented the request from being fulfilled.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),
}

impl Error {
    /// The HTTP status code an adapter should return for this error: client
    /// misuse and replay map to 4xx, store capacity to 503, signing and
    /// internal failures to 500.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::UnsupportedCredentialType(_)
            | Self::InvalidProof(_)
            | Self::InvalidCredentialRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnknownCode(_)
            | Self::AlreadyExchanged(_)
            | Self::Expired(_)
            | Self::MissingToken(_)
            | Self::InvalidToken(_)
            | Self::AlreadyIssued(_) => StatusCode::UNAUTHORIZED,
            Self::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SigningError(_) | Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<Self>() {
            Ok(err) => err,
            Err(err) => {
                let stack = err.chain().fold(String::new(), |cause, e| format!("{cause} -> {e}"));
                let stack = stack.trim_start_matches(" -> ").to_string();
                Self::ServerError(stack)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use anyhow::{Context, Result, anyhow};
    use serde_json::{Value, json};

    use super::*;

    // Error details are returned as json.
    #[test]
    fn issuance_context() {
        let result = Err::<(), Error>(Error::AlreadyExchanged("code already exchanged".to_string()))
            .context("token request");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "already_exchanged", "error_description": "code already exchanged"}"#
        );
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn anyhow_context() {
        let result = Err::<(), anyhow::Error>(anyhow!("one-off error")).context("error context");
        let err: Error = result.unwrap_err().into();

        assert_eq!(
            err.to_string(),
            r#"{"error": "server_error", "error_description": "error context -> one-off error"}"#
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn serde_context() {
        let result: Result<Value, anyhow::Error> =
            serde_json::from_str(r#"{"foo": "bar""#).context("error context");
        let err: Error = result.unwrap_err().into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // Error details are returned as an http query string.
    #[test]
    fn querystring() {
        let err = Error::InvalidToken("token does not match a session".to_string());
        let ser = serde_urlencoded::to_string(&err).unwrap();
        assert_eq!(ser, "error=invalid_token&error_description=token+does+not+match+a+session");
    }

    #[test]
    fn json() {
        let err = Error::UnknownCode("no session for code".to_string());
        let ser = serde_json::to_value(&err).unwrap();
        assert_eq!(
            ser,
            json!({"error": "unknown_code", "error_description": "no session for code"})
        );
    }
}
