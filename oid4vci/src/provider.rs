//! # Provider Traits
//!
//! Capabilities the issuance flow consumes but does not own: holder
//! subject data and credential signing. Implementers supply both; the
//! session manager only drives state transitions and delegates payload
//! construction.

use std::future::Future;

use anyhow::Result;
use serde_json::Value;

use crate::types::{CredentialConfiguration, Dataset, ProofOfPossession};

/// Issuer provider: the capabilities required to complete credential
/// issuance.
pub trait Provider: Subject + Signer + Clone {}

/// A blanket implementation for `Provider` so that any type implementing
/// the required super traits is considered a `Provider`.
impl<T> Provider for T where T: Subject + Signer + Clone {}

/// The `Subject` trait specifies how issuance subject (holder) information
/// is provided by implementers.
pub trait Subject: Send + Sync {
    /// Returns a populated [`Dataset`] for the given holder and credential
    /// configuration.
    fn dataset(
        &self, subject_id: &str, credential_configuration_id: &str,
    ) -> impl Future<Output = Result<Dataset>> + Send;
}

/// The `Signer` trait is the opaque credential-signing capability: a local
/// key-based signer, a remote HSM-backed service, or anything in between.
pub trait Signer: Send + Sync {
    /// Produce a signed credential payload over the holder dataset, in the
    /// configuration's declared format, optionally bound to the holder key
    /// evidenced by `proof`.
    fn sign(
        &self, dataset: &Dataset, configuration: &CredentialConfiguration,
        proof: Option<&ProofOfPossession>,
    ) -> impl Future<Output = Result<Value>> + Send;
}
