use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::CredentialConfiguration;

/// Static issuer configuration. Offers are validated against it and the
/// well-known metadata document is derived from it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerMetadata {
    /// The Credential Issuer's base URL.
    pub credential_issuer: String,

    /// Credentials this issuer can issue, keyed by configuration id.
    pub credential_configurations_supported: HashMap<String, CredentialConfiguration>,
}

impl IssuerMetadata {
    /// The configuration registered for `credential_configuration_id`.
    #[must_use]
    pub fn credential_configuration(&self, id: &str) -> Option<&CredentialConfiguration> {
        self.credential_configurations_supported.get(id)
    }
}
