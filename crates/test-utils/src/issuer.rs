//! # Test Issuer Provider
//!
//! An in-memory `Subject` + `Signer` provider for tests and examples. The
//! signer fabricates a W3C credential with a stub proof block — real
//! deployments plug in a key-based or HSM-backed signer instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use oid4vci_issuance::provider::{Signer, Subject};
use oid4vci_issuance::types::{
    CredentialConfiguration, Dataset, Format, IssuerMetadata, ProofOfPossession,
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Issuer base URL used across tests.
pub const CREDENTIAL_ISSUER: &str = "http://localhost:8080";

/// A holder known to the test provider.
pub const NORMAL_USER: &str = "normal_user";

/// Configuration id of the test event-ticket credential.
pub const TICKET_CONFIGURATION: &str = "Ticket_JWT";

/// Issuer metadata matching the test provider's datasets.
#[must_use]
pub fn metadata() -> IssuerMetadata {
    IssuerMetadata {
        credential_issuer: CREDENTIAL_ISSUER.to_string(),
        credential_configurations_supported: HashMap::from([(
            TICKET_CONFIGURATION.to_string(),
            CredentialConfiguration {
                format: Format::JwtVcJson,
                types: vec!["VerifiableCredential".to_string(), "TicketCredential".to_string()],
            },
        )]),
    }
}

/// In-memory issuance provider.
#[derive(Clone, Debug)]
pub struct Issuer {
    subjects: Arc<HashMap<String, Map<String, Value>>>,
    fail_signing: Arc<AtomicBool>,
}

impl Issuer {
    /// Create a provider holding the test holder's ticket claims.
    #[must_use]
    pub fn new() -> Self {
        let claims = json!({
            "eventName": "Test Event",
            "ticketNumber": "12345",
            "seat": "A1"
        });
        let Value::Object(claims) = claims else {
            unreachable!("claims are an object");
        };
        Self {
            subjects: Arc::new(HashMap::from([(NORMAL_USER.to_string(), claims)])),
            fail_signing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make the next `sign` call fail, to exercise rollback paths.
    pub fn fail_next_signing(&self) {
        self.fail_signing.store(true, Ordering::SeqCst);
    }
}

impl Default for Issuer {
    fn default() -> Self {
        Self::new()
    }
}

impl Subject for Issuer {
    async fn dataset(&self, subject_id: &str, credential_configuration_id: &str) -> Result<Dataset> {
        let claims = self
            .subjects
            .get(subject_id)
            .ok_or_else(|| anyhow!("unknown subject: {subject_id}"))?;
        Ok(Dataset {
            credential_configuration_id: credential_configuration_id.to_string(),
            claims: claims.clone(),
        })
    }
}

impl Signer for Issuer {
    async fn sign(
        &self, dataset: &Dataset, configuration: &CredentialConfiguration,
        proof: Option<&ProofOfPossession>,
    ) -> Result<Value> {
        if self.fail_signing.swap(false, Ordering::SeqCst) {
            bail!("signer unavailable");
        }

        let subject_did =
            if proof.is_some() { "did:example:holder-did" } else { "did:example:subject-did" };
        let mut credential_subject = Map::new();
        credential_subject.insert("id".to_string(), json!(subject_did));
        credential_subject.extend(dataset.claims.clone());

        let now = Utc::now().to_rfc3339();
        Ok(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": format!("urn:uuid:{}", Uuid::new_v4()),
            "type": configuration.types,
            "issuer": "did:example:issuer-did",
            "credentialSubject": credential_subject,
            "issuanceDate": now,
            "proof": {
                "type": "EcdsaSecp256k1Signature2019",
                "created": now,
                "proofPurpose": "assertionMethod",
                "verificationMethod": "did:example:issuer-did#key-1",
                "jws": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0..."
            }
        }))
    }
}
