//! External fact-lookup capability for the verifier

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ClaimOutcome;

/// Result of checking one claim against authoritative sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    /// Whether the sources support, contradict, or say nothing about the claim
    pub outcome: ClaimOutcome,
    /// References to the evidence consulted
    #[serde(default)]
    pub evidence_refs: Vec<String>,
}

/// Injected fact-lookup capability
///
/// Must be idempotent and safe to call concurrently; the verifier fans out
/// one call per claim. Unavailability is reported as
/// `Error::VerificationUnavailable` and absorbed by the verifier.
#[async_trait]
pub trait FactLookup: Send + Sync {
    /// Check a single claim against authoritative sources
    async fn lookup(&self, claim_text: &str) -> Result<LookupResult>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// HTTP fact-lookup client posting claims to a collaborator service
pub struct HttpFactLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFactLookup {
    /// Create a client for the given lookup endpoint
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    claim: &'a str,
}

#[async_trait]
impl FactLookup for HttpFactLookup {
    async fn lookup(&self, claim_text: &str) -> Result<LookupResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&LookupRequest { claim: claim_text })
            .send()
            .await
            .map_err(|e| Error::VerificationUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::VerificationUnavailable(format!(
                "lookup service returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<LookupResult>()
            .await
            .map_err(|e| Error::VerificationUnavailable(e.to_string()))
    }

    fn name(&self) -> &str {
        "http-fact-lookup"
    }
}
