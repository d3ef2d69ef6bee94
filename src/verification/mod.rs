//! Fact verification of generated answers
//!
//! Best-effort by contract: retrieval and generation errors fail a query,
//! verification never does. Lookup failures and timeouts degrade the answer
//! to `Inconclusive` instead of blocking it.

pub mod claims;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::config::VerificationConfig;
use crate::error::Error;
use crate::providers::FactLookup;
use crate::types::{Answer, Claim, ClaimOutcome, VerificationStatus};

pub use claims::extract_claims;

/// Fact verifier with fan-out lookups and a bounded stage deadline
pub struct FactVerifier {
    lookup: Arc<dyn FactLookup>,
    config: VerificationConfig,
}

impl FactVerifier {
    /// Create a verifier; config must already be validated
    pub fn new(lookup: Arc<dyn FactLookup>, config: VerificationConfig) -> Self {
        Self { lookup, config }
    }

    /// Verify an answer's claims and update its status and confidence
    ///
    /// Aggregation: any contradicted claim makes the whole answer
    /// `Contradicted` with confidence capped at `contradiction_cap`; all
    /// supported lifts confidence by `support_boost`; anything unresolved is
    /// `Inconclusive`. An answer with no checkable claims stays `Unverified`.
    pub async fn verify(&self, mut answer: Answer) -> Answer {
        let mut claims = extract_claims(&answer, self.config.max_claims);
        if claims.is_empty() {
            answer.verification_status = VerificationStatus::Unverified;
            return answer;
        }

        let stage_deadline = Duration::from_millis(self.config.stage_deadline_ms);
        let mut degraded = false;

        // One lookup per claim, all bounded by the same stage deadline
        let lookups = claims.iter().map(|claim| {
            let lookup = Arc::clone(&self.lookup);
            let text = claim.text.clone();
            async move { timeout(stage_deadline, lookup.lookup(&text)).await }
        });
        let outcomes = futures::future::join_all(lookups).await;

        for (claim, outcome) in claims.iter_mut().zip(outcomes) {
            match outcome {
                Ok(Ok(result)) => {
                    claim.outcome = result.outcome;
                    claim.evidence_refs = result.evidence_refs;
                }
                Ok(Err(Error::VerificationUnavailable(reason))) => {
                    tracing::warn!(%reason, "fact lookup unavailable");
                    claim.outcome = ClaimOutcome::Inconclusive;
                    degraded = true;
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "fact lookup failed");
                    claim.outcome = ClaimOutcome::Inconclusive;
                    degraded = true;
                }
                Err(_) => {
                    tracing::warn!("fact lookup timed out");
                    claim.outcome = ClaimOutcome::Inconclusive;
                }
            }
        }

        self.aggregate(&mut answer, claims, degraded);
        answer
    }

    fn aggregate(&self, answer: &mut Answer, claims: Vec<Claim>, degraded: bool) {
        let any_contradicted = claims
            .iter()
            .any(|c| c.outcome == ClaimOutcome::Contradicted);
        let all_supported = claims
            .iter()
            .all(|c| c.outcome == ClaimOutcome::Supported);

        if any_contradicted {
            // One contradicted claim dominates, whatever the generator scored
            answer.verification_status = VerificationStatus::Contradicted;
            answer.confidence = answer.confidence.min(self.config.contradiction_cap);
        } else if all_supported {
            answer.verification_status = VerificationStatus::Verified;
            answer.confidence = (answer.confidence + self.config.support_boost).min(1.0);
        } else {
            answer.verification_status = VerificationStatus::Inconclusive;
        }

        answer.verification_degraded = degraded;
        answer.claims = claims;
        answer.clamp_confidence();
    }
}
