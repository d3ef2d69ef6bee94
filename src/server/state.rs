//! Application state for the Q&A server

use async_trait::async_trait;
use std::sync::Arc;

use crate::audit::TracingAuditSink;
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::pipeline::PolicyQaEngine;
use crate::providers::{
    FactLookup, HttpFactLookup, LookupResult, OllamaClient, OllamaEmbedder, OllamaLlm,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    engine: Arc<PolicyQaEngine>,
}

impl AppState {
    /// Wire up the engine with Ollama providers and the configured lookup
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing policy Q&A engine...");

        let client = Arc::new(OllamaClient::new(&config.llm)?);
        let embedder = Arc::new(OllamaEmbedder::new(
            Arc::clone(&client),
            config.embeddings.dimensions,
        ));
        let llm = Arc::new(OllamaLlm::new(client, config.llm.generate_model.clone()));

        let lookup: Arc<dyn FactLookup> = match &config.verification.lookup_endpoint {
            Some(endpoint) => {
                tracing::info!(%endpoint, "fact lookup enabled");
                Arc::new(HttpFactLookup::new(
                    endpoint.clone(),
                    config.verification.lookup_timeout_secs,
                )?)
            }
            None => {
                tracing::warn!("no fact-lookup endpoint configured; answers will verify as inconclusive");
                Arc::new(UnconfiguredLookup)
            }
        };

        let engine = PolicyQaEngine::new(
            config,
            embedder,
            llm,
            lookup,
            Some(Arc::new(TracingAuditSink)),
        )?;

        tracing::info!("engine initialized");
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Build state around an existing engine (tests, embedded use)
    pub fn from_engine(engine: Arc<PolicyQaEngine>) -> Self {
        Self { engine }
    }

    /// The Q&A engine
    pub fn engine(&self) -> &Arc<PolicyQaEngine> {
        &self.engine
    }
}

/// Placeholder lookup used when no endpoint is configured
struct UnconfiguredLookup;

#[async_trait]
impl FactLookup for UnconfiguredLookup {
    async fn lookup(&self, _claim_text: &str) -> Result<LookupResult> {
        Err(Error::VerificationUnavailable(
            "no fact-lookup endpoint configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}
