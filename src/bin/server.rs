//! Policy Q&A server binary
//!
//! Run with: cargo run --bin policy-rag-server
//! Config path via POLICY_RAG_CONFIG (TOML), defaults otherwise.

use policy_rag::{config::RagConfig, server::QaServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("POLICY_RAG_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "loading configuration");
            RagConfig::from_file(path)?
        }
        Err(_) => RagConfig::default(),
    };

    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!(
        "  - Fact lookup: {}",
        config
            .verification
            .lookup_endpoint
            .as_deref()
            .unwrap_or("(not configured)")
    );

    let server = QaServer::new(config)?;
    tracing::info!("  - Listening on http://{}", server.address());

    server.start().await?;
    Ok(())
}
