use loan_decision_backend::{
    api::{start_server, ApiState},
    auth::{MetadataTokenProvider, StaticTokenProvider, TokenProvider},
    chat::ChatResponder,
    clients::{CompletionsClient, KserveRateClient, VertexApprovalClient},
    config::Config,
    context::DecisionContextStore,
    orchestrator::DecisionOrchestrator,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Missing required configuration is fatal: refuse to start.
    let config = Config::from_env()?;

    info!("🚀 Loan Decision Backend - API Server");
    info!("📍 Port: {}", config.port);
    info!("📡 Approval endpoint: {}", config.approval_endpoint_url());
    info!("📡 Rate endpoint: {}", config.rate_model_url);

    // Token source: explicit env token for local runs, metadata server
    // otherwise.
    let tokens: Arc<dyn TokenProvider> = match std::env::var("GCP_ACCESS_TOKEN") {
        Ok(token) if !token.trim().is_empty() => {
            info!("Credential source: GCP_ACCESS_TOKEN");
            Arc::new(StaticTokenProvider::new(token))
        }
        _ => {
            info!("Credential source: metadata server (cached)");
            Arc::new(MetadataTokenProvider::new())
        }
    };

    // Create components
    let approval = Arc::new(VertexApprovalClient::new(
        config.approval_endpoint_url(),
        tokens,
        config.confidence_threshold,
    ));
    let rate = Arc::new(KserveRateClient::new(
        config.rate_model_url.clone(),
        config.rate_model_version.clone(),
        config.rate_input_name.clone(),
        config.rate_output_name.clone(),
    ));
    let completions = Arc::new(CompletionsClient::new(config.chat_model_url.clone()));

    let context = DecisionContextStore::new();
    let orchestrator = Arc::new(DecisionOrchestrator::new(approval, rate, context.clone()));
    let responder = Arc::new(ChatResponder::new(completions, context));

    info!("✅ Pipeline initialized");
    info!("📡 Starting API server...");

    let state = ApiState {
        orchestrator,
        responder,
        rate_model_url: config.rate_model_url.clone(),
    };

    start_server(state, config.port).await?;

    Ok(())
}
