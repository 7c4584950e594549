// ABOUTME: HTTP API server entry point for the crisis-detection ensemble service
use anyhow::Result;
use sentinel_api_server::{ApiServer, ApiServerConfig};
use sentinel_core::{ConfigView, HttpModelWrapper, Wrappers};
use sentinel_types::ModelName;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn wrapper_for(model: ModelName, base_url: &str) -> Arc<dyn sentinel_core::ModelWrapper> {
    Arc::new(HttpModelWrapper::new(model, base_url, Duration::from_secs(5)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("starting crisis-detection API server");

    let config = ApiServerConfig::from_env()?;

    let model_service_url = env::var("NLP_MODEL_SERVICE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string());

    let wrappers = Wrappers {
        bart: wrapper_for(ModelName::Bart, &model_service_url),
        sentiment: wrapper_for(ModelName::Sentiment, &model_service_url),
        irony: wrapper_for(ModelName::Irony, &model_service_url),
        emotions: wrapper_for(ModelName::Emotions, &model_service_url),
    };

    let domain_config = ConfigView::from_env();

    let server = ApiServer::new(config, domain_config, wrappers).await?;

    if let Err(e) = server.run().await {
        tracing::error!("server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
