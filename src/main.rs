use clap::{Parser, Subcommand};
use sentinel_api_server::{ApiServer, ApiServerConfig};
use sentinel_core::{ConfigView, DecisionEngine, HttpModelWrapper, RawAnalyzeRequest, Wrappers};
use sentinel_types::ModelName;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Crisis-detection ensemble service: operator CLI and HTTP server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Base URL of the model-serving sidecar (overrides NLP_MODEL_SERVICE_URL)
        #[arg(long)]
        model_service_url: Option<String>,
    },
    /// Score a single message against the running configuration and print the result
    Analyze {
        /// Message text to score
        #[arg(short, long)]
        message: String,
        /// Model-serving sidecar base URL
        #[arg(long, default_value = "http://127.0.0.1:9000")]
        model_service_url: String,
    },
    /// Inspect the effective runtime configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the default runtime configuration as JSON
    Show,
}

fn build_wrappers(model_service_url: &str) -> Wrappers {
    let wrapper = |model: ModelName| -> Arc<dyn sentinel_core::ModelWrapper> {
        Arc::new(HttpModelWrapper::new(
            model,
            model_service_url,
            Duration::from_secs(5),
        ))
    };
    Wrappers {
        bart: wrapper(ModelName::Bart),
        sentiment: wrapper(ModelName::Sentiment),
        irony: wrapper(ModelName::Irony),
        emotions: wrapper(ModelName::Emotions),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { model_service_url } => {
            let api_config = ApiServerConfig::from_env()?;
            let model_service_url = model_service_url
                .or_else(|| std::env::var("NLP_MODEL_SERVICE_URL").ok())
                .unwrap_or_else(|| "http://127.0.0.1:9000".to_string());
            let wrappers = build_wrappers(&model_service_url);
            let server = ApiServer::new(api_config, ConfigView::from_env(), wrappers).await?;
            if let Err(e) = server.run().await {
                error!("server error: {:?}", e);
                std::process::exit(1);
            }
        }
        Commands::Analyze {
            message,
            model_service_url,
        } => {
            let wrappers = build_wrappers(&model_service_url);
            let (alerting, mut alert_rx) = sentinel_core::AlertingHook::new(16);
            tokio::spawn(async move { while alert_rx.recv().await.is_some() {} });
            let engine = DecisionEngine::new(ConfigView::from_env(), wrappers, alerting);
            engine.warmup().await;

            let request = RawAnalyzeRequest {
                message,
                ..Default::default()
            };
            let response = engine
                .handle(request, uuid::Uuid::new_v4().to_string(), chrono::Utc::now())
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => {
                info!("printing effective runtime configuration");
                println!("{}", serde_json::to_string_pretty(&ConfigView::from_env())?);
            }
        },
    }

    Ok(())
}
