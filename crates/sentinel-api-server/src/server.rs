// ABOUTME: Router assembly, middleware stack, and graceful shutdown for the API server
use crate::config::ApiServerConfig;
use crate::middleware::{cors, logging};
use crate::routes::{analyze, batch, config as config_routes, health};
use anyhow::Result;
use axum::{routing::get, Router};
use sentinel_core::{AlertingHook, ConfigView, DecisionEngine, Wrappers};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
};
use tracing::{info, instrument};

/// Shared state handed to every route handler.
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
}

pub struct ApiServer {
    pub config: ApiServerConfig,
    pub app: Router,
}

impl ApiServer {
    #[instrument(skip(config, domain_config, wrappers))]
    pub async fn new(
        config: ApiServerConfig,
        domain_config: ConfigView,
        wrappers: Wrappers,
    ) -> Result<Self> {
        info!(host = %config.host, port = config.port, "initializing crisis-detection API server");

        let (alerting, mut alert_rx) = AlertingHook::new(64);
        tokio::spawn(async move {
            while let Some(event) = alert_rx.recv().await {
                tracing::warn!(?event, "fallback alert");
            }
        });

        let engine = Arc::new(DecisionEngine::new(domain_config, wrappers, alerting));
        engine.warmup().await;

        let app = Self::build_router(engine);

        Ok(Self { config, app })
    }

    fn build_router(engine: Arc<DecisionEngine>) -> Router {
        let state = Arc::new(AppState { engine });

        Router::new()
            .route("/health", get(health::health))
            .route("/analyze", axum::routing::post(analyze::analyze))
            .route("/analyze/batch", axum::routing::post(batch::analyze_batch))
            .route(
                "/config/consensus",
                get(config_routes::get_consensus_config).put(config_routes::put_consensus_config),
            )
            .with_state(state)
            .layer(CompressionLayer::new())
            .layer(cors::create_cors_layer())
            .layer(logging::create_trace_layer::<axum::body::Body>())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(CatchPanicLayer::new())
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(%bind_addr, "server listening");

        let shutdown_signal = async {
            let ctrl_c = async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("failed to install CTRL+C handler");
            };

            #[cfg(unix)]
            let terminate = async {
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => info!("received SIGINT"),
                _ = terminate => info!("received SIGTERM"),
            }
        };

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        info!("server shutdown complete");
        Ok(())
    }
}
