// src/bin/api_server.rs

use std::sync::Arc;
use stockroom::infra::{config::Config, logging};
use stockroom::transport;
use stockroom::InventoryService;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env()?;

    // --- Service Initialization ---
    tracing::info!("Connecting inventory store...");
    let service = InventoryService::from_config(&config).await?;
    if let Err(e) = service.ping().await {
        // Not fatal: each request reports backend errors on its own.
        tracing::warn!(error = %e, "store not reachable yet");
    }

    let app_state = transport::http::AppState {
        service: Arc::new(service),
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("API server listening on http://{}", config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received (Ctrl+C)...");
            }
        })
        .await?;

    tracing::info!("Graceful shutdown complete.");
    Ok(())
}
