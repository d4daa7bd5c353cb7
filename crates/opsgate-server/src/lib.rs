pub mod auth;
pub mod error;
pub mod gateway;
pub mod pg;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use opsgate_core::service::ExecService;
use opsgate_planner::{OpenAiPlanner, PlannerConfig};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use gateway::HttpAdminGateway;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub admin_api_base_url: String,
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Router / serve
// ---------------------------------------------------------------------------

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(service: Arc<ExecService>) -> Router {
    let app_state = state::AppState::new(service);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/ai-exec/requests",
            post(routes::requests::create_request).get(routes::requests::list_requests),
        )
        .route(
            "/api/ai-exec/requests/{request_id}/approve",
            post(routes::requests::approve_request),
        )
        .route(
            "/api/ai-exec/requests/{request_id}/reject",
            post(routes::requests::reject_request),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Wire the production collaborators (Postgres stores, OpenAI planner,
/// admin-API gateway) into an [`ExecService`].
pub async fn build_service(config: &ServerConfig) -> anyhow::Result<Arc<ExecService>> {
    let pool = pg::connect(&config.database_url).await?;

    let mut planner_config =
        PlannerConfig::new(config.openai_api_key.clone(), config.openai_model.clone());
    if let Some(base_url) = &config.openai_base_url {
        planner_config = planner_config.with_base_url(base_url.clone());
    }

    Ok(Arc::new(ExecService::new(
        Arc::new(OpenAiPlanner::new(planner_config)),
        Arc::new(HttpAdminGateway::new(config.admin_api_base_url.clone())),
        Arc::new(pg::PgExecutionRequestStore::new(pool.clone())),
        Arc::new(pg::PgDecisionLogStore::new(pool)),
    )))
}

/// Start the opsgate API server.
pub async fn serve(config: ServerConfig, port: u16) -> anyhow::Result<()> {
    let service = build_service(&config).await?;
    let app = build_router(service);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("opsgate server listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
