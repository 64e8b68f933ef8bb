use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::api::upstream::UpstreamClient;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upstream: Arc::new(UpstreamClient::from_config(config)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/chat",
            post(handlers::forward_chat)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> Result<()> {
    if !state.upstream.has_credential() {
        log::warn!("OPENAI_API_KEY is not set; completion requests will fail");
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    log::info!("Switchboard forwarder listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
