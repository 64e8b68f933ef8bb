use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::server::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Value,
}

pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn forward_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    log::info!("Processing completion request");

    let (status, body) = state
        .upstream
        .forward(request.model.as_deref(), request.messages)
        .await?
        .ok_or(ApiError::MissingCredential)?;

    if status.is_success() {
        log::info!("Completion response received");
    } else {
        log::error!(
            "Completion provider returned {}: {}",
            status,
            String::from_utf8_lossy(&body)
        );
    }

    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
