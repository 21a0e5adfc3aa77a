use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    config::Config,
    models::{health::HealthCheckResponse, response::ApiResponse},
    orchestrator::{Collaborators, NotificationOrchestrator},
};

pub struct AppState {
    collaborators: Collaborators,
}

impl AppState {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }
}

/// Body of a "return status changed" request. The payload sits under `data`.
#[derive(Debug, Deserialize)]
pub struct ReturnStatusRequest {
    #[serde(default)]
    pub data: Value,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/v1/notifications/return-status",
            post(return_status_changed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: &Config, state: Arc<AppState>) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthCheckResponse::healthy()))
}

async fn return_status_changed(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ReturnStatusRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed request body");
            return (
                rejection.status(),
                Json(ApiResponse::<()>::error(
                    "INVALID_REQUEST_BODY".to_string(),
                    rejection.body_text(),
                )),
            )
                .into_response();
        }
    };

    let mut orchestrator = NotificationOrchestrator::new(state.collaborators.clone());

    match orchestrator.run(request.data).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                report,
                "Return status notifications processed".to_string(),
            )),
        )
            .into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            (
                status,
                Json(ApiResponse::<()>::error(e.code().to_string(), e.to_string())),
            )
                .into_response()
        }
    }
}
