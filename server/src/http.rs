use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use prontio_protocol::ApiResponse;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{router, AppState};

const USAGE: &str = "PRONTIO API ativa.\n\
Use requisições POST com JSON no corpo no formato:\n\n\
{ \"action\": \"Agenda.ListarPorData\", \"payload\": { \"data\": \"2025-01-01\" } }\n";

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_action).get(usage))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// POST /
/// Body is read as text whatever the content type.
async fn handle_action(State(state): State<AppState>, body: Bytes) -> Json<ApiResponse> {
    let raw = String::from_utf8_lossy(&body);
    Json(router::handle(&state, &raw).await)
}

/// GET /
async fn usage() -> &'static str {
    USAGE
}

/// GET /health
async fn health_check() -> StatusCode {
    StatusCode::OK
}
