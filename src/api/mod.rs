//! HTTP API over the freeze workflow, dashboard and anonymous telemetry.

mod breach;
mod bureaus;
mod error;
mod workflow;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use freeze_core::db::Database;
use freeze_core::models::Bureau;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use error::ApiError;

/// Header carrying the authenticated user's id, set by the auth layer in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub fn create_router(db: Database) -> Router {
    let state = AppState { db };

    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard", get(bureaus::dashboard))
        .route("/api/history", get(bureaus::history))
        .route("/api/bureaus/{bureau}/unfreeze", post(bureaus::unfreeze))
        .route("/api/bureaus/{bureau}/thaw", post(bureaus::log_thaw))
        .route("/api/thaws", post(bureaus::schedule_thaws))
        .route("/api/thaws/{id}", delete(bureaus::cancel_thaw))
        .route("/api/workflow", get(workflow::show))
        .route("/api/workflow/checklist", post(workflow::complete_checklist))
        .route("/api/workflow/confirm/{bureau}", post(workflow::confirm))
        .route("/api/workflow/skip/{bureau}", post(workflow::skip))
        .route("/api/workflow/migrate", post(workflow::migrate))
        .route("/api/breach/validate", post(breach::validate))
        .route("/api/breach/visit", post(breach::visit))
        .route("/api/freeze-events", post(breach::freeze_event))
        .route("/api/freeze-issues", post(breach::freeze_issue))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "service": "freeze3b" }))
}

/// The signed-in user, taken from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}

fn parse_bureau(raw: &str) -> Result<Bureau, ApiError> {
    Bureau::from_str(raw).ok_or_else(|| ApiError::BadRequest(format!("unknown bureau: {raw}")))
}
