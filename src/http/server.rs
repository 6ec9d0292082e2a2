use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::warn;

use crate::cache::{CacheKey, QueryFetcher};
use crate::config::DEFAULT_REMINDERS_KEY;
use crate::endpoint::{PersistenceEndpoint, ReminderStore};
use crate::organization::OrganizationDirectory;
use crate::reminder::UpdateStatusRequest;

/// Build an axum `Router` serving the given store.
pub fn router(store: ReminderStore) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/reminders", get(list_handler))
        .route(
            "/collections/:collection_id/reminders",
            get(collection_handler),
        )
        .route("/reminders/status", post(update_status_handler))
        .route("/organizations/:org_id", get(organization_handler))
        .with_state(store)
}

/// Serve the store over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(store: ReminderStore, addr: &str) -> Result<(), std::io::Error> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn list_handler(State(store): State<ReminderStore>) -> Response {
    list(&store, CacheKey::new(DEFAULT_REMINDERS_KEY)).await
}

async fn collection_handler(
    State(store): State<ReminderStore>,
    Path(collection_id): Path<String>,
) -> Response {
    list(
        &store,
        CacheKey::for_collection(DEFAULT_REMINDERS_KEY, &collection_id),
    )
    .await
}

async fn list(store: &ReminderStore, key: CacheKey) -> Response {
    match store.fetch(&key).await {
        Ok(reminders) => (StatusCode::OK, Json(reminders)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn update_status_handler(
    State(store): State<ReminderStore>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response {
    match store.update_status(request).await {
        Ok(reminder) => (StatusCode::OK, Json(reminder)).into_response(),
        Err(e) => {
            warn!(error = %e, "status update refused");
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, e.to_string())
        }
    }
}

async fn organization_handler(
    State(store): State<ReminderStore>,
    Path(org_id): Path<String>,
) -> Response {
    match store.organization_info(&org_id).await {
        Ok(Some(info)) => (StatusCode::OK, Json(info)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("organization not found: {}", org_id),
        ),
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    }
}
