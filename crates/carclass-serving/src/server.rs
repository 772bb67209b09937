//! HTTP server binding for the carclass backend.
//!
//! Thin axum layer over [`PredictionService`] and [`PredictionStore`]: route
//! wiring, multipart extraction, and the error-to-status mapping. All
//! domain logic lives below this module.

use crate::config::ServerConfig;
use crate::error::{ServingError, ServingResult};
use crate::schemas::{
    DeleteResponse, ErrorResponse, HealthResponse, PredictionHistory, PredictionResponse,
    StatsResponse,
};
use crate::service::{ImageUpload, PredictionService};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use carclass_store::PredictionStore;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application name reported by `/` and `/health`.
pub const APP_NAME: &str = "Car Classification API";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Prediction orchestration.
    pub service: Arc<PredictionService>,

    /// Record store, used directly by the read/delete endpoints.
    pub store: PredictionStore,
}

impl ServingError {
    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ServingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/predict", post(predict))
        .route("/api/predictions", get(list_predictions))
        .route("/api/predictions/{id}", get(get_prediction))
        .route("/api/predictions/{id}", delete(delete_prediction))
        .route("/api/stats", get(get_stats))
        .route("/health", get(health))
        .route("/", get(root))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run_server(config: &ServerConfig, state: AppState) -> ServingResult<()> {
    let app = router(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .await
        .map_err(|e| ServingError::internal(e.to_string()))
}

async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServingResult<Json<PredictionResponse>> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServingError::invalid_input(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServingError::invalid_input(format!("Failed to read upload: {e}")))?;
        upload = Some(ImageUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload
        .ok_or_else(|| ServingError::invalid_input("Missing multipart field \"file\""))?;
    let outcome = state.service.predict(upload)?;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    skip: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ServingResult<Json<Vec<PredictionHistory>>> {
    let records = state.store.list(query.skip, query.limit)?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServingResult<Json<PredictionHistory>> {
    let record = state.store.get(id)?;
    Ok(Json(record.into()))
}

async fn delete_prediction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServingResult<Json<DeleteResponse>> {
    state.store.delete(id)?;
    Ok(Json(DeleteResponse {
        message: "Prediction deleted successfully".to_string(),
    }))
}

async fn get_stats(State(state): State<AppState>) -> ServingResult<Json<StatsResponse>> {
    Ok(Json(state.store.stats()?))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        app: APP_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_mode: state.service.engine().mode(),
    })
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": format!("Welcome to {APP_NAME}"),
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServingError::invalid_input("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServingError::NotFound(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServingError::model_unavailable("none").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServingError::inference("shape").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_history_query_defaults() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 100);
    }
}
