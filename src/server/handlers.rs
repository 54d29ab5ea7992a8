// src/server/handlers.rs
use super::AppState;
use crate::error::AppError;
use crate::model::{CollectionEntry, Page};
use crate::types::PageId;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// `?force_update=true` bypasses the cache read.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    force_update: Option<String>,
}

impl RefreshQuery {
    fn forced(&self) -> bool {
        self.force_update.as_deref() == Some("true")
    }
}

/// Failure of a request, rendered as `{error}` (400) or
/// `{error, details}` (500).
#[derive(Debug)]
pub enum ApiFailure {
    BadRequest(String),
    Upstream {
        error: &'static str,
        source: AppError,
    },
}

impl ApiFailure {
    /// Classifies a pipeline error; `context` names the failed operation
    /// in 500 bodies.
    fn from_app(context: &'static str, err: AppError) -> Self {
        if !err.is_client_error() {
            return Self::Upstream {
                error: context,
                source: err,
            };
        }
        match err {
            AppError::MissingConfiguration(message) => Self::BadRequest(message),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            ApiFailure::BadRequest(message) => {
                log::debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiFailure::Upstream { error, source } => {
                log::error!("{}: {}", error, source);
                let body = Json(json!({
                    "error": error,
                    "details": source.details(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

fn parse_page_id(raw: &str) -> Result<PageId, ApiFailure> {
    if raw.trim().is_empty() {
        return Err(ApiFailure::BadRequest("No page ID provided".to_string()));
    }
    PageId::parse(raw.trim()).map_err(|e| ApiFailure::BadRequest(e.to_string()))
}

/// GET /api/notion
pub async fn list_collection(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Vec<CollectionEntry>>, ApiFailure> {
    state
        .mirror
        .collection
        .fetch(query.forced())
        .await
        .map(Json)
        .map_err(|e| ApiFailure::from_app("Failed to fetch Notion database", e))
}

/// GET /api/notion/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Page>, ApiFailure> {
    let id = parse_page_id(&id)?;
    state
        .mirror
        .pages
        .fetch(&id, query.forced())
        .await
        .map(Json)
        .map_err(|e| ApiFailure::from_app("Failed to fetch Notion page", e))
}

/// DELETE /api/notion/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiFailure> {
    let id = parse_page_id(&id)?;
    let outcome = state
        .mirror
        .archiver
        .delete(&id)
        .await
        .map_err(|e| ApiFailure::from_app("Failed to delete Notion page", e))?;
    if !outcome.evicted {
        log::warn!("Page {} archived but its cached copy remains until expiry", id);
    }
    Ok(Json(json!({
        "success": true,
        "message": "Page successfully deleted",
    })))
}

/// /api/notion/ with an empty id segment.
pub async fn missing_page_id() -> ApiFailure {
    ApiFailure::BadRequest("No page ID provided".to_string())
}

/// GET /api/redis-test
pub async fn cache_probe(State(state): State<AppState>) -> Response {
    let backend = state.mirror.cache.backend();
    match state.mirror.cache.probe().await {
        Ok(value) => Json(json!({
            "status": "Connected",
            "value": value,
            "backend": backend,
        }))
        .into_response(),
        Err(e) => {
            log::error!("Cache probe against {} failed: {}", backend, e);
            let body = Json(json!({
                "status": "Error",
                "error": e.to_string(),
                "backend": backend,
            }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
