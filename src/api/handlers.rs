use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::dashboard::{DashboardStore, SaveCommand, SavedDashboard, StoreError};
use crate::sync::SyncOrchestrator;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<DashboardStore>,
    pub sync: Arc<SyncOrchestrator>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub check_sync: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        check_sync: state.sync.is_enabled(),
    })
}

// ============================================================================
// Dashboards
// ============================================================================

#[derive(Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
    pub slug: String,
    pub version: i64,
}

/// Save a dashboard, then sync its panel checks in the background.
///
/// The response depends only on the save; the sync pass works on its own
/// copy of the saved document and reports nothing back.
pub async fn save_dashboard(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveCommand>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(cmd) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let saved = state.store.save(cmd)?;

    if state.sync.spawn(saved.data.clone()).is_some() {
        tracing::debug!(slug = %saved.slug, "Check sync started");
    }

    Ok(Json(SaveResponse {
        status: "success",
        slug: saved.slug,
        version: saved.version,
    }))
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub dashboard: serde_json::Value,
    pub meta: DashboardMeta,
}

#[derive(Serialize)]
pub struct DashboardMeta {
    pub slug: String,
    pub version: i64,
    pub updated: chrono::DateTime<chrono::Utc>,
}

impl From<SavedDashboard> for DashboardResponse {
    fn from(saved: SavedDashboard) -> Self {
        Self {
            dashboard: saved.data,
            meta: DashboardMeta {
                slug: saved.slug,
                version: saved.version,
                updated: saved.updated,
            },
        }
    }
}

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let saved = state
        .store
        .get(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("Dashboard '{}' not found", slug)))?;

    Ok(Json(saved.into()))
}

pub async fn delete_dashboard(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state.store.delete(&slug)?;
    let title = removed
        .data
        .get("title")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(Json(serde_json::json!({ "title": title })))
}

#[derive(Serialize)]
pub struct DashboardSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub version: i64,
}

pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> Json<Vec<DashboardSummary>> {
    let summaries = state
        .store
        .list()
        .into_iter()
        .map(|d| DashboardSummary {
            id: d.id,
            title: d
                .data
                .get("title")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            slug: d.slug,
            version: d.version,
        })
        .collect();

    Json(summaries)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Save conflict; `status` names the conflict kind
    Conflict {
        status: &'static str,
        message: String,
    },
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::MissingTitle => ApiError::BadRequest(message),
            StoreError::NotFound(_) => ApiError::NotFound(message),
            StoreError::NameExists(_) => ApiError::Conflict {
                status: "name-exists",
                message,
            },
            StoreError::VersionMismatch { .. } => ApiError::Conflict {
                status: "version-mismatch",
                message,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "status": "not-found", "error": msg }),
            ),
            ApiError::Conflict { status, message } => (
                StatusCode::PRECONDITION_FAILED,
                serde_json::json!({ "status": status, "error": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
