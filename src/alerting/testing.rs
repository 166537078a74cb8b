//! In-process stand-in for the alerting backend, used by tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;

/// Requests seen by the stub and knobs controlling its replies
pub struct StubState {
    pub created: Mutex<Vec<Value>>,
    pub deleted: Mutex<Vec<String>>,
    /// Authorization header of each create request
    pub auth: Mutex<Vec<Option<String>>>,
    known_ids: Mutex<HashSet<String>>,
    rejected_names: Mutex<HashSet<String>>,
    stalled_ids: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    omit_location: AtomicBool,
}

impl StubState {
    fn new() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            auth: Mutex::new(Vec::new()),
            known_ids: Mutex::new(HashSet::new()),
            rejected_names: Mutex::new(HashSet::new()),
            stalled_ids: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(42),
            omit_location: AtomicBool::new(false),
        }
    }

    /// Answer creates without a Location header
    pub fn omit_location(&self) {
        self.omit_location.store(true, Ordering::SeqCst);
    }

    /// Answer creates of checks with this name with 400
    pub fn reject(&self, name: &str) {
        self.rejected_names.lock().insert(name.to_string());
    }

    /// Hold deletes of this id open long enough for client timeouts to fire
    pub fn stall_delete(&self, id: &str) {
        self.stalled_ids.lock().insert(id.to_string());
    }

    /// Pretend a check with this id already exists
    pub fn seed(&self, id: &str) {
        self.known_ids.lock().insert(id.to_string());
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .iter()
            .filter_map(|c| c["name"].as_str().map(str::to_string))
            .collect()
    }
}

pub struct StubBackend {
    pub url: String,
    pub state: Arc<StubState>,
}

impl StubBackend {
    /// Serve the stub on an ephemeral local port
    pub async fn start() -> Self {
        let state = Arc::new(StubState::new());
        let app = Router::new()
            .route("/api/checks", post(create_check))
            .route("/api/checks/:id", delete(delete_check))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }
}

async fn create_check(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth.lock().push(auth);

    let name = body["name"].as_str().unwrap_or_default().to_string();
    state.created.lock().push(body);

    if state.rejected_names.lock().contains(&name) {
        return (StatusCode::BAD_REQUEST, "invalid check").into_response();
    }
    if state.omit_location.load(Ordering::SeqCst) {
        return StatusCode::CREATED.into_response();
    }

    let id = state.next_id.fetch_add(1, Ordering::SeqCst).to_string();
    state.known_ids.lock().insert(id.clone());
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/checks/{}", id))],
    )
        .into_response()
}

async fn delete_check(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> StatusCode {
    state.deleted.lock().push(id.clone());
    let stalled = state.stalled_ids.lock().contains(&id);
    if stalled {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
    if state.known_ids.lock().remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
